//! Room data
//!
//! A room is one cell of the dungeon grid. Its kind decides what happens
//! when the hero walks in.

use serde::{Deserialize, Serialize};

/// Broad room category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Loot or nothing at all; never costs lives
    Safe,
    /// A monster guards the room
    Danger,
}

/// What a room contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoomKind {
    Empty,
    Potion,
    Armour,
    Weapon,
    Teammate,
    Ogre,
    Goblin,
}

impl RoomKind {
    /// Every kind, in composition order
    pub const ALL: [RoomKind; 7] = [
        RoomKind::Empty,
        RoomKind::Potion,
        RoomKind::Armour,
        RoomKind::Weapon,
        RoomKind::Teammate,
        RoomKind::Ogre,
        RoomKind::Goblin,
    ];

    pub fn category(&self) -> Category {
        match self {
            RoomKind::Ogre | RoomKind::Goblin => Category::Danger,
            _ => Category::Safe,
        }
    }

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            RoomKind::Empty => "Empty",
            RoomKind::Potion => "Potion",
            RoomKind::Armour => "Armour",
            RoomKind::Weapon => "Weapon",
            RoomKind::Teammate => "Teammate",
            RoomKind::Ogre => "Ogre",
            RoomKind::Goblin => "Goblin",
        }
    }

    /// Map glyph for a revealed room
    pub fn glyph(&self) -> char {
        match self {
            RoomKind::Empty => '.',
            RoomKind::Potion => '!',
            RoomKind::Armour => '[',
            RoomKind::Weapon => '/',
            RoomKind::Teammate => '@',
            RoomKind::Ogre => 'O',
            RoomKind::Goblin => 'g',
        }
    }
}

/// A single grid cell
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    kind: RoomKind,
    revealed: bool,
}

impl Room {
    /// Create a hidden room
    pub fn new(kind: RoomKind) -> Self {
        Self { kind, revealed: false }
    }

    pub fn kind(&self) -> RoomKind {
        self.kind
    }

    pub fn category(&self) -> Category {
        self.kind.category()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Mark the room as uncovered. Only the grid and resolver flip this.
    pub(crate) fn mark_revealed(&mut self) {
        self.revealed = true;
    }
}
