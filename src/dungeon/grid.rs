//! Dungeon grid and room generation
//!
//! The grid is a fixed 8x8 board of rooms. Room kinds come from a
//! [`Composition`] and are shuffled once when the grid is created.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::room::{Room, RoomKind};

/// Rooms per grid side
pub const GRID_WIDTH: usize = 8;
/// Total rooms on a grid
pub const GRID_CELLS: usize = GRID_WIDTH * GRID_WIDTH;

/// How many rooms of each kind go into a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Composition {
    pub empty: usize,
    pub potion: usize,
    pub armour: usize,
    pub weapon: usize,
    pub teammate: usize,
    pub ogre: usize,
    pub goblin: usize,
}

impl Composition {
    /// The standard dungeon
    pub const CANONICAL: Composition = Composition {
        empty: 20,
        potion: 10,
        armour: 10,
        weapon: 10,
        teammate: 6,
        ogre: 4,
        goblin: 4,
    };

    /// Fewer supplies, more than twice the monsters
    pub const HARSH: Composition = Composition {
        empty: 16,
        potion: 8,
        armour: 8,
        weapon: 8,
        teammate: 6,
        ogre: 9,
        goblin: 9,
    };

    /// Number of rooms of a given kind
    pub fn count(&self, kind: RoomKind) -> usize {
        match kind {
            RoomKind::Empty => self.empty,
            RoomKind::Potion => self.potion,
            RoomKind::Armour => self.armour,
            RoomKind::Weapon => self.weapon,
            RoomKind::Teammate => self.teammate,
            RoomKind::Ogre => self.ogre,
            RoomKind::Goblin => self.goblin,
        }
    }

    pub fn total(&self) -> usize {
        RoomKind::ALL.iter().map(|&k| self.count(k)).sum()
    }

    /// A composition is usable only if it fills the board exactly
    pub fn is_valid(&self) -> bool {
        self.total() == GRID_CELLS
    }
}

impl Default for Composition {
    fn default() -> Self {
        Self::CANONICAL
    }
}

/// The board of rooms for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rooms: Vec<Room>,
}

impl Grid {
    /// Build a shuffled grid from a composition.
    ///
    /// Callers must pass a composition that passes [`Composition::is_valid`];
    /// configuration loading rejects anything else.
    pub fn generate(composition: &Composition, rng: &mut impl Rng) -> Self {
        debug_assert!(composition.is_valid(), "composition must fill the grid");

        let mut rooms = Vec::with_capacity(composition.total());
        for kind in RoomKind::ALL {
            rooms.extend((0..composition.count(kind)).map(|_| Room::new(kind)));
        }
        shuffle(&mut rooms, rng);

        Self { rooms }
    }

    /// Unshuffled grid in the given order, for scripted runs in tests
    #[cfg(test)]
    pub(crate) fn from_kinds(kinds: &[RoomKind]) -> Self {
        Self { rooms: kinds.iter().map(|&k| Room::new(k)).collect() }
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Room> {
        self.rooms.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Room> {
        self.rooms.get_mut(index)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Rooms still hidden
    pub fn hidden_count(&self) -> usize {
        self.rooms.iter().filter(|r| !r.is_revealed()).count()
    }

    /// Uncover every hidden room without applying any effect.
    /// Returns how many rooms were flipped.
    pub fn reveal_all(&mut self) -> usize {
        let mut flipped = 0;
        for room in self.rooms.iter_mut().filter(|r| !r.is_revealed()) {
            room.mark_revealed();
            flipped += 1;
        }
        flipped
    }

    /// Convert (column, row) to a room index
    #[inline]
    pub fn xy_to_idx(x: usize, y: usize) -> usize {
        y * GRID_WIDTH + x
    }

    /// Convert a room index to (column, row)
    #[inline]
    pub fn idx_to_xy(idx: usize) -> (usize, usize) {
        (idx % GRID_WIDTH, idx / GRID_WIDTH)
    }
}

/// Fisher-Yates: walk from the last slot down, swapping each with a
/// uniformly chosen slot in `[0, i]`.
fn shuffle<T>(items: &mut [T], rng: &mut impl Rng) {
    for i in (1..items.len()).rev() {
        let j = rng.gen_range(0..=i);
        items.swap(i, j);
    }
}
