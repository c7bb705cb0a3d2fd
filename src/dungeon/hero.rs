//! Hero resources for a single run

use serde::{Deserialize, Serialize};

/// Lives at the start of a run, and the most the hero can hold
pub const MAX_LIVES: i32 = 3;
/// Potions consumed for one extra life
pub const POTIONS_PER_HEAL: u32 = 3;

/// Victor and his party
///
/// `lives` is signed: a goblin can knock the hero below zero in one hit.
/// Display code clamps, the rules do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hero {
    pub lives: i32,
    pub allies: u32,
    /// Always `1 + allies`
    pub party_size: u32,
    pub potions: u32,
    pub armour: u32,
    pub weapons: u32,
    pub revealed_count: usize,
}

impl Hero {
    /// Fresh hero for a new run
    pub fn new() -> Self {
        Self {
            lives: MAX_LIVES,
            allies: 0,
            party_size: 1,
            potions: 0,
            armour: 0,
            weapons: 0,
            revealed_count: 0,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }

    /// Lives for display, never below zero
    pub fn display_lives(&self) -> u32 {
        self.lives.max(0) as u32
    }

    pub(crate) fn gain_ally(&mut self) {
        self.allies += 1;
        self.party_size += 1;
    }

    /// Caller checks `allies >= n` first
    pub(crate) fn lose_allies(&mut self, n: u32) {
        self.allies -= n;
        self.party_size -= n;
    }
}

impl Default for Hero {
    fn default() -> Self {
        Self::new()
    }
}
