//! Run outcomes and scoring

use serde::{Deserialize, Serialize};

/// Bonus points for clearing the whole grid
pub const VICTORY_BONUS: u32 = 50;

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunOutcome {
    pub victory: bool,
    pub defeat: bool,
    /// Rooms credited for scoring
    pub explored: usize,
}

impl RunOutcome {
    pub fn victory(explored: usize) -> Self {
        Self { victory: true, defeat: false, explored }
    }

    pub fn defeat(explored: usize) -> Self {
        Self { victory: false, defeat: true, explored }
    }

    pub fn score(&self) -> u32 {
        compute_score(self)
    }

    /// Closing line for the log
    pub fn message(&self) -> &'static str {
        if self.victory {
            "Dungeon fully explored! Victory!"
        } else {
            "Victor was slain..."
        }
    }
}

/// Rooms credited when the hero dies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefeatScoring {
    /// Every room counts, since the board is uncovered on death
    #[default]
    FullGrid,
    /// Only rooms the hero actually walked into
    RoomsExplored,
}

/// Points for a finished run: rooms explored plus the victory bonus
pub fn compute_score(outcome: &RunOutcome) -> u32 {
    let bonus = if outcome.victory { VICTORY_BONUS } else { 0 };
    (outcome.explored as u32).saturating_add(bonus)
}
