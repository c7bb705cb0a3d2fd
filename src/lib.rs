//! Victor's Descent - a terminal dungeon crawl with a remote leaderboard
//!
//! Uncover the 64 rooms of the dungeon one by one. Gather potions, gear and
//! allies, survive the ogres and goblins, and post your score.

pub mod dungeon;
pub mod game;
pub mod data;
pub mod save;
pub mod leaderboard;
pub mod ui;

// Re-export commonly used types
pub use dungeon::{Grid, Hero, Room, RoomKind};
pub use game::{RunController, RunOutcome, RunState, Session};
pub use data::GameConfig;
