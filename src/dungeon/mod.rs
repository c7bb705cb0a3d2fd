//! Dungeon rules - rooms, the grid, the hero and reveal resolution

pub mod room;
pub mod grid;
pub mod hero;
pub mod reveal;

pub use room::{Category, Room, RoomKind};
pub use grid::{Composition, Grid, GRID_CELLS, GRID_WIDTH};
pub use hero::{Hero, MAX_LIVES, POTIONS_PER_HEAL};
pub use reveal::{reveal, foe_strength, Effect, RevealEvent, Severity, Toll};
