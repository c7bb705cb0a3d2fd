//! Save system
//!
//! Handles the player profile.

pub mod profile;

pub use profile::{PlayerProfile, ProfileStats, ProfileStore, ProfileError};
