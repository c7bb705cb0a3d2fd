//! Data loading and external game settings
//!
//! Game settings live in a RON file so room mixes and the leaderboard
//! backend can change without a rebuild.

pub mod loader;

pub use loader::{GameConfig, ConfigError, export_default_config, DEFAULT_CONFIG_PATH, DEFAULT_API_BASE};
