//! RON config loader
//!
//! Loads game settings from an external RON file, with fallback to
//! hardcoded defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dungeon::{Composition, GRID_CELLS};
use crate::game::DefeatScoring;

/// Where the game looks for its config
pub const DEFAULT_CONFIG_PATH: &str = "assets/config.ron";
/// Leaderboard backend used when none is configured
pub const DEFAULT_API_BASE: &str = "https://victors-descent-backend.onrender.com";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("room composition has {total} rooms, the grid needs {expected}")]
    InvalidComposition { total: usize, expected: usize },
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Room counts per kind; must add up to a full grid
    pub composition: Composition,
    /// Leaderboard service base URL
    pub api_base: String,
    /// Seconds before the message banner clears
    pub message_ttl_secs: u64,
    /// Refuse to start a run until a username is known
    pub require_login: bool,
    /// Rooms credited when the hero dies
    pub defeat_scoring: DefeatScoring,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            composition: Composition::CANONICAL,
            api_base: DEFAULT_API_BASE.to_string(),
            message_ttl_secs: 3,
            require_login: false,
            defeat_scoring: DefeatScoring::FullGrid,
        }
    }
}

impl GameConfig {
    /// Load from the default path, falling back to defaults on any error
    pub fn load() -> Self {
        Self::load_from(Path::new(DEFAULT_CONFIG_PATH)).unwrap_or_else(|e| {
            log::warn!("Failed to load {}: {}. Using defaults.", DEFAULT_CONFIG_PATH, e);
            Self::default()
        })
    }

    /// Load from a RON file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        log::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    /// Parse and validate a RON document
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.composition.is_valid() {
            return Err(ConfigError::InvalidComposition {
                total: self.composition.total(),
                expected: GRID_CELLS,
            });
        }
        Ok(())
    }

    pub fn message_ttl(&self) -> Duration {
        Duration::from_secs(self.message_ttl_secs)
    }
}

/// Write the default config out as RON
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let ron = ron::ser::to_string_pretty(&GameConfig::default(), ron::ser::PrettyConfig::default())?;
    fs::write(path, ron)?;
    Ok(())
}
