//! Player profile and persistent stats
//!
//! Remembers who is logged in to the leaderboard and keeps a tally of runs
//! across sessions.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::game::RunOutcome;

/// Current profile version for compatibility
const PROFILE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Persistent player profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    /// Version for compatibility checking
    pub version: u32,
    /// Leaderboard name, once registered
    pub username: Option<String>,
    /// Id handed out by the leaderboard on registration
    pub user_id: Option<String>,
    pub stats: ProfileStats,
}

/// Profile statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileStats {
    /// Total runs started
    pub total_runs: u32,
    pub victories: u32,
    pub defeats: u32,
    pub best_score: u32,
    /// Rooms credited across all finished runs
    pub rooms_explored: u64,
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            version: PROFILE_VERSION,
            username: None,
            user_id: None,
            stats: ProfileStats::default(),
        }
    }
}

impl PlayerProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.username.is_some()
    }

    /// Remember a leaderboard registration
    pub fn set_user(&mut self, username: String, user_id: Option<String>) {
        self.username = Some(username);
        self.user_id = user_id;
    }

    /// Record the start of a new run
    pub fn record_run_start(&mut self) {
        self.stats.total_runs += 1;
    }

    /// Record a finished run
    pub fn record_outcome(&mut self, outcome: &RunOutcome) {
        if outcome.victory {
            self.stats.victories += 1;
        } else {
            self.stats.defeats += 1;
        }
        self.stats.rooms_explored += outcome.explored as u64;
        self.stats.best_score = self.stats.best_score.max(outcome.score());
    }
}

/// Reads and writes the profile file
#[derive(Debug, Clone)]
pub struct ProfileStore {
    path: PathBuf,
}

impl ProfileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory
    pub fn default_location() -> Self {
        use directories::ProjectDirs;

        let path = if let Some(proj_dirs) = ProjectDirs::from("com", "victors-descent", "VictorsDescent") {
            proj_dirs.data_local_dir().join("profile.json")
        } else {
            PathBuf::from("./profile.json")
        };
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the player profile (or create default)
    pub fn load(&self) -> PlayerProfile {
        if self.path.exists() {
            match fs::read_to_string(&self.path) {
                Ok(data) => match serde_json::from_str(&data) {
                    Ok(profile) => {
                        log::info!("Profile loaded from {:?}", self.path);
                        return profile;
                    }
                    Err(e) => log::warn!("Failed to parse profile: {}, creating new", e),
                },
                Err(e) => log::warn!("Failed to read profile: {}, creating new", e),
            }
        }

        log::info!("Creating new profile");
        PlayerProfile::new()
    }

    /// Save the player profile
    pub fn save(&self, profile: &PlayerProfile) -> Result<(), ProfileError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(profile)?;
        fs::write(&self.path, json)?;

        log::debug!("Profile saved to {:?}", self.path);
        Ok(())
    }
}
