//! Remote leaderboard - HTTP client and the background worker that drives it

pub mod client;
pub mod worker;

pub use client::{HttpLeaderboard, LeaderboardApi, LeaderboardEntry, LeaderboardError, Registration};
pub use worker::{LeaderboardStatus, LeaderboardWorker, NetEvent};
