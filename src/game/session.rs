//! Game session
//!
//! Glue between the run controller and everything around it: the message
//! log, the player profile and the leaderboard worker. The UI talks only to
//! the session.

use std::time::Instant;

use thiserror::Error;

use crate::data::GameConfig;
use crate::dungeon::Severity;
use crate::leaderboard::{LeaderboardApi, LeaderboardStatus, LeaderboardWorker, NetEvent};
use crate::save::{PlayerProfile, ProfileStore};
use super::messages::MessageLog;
use super::outcome::RunOutcome;
use super::state::{RevealReport, RunController, RunState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoginError {
    #[error("Username required")]
    EmptyUsername,
    #[error("Login already in progress")]
    Pending,
}

/// Progress of the latest login attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStatus {
    Idle,
    Pending,
    Succeeded,
    Failed(String),
}

pub struct Session {
    run: RunController,
    profile: PlayerProfile,
    store: ProfileStore,
    leaderboard: LeaderboardWorker,
    messages: MessageLog,
    require_login: bool,
    leaderboard_open: bool,
    login: LoginStatus,
}

impl Session {
    pub fn new(config: &GameConfig, store: ProfileStore, api: Box<dyn LeaderboardApi>) -> Self {
        let profile = store.load();
        Self {
            run: RunController::from_config(config),
            profile,
            store,
            leaderboard: LeaderboardWorker::spawn(api),
            messages: MessageLog::new(config.message_ttl()),
            require_login: config.require_login,
            leaderboard_open: false,
            login: LoginStatus::Idle,
        }
    }

    pub fn run(&self) -> &RunController {
        &self.run
    }

    #[cfg(test)]
    pub(crate) fn run_mut(&mut self) -> &mut RunController {
        &mut self.run
    }

    /// Block until queued leaderboard requests have finished
    #[cfg(test)]
    pub(crate) fn wait_for_network(&self) {
        crate::leaderboard::worker::tests::wait_idle(&self.leaderboard);
    }

    pub fn profile(&self) -> &PlayerProfile {
        &self.profile
    }

    pub fn username(&self) -> Option<&str> {
        self.profile.username.as_deref()
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn leaderboard(&self) -> LeaderboardStatus {
        self.leaderboard.leaderboard()
    }

    pub fn leaderboard_open(&self) -> bool {
        self.leaderboard_open
    }

    pub fn login_status(&self) -> &LoginStatus {
        &self.login
    }

    /// Whether a run may start without logging in first
    pub fn can_start(&self) -> bool {
        !self.require_login || self.profile.is_logged_in()
    }

    /// Start (or restart) a run. Returns false if a login is required first.
    pub fn start_run(&mut self, now: Instant) -> bool {
        if !self.can_start() {
            self.messages.push("Login to start a run.", Severity::Info, now);
            return false;
        }

        let restarting = self.run.state() != RunState::Idle;
        self.run.start_run();
        self.messages.log(
            if restarting { "Run reset." } else { "A new descent begins." },
            Severity::Info,
        );

        self.profile.record_run_start();
        self.save_profile();
        true
    }

    /// Reveal a room; illegal reveals are ignored
    pub fn reveal(&mut self, index: usize, now: Instant) -> Option<RevealReport> {
        let report = self.run.reveal(index)?;
        self.messages.push(report.event.message(), report.event.severity(), now);

        if let Some(outcome) = report.outcome {
            let severity = if outcome.victory { Severity::Safe } else { Severity::Death };
            self.messages.push(outcome.message(), severity, now);
            self.finish_run(outcome, now);
        }
        Some(report)
    }

    /// Record the result and hand the score to the leaderboard
    fn finish_run(&mut self, outcome: RunOutcome, now: Instant) {
        self.profile.record_outcome(&outcome);
        self.save_profile();

        match self.profile.username.as_deref() {
            Some(username) => self.leaderboard.submit_score(username, outcome.score()),
            None => self.messages.push("Login to submit your score.", Severity::Info, now),
        }
    }

    /// Register a username with the leaderboard
    pub fn login(&mut self, username: &str) -> Result<(), LoginError> {
        if self.login == LoginStatus::Pending {
            return Err(LoginError::Pending);
        }
        let username = username.trim();
        if username.is_empty() {
            return Err(LoginError::EmptyUsername);
        }
        self.login = LoginStatus::Pending;
        self.leaderboard.register(username);
        Ok(())
    }

    /// Forget a finished login attempt
    pub fn reset_login(&mut self) {
        if self.login != LoginStatus::Pending {
            self.login = LoginStatus::Idle;
        }
    }

    /// Show or hide the leaderboard; showing it reloads the rows
    pub fn toggle_leaderboard(&mut self) {
        self.leaderboard_open = !self.leaderboard_open;
        if self.leaderboard_open {
            self.leaderboard.refresh();
        }
    }

    /// Per-frame housekeeping: expire the banner, apply network results
    pub fn tick(&mut self, now: Instant) {
        self.messages.tick(now);

        for event in self.leaderboard.drain_events() {
            match event {
                NetEvent::Registered(registration) => {
                    let message = format!("Logged in as {}", registration.username);
                    self.profile.set_user(registration.username, registration.id);
                    self.save_profile();
                    self.login = LoginStatus::Succeeded;
                    self.messages.push(message, Severity::Safe, now);
                }
                NetEvent::RegisterFailed(_) => {
                    self.login = LoginStatus::Failed("Server error".to_string());
                }
                NetEvent::ScoreSubmitted { score, .. } => {
                    self.messages.log(format!("Score {} submitted.", score), Severity::Info);
                }
                NetEvent::SubmitFailed(_) => {
                    self.messages.push("Could not submit score.", Severity::Death, now);
                }
            }
        }
    }

    fn save_profile(&self) {
        if let Err(e) = self.store.save(&self.profile) {
            log::warn!("Failed to save profile: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dungeon::{Grid, RoomKind, GRID_CELLS};
    use crate::leaderboard::worker::tests::FakeApi;
    use tempfile::TempDir;

    fn session_with(config: GameConfig, api: FakeApi) -> (Session, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profile.json"));
        (Session::new(&config, store, Box::new(api)), dir)
    }

    fn settle(session: &mut Session) {
        session.wait_for_network();
        session.tick(Instant::now());
    }

    fn two_goblins() -> Grid {
        let mut kinds = vec![RoomKind::Goblin, RoomKind::Goblin];
        kinds.resize(GRID_CELLS, RoomKind::Empty);
        Grid::from_kinds(&kinds)
    }

    fn log_texts(session: &Session) -> Vec<String> {
        session.messages().entries().iter().map(|e| e.text.clone()).collect()
    }

    #[test]
    fn test_start_and_restart_messages() {
        let (mut session, _dir) = session_with(GameConfig::default(), FakeApi::default());
        let now = Instant::now();
        assert!(session.start_run(now));
        assert!(session.start_run(now));

        assert_eq!(log_texts(&session), vec!["A new descent begins.", "Run reset."]);
        assert_eq!(session.profile().stats.total_runs, 2);
        assert_eq!(session.run().state(), RunState::Active);
    }

    #[test]
    fn test_require_login_blocks_start() {
        let config = GameConfig { require_login: true, ..GameConfig::default() };
        let (mut session, _dir) = session_with(config, FakeApi::default());

        assert!(!session.start_run(Instant::now()));
        assert_eq!(session.run().state(), RunState::Idle);
        assert_eq!(session.messages().banner(), Some("Login to start a run."));

        session.login("victor").unwrap();
        settle(&mut session);
        assert!(session.start_run(Instant::now()));
    }

    #[test]
    fn test_login_flow() {
        let (mut session, dir) = session_with(GameConfig::default(), FakeApi::default());
        assert_eq!(session.login("   "), Err(LoginError::EmptyUsername));

        session.login("  victor ").unwrap();
        assert_eq!(session.login_status(), &LoginStatus::Pending);
        settle(&mut session);

        assert_eq!(session.login_status(), &LoginStatus::Succeeded);
        assert_eq!(session.username(), Some("victor"));
        assert_eq!(session.profile().user_id.as_deref(), Some("1"));
        assert_eq!(session.messages().banner(), Some("Logged in as victor"));

        // Persisted for the next launch
        let reloaded = ProfileStore::new(dir.path().join("profile.json")).load();
        assert_eq!(reloaded.username.as_deref(), Some("victor"));
    }

    #[test]
    fn test_login_failure() {
        let api = FakeApi { fail: true, ..FakeApi::default() };
        let (mut session, _dir) = session_with(GameConfig::default(), api);
        session.login("victor").unwrap();
        settle(&mut session);

        assert_eq!(session.login_status(), &LoginStatus::Failed("Server error".to_string()));
        assert_eq!(session.username(), None);

        session.reset_login();
        assert_eq!(session.login_status(), &LoginStatus::Idle);
    }

    #[test]
    fn test_defeat_without_login_skips_submission() {
        let api = FakeApi::default();
        let (mut session, _dir) = session_with(GameConfig::default(), api.clone());
        session.run_mut().start_run_with(two_goblins());

        let now = Instant::now();
        assert!(session.reveal(0, now).unwrap().outcome.is_none());
        let outcome = session.reveal(1, now).unwrap().outcome.unwrap();
        assert_eq!(outcome.score(), 64);
        settle(&mut session);

        assert!(api.calls.lock().is_empty());
        let log = log_texts(&session);
        assert_eq!(
            &log[log.len() - 3..],
            &[
                "Goblin defeated! Lost 2 lives.".to_string(),
                "Victor was slain...".to_string(),
                "Login to submit your score.".to_string(),
            ]
        );
        assert_eq!(session.profile().stats.defeats, 1);
    }

    #[test]
    fn test_finished_run_submits_score() {
        let api = FakeApi::default();
        let (mut session, _dir) = session_with(GameConfig::default(), api.clone());
        session.login("victor").unwrap();
        settle(&mut session);

        session.run_mut().start_run_with(Grid::from_kinds(&[RoomKind::Empty; GRID_CELLS]));
        let now = Instant::now();
        for index in 0..GRID_CELLS {
            session.reveal(index, now);
        }
        settle(&mut session);

        assert_eq!(
            *api.calls.lock(),
            vec!["register victor".to_string(), "submit victor 114".to_string(), "leaderboard".to_string()]
        );
        assert_eq!(session.profile().stats.best_score, 114);
        assert!(log_texts(&session).contains(&"Score 114 submitted.".to_string()));
        assert!(matches!(session.leaderboard(), LeaderboardStatus::Loaded(rows) if rows.len() == 1));
    }

    #[test]
    fn test_submit_failure_leaves_run_ended() {
        let api = FakeApi { fail: true, ..FakeApi::default() };
        let (mut session, _dir) = session_with(GameConfig::default(), api);
        session.profile.set_user("victor".to_string(), None);
        session.run_mut().start_run_with(two_goblins());

        let now = Instant::now();
        session.reveal(0, now);
        session.reveal(1, now);
        settle(&mut session);

        assert_eq!(session.messages().banner(), Some("Could not submit score."));
        assert!(matches!(session.run().state(), RunState::Ended(_)));
        assert!(session.reveal(2, now).is_none());
    }

    #[test]
    fn test_toggle_leaderboard_refreshes() {
        let api = FakeApi::default();
        let (mut session, _dir) = session_with(GameConfig::default(), api.clone());
        session.toggle_leaderboard();
        assert!(session.leaderboard_open());
        settle(&mut session);
        assert_eq!(session.leaderboard(), LeaderboardStatus::Loaded(Vec::new()));

        session.toggle_leaderboard();
        assert!(!session.leaderboard_open());
        assert_eq!(api.calls.lock().len(), 1);
    }
}
