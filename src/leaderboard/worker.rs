//! Background leaderboard worker
//!
//! HTTP calls block, so they run on a dedicated thread. The game queues
//! requests and never waits for them; results land in shared state that the
//! game polls once per frame.

use std::collections::VecDeque;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use super::client::{LeaderboardApi, LeaderboardEntry, Registration};

/// Work for the network thread
#[derive(Debug, Clone, PartialEq, Eq)]
enum NetRequest {
    Register(String),
    Refresh,
    Submit { username: String, score: u32 },
}

/// Something the network thread finished
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetEvent {
    Registered(Registration),
    RegisterFailed(String),
    ScoreSubmitted { username: String, score: u32 },
    SubmitFailed(String),
}

/// Latest known leaderboard
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LeaderboardStatus {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Vec<LeaderboardEntry>),
    Failed(String),
}

#[derive(Debug, Default)]
struct Shared {
    status: LeaderboardStatus,
    events: VecDeque<NetEvent>,
    pending: usize,
}

/// Handle to the network thread
///
/// Dropping the handle closes the request channel; the thread exits after
/// its current request.
pub struct LeaderboardWorker {
    requests: Sender<NetRequest>,
    shared: Arc<Mutex<Shared>>,
}

impl LeaderboardWorker {
    pub fn spawn(api: Box<dyn LeaderboardApi>) -> Self {
        let (tx, rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(Shared::default()));

        let thread_shared = Arc::clone(&shared);
        let spawned = thread::Builder::new()
            .name("leaderboard".to_string())
            .spawn(move || run(api, rx, thread_shared));
        if let Err(e) = spawned {
            log::error!("Failed to start leaderboard thread: {}", e);
        }

        Self { requests: tx, shared }
    }

    pub fn register(&self, username: &str) {
        self.queue(NetRequest::Register(username.to_string()));
    }

    /// Reload the leaderboard
    pub fn refresh(&self) {
        self.shared.lock().status = LeaderboardStatus::Loading;
        self.queue(NetRequest::Refresh);
    }

    /// Post a score, then reload the leaderboard if it went through
    pub fn submit_score(&self, username: &str, score: u32) {
        self.queue(NetRequest::Submit {
            username: username.to_string(),
            score,
        });
    }

    pub fn leaderboard(&self) -> LeaderboardStatus {
        self.shared.lock().status.clone()
    }

    /// Take every finished event, oldest first
    pub fn drain_events(&self) -> Vec<NetEvent> {
        self.shared.lock().events.drain(..).collect()
    }

    /// Requests queued or in progress
    pub fn pending(&self) -> usize {
        self.shared.lock().pending
    }

    fn queue(&self, request: NetRequest) {
        self.shared.lock().pending += 1;
        if self.requests.send(request).is_err() {
            log::warn!("Leaderboard thread is gone; request dropped");
            self.shared.lock().pending -= 1;
        }
    }
}

fn run(api: Box<dyn LeaderboardApi>, requests: Receiver<NetRequest>, shared: Arc<Mutex<Shared>>) {
    log::debug!("Leaderboard thread started");

    for request in requests {
        match request {
            NetRequest::Register(username) => {
                let event = match api.register(&username) {
                    Ok(registration) => {
                        log::info!("Registered as {}", registration.username);
                        NetEvent::Registered(registration)
                    }
                    Err(e) => {
                        log::warn!("Register error: {}", e);
                        NetEvent::RegisterFailed(e.to_string())
                    }
                };
                shared.lock().events.push_back(event);
            }
            NetRequest::Refresh => refresh(api.as_ref(), &shared),
            NetRequest::Submit { username, score } => match api.submit_score(&username, score) {
                Ok(()) => {
                    log::info!("Submitted score {} for {}", score, username);
                    shared.lock().events.push_back(NetEvent::ScoreSubmitted { username, score });
                    refresh(api.as_ref(), &shared);
                }
                Err(e) => {
                    log::warn!("Score submit error: {}", e);
                    shared.lock().events.push_back(NetEvent::SubmitFailed(e.to_string()));
                }
            },
        }
        shared.lock().pending -= 1;
    }

    log::debug!("Leaderboard thread stopped");
}

fn refresh(api: &dyn LeaderboardApi, shared: &Mutex<Shared>) {
    let status = match api.leaderboard() {
        Ok(rows) => LeaderboardStatus::Loaded(rows),
        Err(e) => {
            log::warn!("Leaderboard error: {}", e);
            LeaderboardStatus::Failed(e.to_string())
        }
    };
    shared.lock().status = status;
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::leaderboard::LeaderboardError;
    use std::time::{Duration, Instant};

    /// In-memory backend that records every call
    #[derive(Clone, Default)]
    pub(crate) struct FakeApi {
        pub calls: Arc<Mutex<Vec<String>>>,
        pub rows: Arc<Mutex<Vec<LeaderboardEntry>>>,
        pub fail: bool,
    }

    impl FakeApi {
        fn error() -> LeaderboardError {
            LeaderboardError::Http { status: 500, message: "HTTP 500".to_string() }
        }
    }

    impl LeaderboardApi for FakeApi {
        fn register(&self, username: &str) -> Result<Registration, LeaderboardError> {
            self.calls.lock().push(format!("register {}", username));
            if self.fail {
                return Err(Self::error());
            }
            Ok(Registration { username: username.to_string(), id: Some("1".to_string()) })
        }

        fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, LeaderboardError> {
            self.calls.lock().push("leaderboard".to_string());
            if self.fail {
                return Err(Self::error());
            }
            Ok(self.rows.lock().clone())
        }

        fn submit_score(&self, username: &str, score: u32) -> Result<(), LeaderboardError> {
            self.calls.lock().push(format!("submit {} {}", username, score));
            if self.fail {
                return Err(Self::error());
            }
            self.rows.lock().push(LeaderboardEntry { username: username.to_string(), score: score as i64 });
            Ok(())
        }
    }

    /// Block until the worker has nothing left to do
    pub(crate) fn wait_idle(worker: &LeaderboardWorker) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while worker.pending() > 0 {
            assert!(Instant::now() < deadline, "leaderboard worker did not finish");
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_register() {
        let api = FakeApi::default();
        let worker = LeaderboardWorker::spawn(Box::new(api.clone()));
        worker.register("victor");
        wait_idle(&worker);

        assert_eq!(
            worker.drain_events(),
            vec![NetEvent::Registered(Registration {
                username: "victor".to_string(),
                id: Some("1".to_string()),
            })]
        );
        assert!(worker.drain_events().is_empty());
    }

    #[test]
    fn test_submit_refreshes_leaderboard() {
        let api = FakeApi::default();
        let worker = LeaderboardWorker::spawn(Box::new(api.clone()));
        worker.submit_score("victor", 114);
        wait_idle(&worker);

        assert_eq!(*api.calls.lock(), vec!["submit victor 114".to_string(), "leaderboard".to_string()]);
        assert_eq!(
            worker.leaderboard(),
            LeaderboardStatus::Loaded(vec![LeaderboardEntry { username: "victor".to_string(), score: 114 }])
        );
        assert_eq!(
            worker.drain_events(),
            vec![NetEvent::ScoreSubmitted { username: "victor".to_string(), score: 114 }]
        );
    }

    #[test]
    fn test_failures_are_reported() {
        let api = FakeApi { fail: true, ..FakeApi::default() };
        let worker = LeaderboardWorker::spawn(Box::new(api.clone()));
        assert_eq!(worker.leaderboard(), LeaderboardStatus::NotLoaded);

        worker.submit_score("victor", 64);
        worker.refresh();
        wait_idle(&worker);

        // A failed submit does not trigger a refresh of its own
        assert_eq!(*api.calls.lock(), vec!["submit victor 64".to_string(), "leaderboard".to_string()]);
        assert_eq!(worker.drain_events(), vec![NetEvent::SubmitFailed("HTTP 500".to_string())]);
        assert_eq!(worker.leaderboard(), LeaderboardStatus::Failed("HTTP 500".to_string()));
    }
}
