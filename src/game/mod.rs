//! Game module - run state machine, outcomes and the session around them

mod state;
mod outcome;
mod messages;
mod session;

pub use state::{RunController, RunState, RunEnd, RevealReport, EngineError, RevealRejection};
pub use outcome::{RunOutcome, DefeatScoring, compute_score, VICTORY_BONUS};
pub use messages::{MessageLog, LogEntry};
pub use session::{Session, LoginError, LoginStatus};
