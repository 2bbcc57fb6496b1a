//! # Session
//!
//! Lifecycle of the single gaze tracking session.
//!
//! Responsibilities:
//! - Serialize initialization against concurrent callers
//! - Own the tracker handle and release it exactly once
//! - Forward hardware callbacks into the event bus, tagged by generation
//! - Tear down so that no in-flight callback reaches freed state

mod callback_adapter;
mod controller;
mod pending;
mod state;

pub use callback_adapter::{tracking_event, CallbackAdapter};
pub use controller::{ControllerConfig, ReleaseCause, SessionController};
pub use pending::{InitOutcome, InitRequest, PendingInit};
pub use state::{ActiveSession, AttemptStart, PendingAttempt, SessionState};
