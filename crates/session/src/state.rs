//! SessionState - the record guarded by the session lock

use contracts::{BridgeError, GazeTracker, Generation};
use tokio::sync::oneshot;

use crate::pending::InitOutcome;

/// An initialized tracker and the generation it belongs to
pub struct ActiveSession {
    pub generation: Generation,
    pub tracker: Box<dyn GazeTracker>,
}

/// An initialization request the SDK has not answered yet
pub struct PendingAttempt {
    pub generation: Generation,
    tx: oneshot::Sender<InitOutcome>,
}

impl PendingAttempt {
    /// Hand the outcome to whoever awaits the request
    pub fn resolve(self, outcome: InitOutcome) {
        // The caller may have stopped waiting
        let _ = self.tx.send(outcome);
    }
}

/// Result of `SessionState::begin_attempt`
pub enum AttemptStart {
    Started {
        generation: Generation,
        rx: oneshot::Receiver<InitOutcome>,
    },
    AlreadyInitialized,
}

/// Session identity: handle, in-flight attempt and generation counter
///
/// An attempt and an active session never coexist: an attempt is only
/// recorded while no handle exists, and activation consumes the attempt.
#[derive(Default)]
pub struct SessionState {
    active: Option<ActiveSession>,
    attempt: Option<PendingAttempt>,
    last_generation: Generation,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_attempting(&self) -> bool {
        self.attempt.is_some()
    }

    /// Generation of the active session
    pub fn generation(&self) -> Option<Generation> {
        self.active.as_ref().map(|s| s.generation)
    }

    /// Generation of the in-flight attempt
    pub fn attempt_generation(&self) -> Option<Generation> {
        self.attempt.as_ref().map(|a| a.generation)
    }

    /// Record a new attempt under a fresh generation
    pub fn begin_attempt(&mut self) -> Result<AttemptStart, BridgeError> {
        if self.attempt.is_some() {
            return Err(BridgeError::AlreadyAttempting);
        }
        if self.active.is_some() {
            return Ok(AttemptStart::AlreadyInitialized);
        }

        let generation = self.last_generation.next();
        self.last_generation = generation;
        let (tx, rx) = oneshot::channel();
        self.attempt = Some(PendingAttempt { generation, tx });
        Ok(AttemptStart::Started { generation, rx })
    }

    /// Take the attempt if it belongs to `generation`
    pub fn take_attempt(&mut self, generation: Generation) -> Option<PendingAttempt> {
        match &self.attempt {
            Some(attempt) if attempt.generation == generation => self.attempt.take(),
            _ => None,
        }
    }

    /// Drop the in-flight attempt; its waiter sees the request abandoned
    pub fn abandon_attempt(&mut self) -> Option<Generation> {
        self.attempt.take().map(|a| a.generation)
    }

    pub fn activate(&mut self, generation: Generation, tracker: Box<dyn GazeTracker>) {
        self.active = Some(ActiveSession {
            generation,
            tracker,
        });
    }

    pub fn take_active(&mut self) -> Option<ActiveSession> {
        self.active.take()
    }

    pub fn tracker(&self) -> Result<&dyn GazeTracker, BridgeError> {
        self.active
            .as_ref()
            .map(|s| s.tracker.as_ref())
            .ok_or(BridgeError::NotInitialized)
    }

    pub fn tracker_mut(&mut self) -> Result<&mut dyn GazeTracker, BridgeError> {
        match self.active.as_mut() {
            Some(session) => Ok(session.tracker.as_mut()),
            None => Err(BridgeError::NotInitialized),
        }
    }
}
