//! Pending initialization result

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use contracts::{BridgeError, Generation, InitializationErrorKind};
use tokio::sync::oneshot;

/// Message reported when the attempt was dropped before the SDK answered
const ABANDONED: &str = "initialization abandoned";

/// What an initialization request resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitOutcome {
    pub success: bool,
    /// SDK error string; `ERROR_NONE` on success
    pub message: String,
}

impl InitOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: InitializationErrorKind::None.as_str().to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }

    pub fn into_result(self) -> Result<(), BridgeError> {
        if self.success {
            Ok(())
        } else {
            Err(BridgeError::HardwareInitializationFailed {
                reason: self.message,
            })
        }
    }
}

/// Answer to `SessionController::initialize`
pub enum InitRequest {
    /// The SDK was asked; await the outcome
    Pending(PendingInit),
    /// A tracker already exists; nothing was requested
    AlreadyInitialized,
}

/// Resolves once the SDK reports the initialization result
///
/// Await it from async code or call `blocking_wait` from a plain thread.
#[derive(Debug)]
pub struct PendingInit {
    generation: Generation,
    rx: oneshot::Receiver<InitOutcome>,
}

impl PendingInit {
    pub(crate) fn new(generation: Generation, rx: oneshot::Receiver<InitOutcome>) -> Self {
        Self { generation, rx }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Block the current thread until resolved
    ///
    /// Must not be called from within an async runtime.
    pub fn blocking_wait(self) -> InitOutcome {
        self.rx
            .blocking_recv()
            .unwrap_or_else(|_| InitOutcome::failed(ABANDONED))
    }
}

impl Future for PendingInit {
    type Output = InitOutcome;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or_else(|_| InitOutcome::failed(ABANDONED)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pending_resolves_with_sent_outcome() {
        let (tx, rx) = oneshot::channel();
        let pending = PendingInit::new(Generation::new(1), rx);
        tx.send(InitOutcome::succeeded()).unwrap();
        let outcome = pending.await;
        assert!(outcome.success);
        assert_eq!(outcome.message, "ERROR_NONE");
        assert!(outcome.into_result().is_ok());
    }

    #[tokio::test]
    async fn test_dropped_sender_reports_abandoned() {
        let (tx, rx) = oneshot::channel::<InitOutcome>();
        let pending = PendingInit::new(Generation::new(1), rx);
        drop(tx);
        let outcome = pending.await;
        assert!(!outcome.success);
        assert_eq!(outcome.message, ABANDONED);
    }

    #[test]
    fn test_failed_outcome_maps_to_hardware_error() {
        let err = InitOutcome::failed("ERROR_INIT").into_result().unwrap_err();
        assert!(matches!(
            err,
            BridgeError::HardwareInitializationFailed { reason } if reason == "ERROR_INIT"
        ));
    }
}
