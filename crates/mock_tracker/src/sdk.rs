//! Simulated tracker SDK entry point

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

use contracts::{
    GazeTracker, InitializationCallback, InitializationErrorKind, InitializationResult,
    MockTrackerConfig, TrackerOptions, TrackerSdk,
};
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::config::MockConfig;
use crate::stats::MockStats;
use crate::tracker::MockGazeTracker;

/// Initialization held back by `MockConfig::defer_init`
struct DeferredInit {
    options: TrackerOptions,
    callback: InitializationCallback,
}

/// Simulated SDK
///
/// Initialization completes on a background thread after
/// `MockTrackerConfig::init_delay_ms`, inline when the delay is zero, or on
/// demand when deferred.
pub struct MockTrackerSdk {
    settings: MockTrackerConfig,
    config: MockConfig,
    stats: Arc<MockStats>,
    next_id: AtomicU64,
    pending: Mutex<VecDeque<DeferredInit>>,
}

impl MockTrackerSdk {
    pub fn new(settings: MockTrackerConfig) -> Self {
        Self::with_config(settings, MockConfig::default())
    }

    pub fn with_config(settings: MockTrackerConfig, config: MockConfig) -> Self {
        Self {
            settings,
            config,
            stats: Arc::new(MockStats::default()),
            next_id: AtomicU64::new(1),
            pending: Mutex::new(VecDeque::new()),
        }
    }

    pub fn stats(&self) -> Arc<MockStats> {
        Arc::clone(&self.stats)
    }

    /// Number of deferred initializations waiting for completion
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Complete the oldest deferred initialization as configured
    ///
    /// Returns false when nothing was pending.
    pub fn complete_pending(&self) -> bool {
        let Some(deferred) = self.pending.lock().pop_front() else {
            return false;
        };
        let outcome = self.create_tracker(deferred.options);
        (deferred.callback)(outcome);
        true
    }

    /// Fail the oldest deferred initialization with `kind`
    pub fn fail_pending(&self, kind: InitializationErrorKind) -> bool {
        let Some(deferred) = self.pending.lock().pop_front() else {
            return false;
        };
        (deferred.callback)(Err(kind));
        true
    }

    fn create_tracker(&self, options: TrackerOptions) -> InitializationResult {
        if let Some(kind) = self.config.fail_init {
            return Err(kind);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let tracker = MockGazeTracker::new(
            id,
            self.settings.clone(),
            self.config.clone(),
            options,
            Arc::clone(&self.stats),
        );
        debug!(tracker = id, "mock tracker created");
        Ok(Box::new(tracker))
    }
}

impl TrackerSdk for MockTrackerSdk {
    fn version_name(&self) -> String {
        self.config.version_name.clone()
    }

    #[instrument(
        name = "mock_tracker_initialize",
        skip(self, license, options, callback),
        fields(deferred = self.config.defer_init, has_options = options.is_some())
    )]
    fn initialize(
        &self,
        license: &str,
        options: Option<TrackerOptions>,
        callback: InitializationCallback,
    ) {
        self.stats.inc_init_calls();
        let options = options.unwrap_or_default();

        if license.is_empty() {
            callback(Err(InitializationErrorKind::AuthInvalidKeyFormat));
            return;
        }

        if self.config.defer_init {
            self.pending
                .lock()
                .push_back(DeferredInit { options, callback });
            return;
        }

        let outcome = self.create_tracker(options);
        if self.settings.init_delay_ms == 0 {
            callback(outcome);
            return;
        }

        let delay = Duration::from_millis(self.settings.init_delay_ms);
        thread::spawn(move || {
            thread::sleep(delay);
            callback(outcome);
        });
    }

    fn release(&self, tracker: Box<dyn GazeTracker>) {
        self.stats.inc_release_calls();
        drop(tracker);
        info!(live = self.stats.live_trackers(), "mock tracker released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    fn instant_settings() -> MockTrackerConfig {
        MockTrackerConfig {
            init_delay_ms: 0,
            ..Default::default()
        }
    }

    #[test]
    fn test_initialize_inline_success() {
        let sdk = MockTrackerSdk::new(instant_settings());
        let (tx, rx) = mpsc::channel();
        sdk.initialize("key", None, Box::new(move |outcome| {
            let _ = tx.send(outcome.is_ok());
        }));

        assert_eq!(rx.recv().ok(), Some(true));
        assert_eq!(sdk.stats().init_calls(), 1);
    }

    #[test]
    fn test_initialize_injected_failure() {
        let sdk = MockTrackerSdk::with_config(
            instant_settings(),
            MockConfig::failing_init(InitializationErrorKind::AuthExpiredKey),
        );
        let (tx, rx) = mpsc::channel();
        sdk.initialize("key", None, Box::new(move |outcome| {
            let _ = tx.send(outcome.err());
        }));

        assert_eq!(rx.recv().ok().flatten(), Some(InitializationErrorKind::AuthExpiredKey));
        assert_eq!(sdk.stats().live_trackers(), 0);
    }

    #[test]
    fn test_deferred_initialize_waits_for_completion() {
        let sdk = MockTrackerSdk::with_config(instant_settings(), MockConfig::deferred());
        let (tx, rx) = mpsc::channel();
        sdk.initialize("key", None, Box::new(move |outcome| {
            let _ = tx.send(outcome.is_ok());
        }));

        assert!(rx.try_recv().is_err());
        assert_eq!(sdk.pending_count(), 1);
        assert!(sdk.complete_pending());
        assert_eq!(rx.recv().ok(), Some(true));
        assert!(!sdk.complete_pending());
    }

    #[test]
    fn test_release_drops_tracker() {
        let sdk = MockTrackerSdk::new(instant_settings());
        let (tx, rx) = mpsc::channel();
        sdk.initialize("key", None, Box::new(move |outcome| {
            let _ = tx.send(outcome);
        }));
        let tracker = rx.recv().ok().and_then(Result::ok);
        assert_eq!(sdk.stats().live_trackers(), 1);

        if let Some(tracker) = tracker {
            sdk.release(tracker);
        }
        assert_eq!(sdk.stats().live_trackers(), 0);
        assert_eq!(sdk.stats().release_calls(), 1);
    }
}
