//! Call counters for assertions in tests

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts calls that reached the simulated hardware
#[derive(Debug, Default)]
pub struct MockStats {
    init_calls: AtomicU64,
    release_calls: AtomicU64,
    start_tracking_calls: AtomicU64,
    stop_tracking_calls: AtomicU64,
    calibration_calls: AtomicU64,
    frames_emitted: AtomicU64,
    live_trackers: AtomicU64,
}

impl MockStats {
    pub fn init_calls(&self) -> u64 {
        self.init_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_init_calls(&self) {
        self.init_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn release_calls(&self) -> u64 {
        self.release_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_release_calls(&self) {
        self.release_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn start_tracking_calls(&self) -> u64 {
        self.start_tracking_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_start_tracking_calls(&self) {
        self.start_tracking_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn stop_tracking_calls(&self) -> u64 {
        self.stop_tracking_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_stop_tracking_calls(&self) {
        self.stop_tracking_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn calibration_calls(&self) -> u64 {
        self.calibration_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn inc_calibration_calls(&self) {
        self.calibration_calls.fetch_add(1, Ordering::SeqCst);
    }

    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_frames_emitted(&self) {
        self.frames_emitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Trackers handed out and not yet dropped
    pub fn live_trackers(&self) -> u64 {
        self.live_trackers.load(Ordering::SeqCst)
    }

    pub(crate) fn tracker_created(&self) {
        self.live_trackers.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn tracker_dropped(&self) {
        self.live_trackers.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> MockStatsSnapshot {
        MockStatsSnapshot {
            init_calls: self.init_calls(),
            release_calls: self.release_calls(),
            start_tracking_calls: self.start_tracking_calls(),
            stop_tracking_calls: self.stop_tracking_calls(),
            calibration_calls: self.calibration_calls(),
            frames_emitted: self.frames_emitted(),
            live_trackers: self.live_trackers(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MockStatsSnapshot {
    pub init_calls: u64,
    pub release_calls: u64,
    pub start_tracking_calls: u64,
    pub stop_tracking_calls: u64,
    pub calibration_calls: u64,
    pub frames_emitted: u64,
    pub live_trackers: u64,
}
