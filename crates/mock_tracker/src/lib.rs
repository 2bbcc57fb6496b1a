//! # Mock Tracker
//!
//! Simulated gaze tracker SDK implementing the `contracts` SDK traits.
//!
//! Used for testing and development without camera hardware:
//! - Producer threads emit metrics at the configured frame rate
//! - Calibration runs walk through targets and wait for sample collection
//! - Failures can be injected through `MockConfig`
//! - Initialization can be deferred and completed by the test

mod config;
mod frames;
mod sdk;
mod stats;
mod tracker;

pub use config::MockConfig;
pub use sdk::MockTrackerSdk;
pub use stats::{MockStats, MockStatsSnapshot};
pub use tracker::MockGazeTracker;
