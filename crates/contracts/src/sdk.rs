//! Gaze tracker SDK abstraction
//!
//! Decouples the session bridge from a concrete vendor SDK. The real SDK and
//! the simulated one in `mock_tracker` both implement these traits.
//!
//! Threading contract:
//! - `TrackerSdk::initialize` returns immediately; the callback runs exactly
//!   once, on any thread, possibly before `initialize` returns.
//! - `TrackerListener` methods run on SDK producer threads at frame rate and
//!   must not block.
//! - An SDK must not hold its own locks while calling into a listener.

use std::sync::Arc;

use crate::{
    BlinkInfo, CalibrationRun, CameraPosition, FaceInfo, ForcedOrientation, GazeInfo,
    InitializationErrorKind, Rect, StatusErrorKind, TrackerOptions, UserStatusInfo,
};

/// Initialization outcome delivered by the SDK
pub type InitializationResult = Result<Box<dyn GazeTracker>, InitializationErrorKind>;

/// One-shot initialization callback
pub type InitializationCallback = Box<dyn FnOnce(InitializationResult) + Send>;

/// Entry point of a tracker SDK
pub trait TrackerSdk: Send + Sync {
    /// SDK version string
    fn version_name(&self) -> String;

    /// Request a tracker
    ///
    /// `options == None` means "use SDK defaults".
    fn initialize(
        &self,
        license: &str,
        options: Option<TrackerOptions>,
        callback: InitializationCallback,
    );

    /// Give a tracker back to the SDK; it stops producing callbacks
    fn release(&self, tracker: Box<dyn GazeTracker>);
}

/// Hardware callbacks produced by an active tracker
pub trait TrackerListener: Send + Sync {
    /// Per-frame metrics. Coordinates are device pixels.
    fn on_metrics(
        &self,
        timestamp: i64,
        gaze: GazeInfo,
        face: FaceInfo,
        blink: BlinkInfo,
        user_status: UserStatusInfo,
    );

    fn on_started(&self);

    fn on_stopped(&self, error: StatusErrorKind);

    fn on_calibration_progress(&self, progress: f64);

    /// Next calibration target in device pixels
    fn on_calibration_next_point(&self, x: f64, y: f64);

    fn on_calibration_finished(&self, data: Vec<f64>);

    fn on_calibration_canceled(&self, data: Vec<f64>);
}

/// An initialized tracker handle
///
/// All geometry crossing this trait is in device pixels.
pub trait GazeTracker: Send {
    fn set_listener(&mut self, listener: Arc<dyn TrackerListener>);

    fn remove_listener(&mut self);

    // ===== Tracking =====

    fn start_tracking(&mut self);

    fn stop_tracking(&mut self);

    fn is_tracking(&self) -> bool;

    /// Returns whether the rate was applied
    fn set_tracking_fps(&mut self, fps: i32) -> bool;

    // ===== Calibration =====

    /// Returns whether the run started
    fn start_calibration(&mut self, run: &CalibrationRun) -> bool;

    fn stop_calibration(&mut self);

    fn is_calibrating(&self) -> bool;

    fn start_collect_samples(&mut self) -> bool;

    fn set_calibration_data(&mut self, data: &[f64]) -> bool;

    // ===== Attention region =====

    fn set_attention_region(&mut self, region: Rect);

    fn attention_region(&self) -> Option<Rect>;

    fn remove_attention_region(&mut self);

    // ===== Camera positions (Android) =====

    fn add_camera_position(&mut self, position: CameraPosition);

    fn camera_position(&self) -> Option<CameraPosition>;

    fn camera_position_list(&self) -> Vec<CameraPosition>;

    fn select_camera_position(&mut self, index: usize);

    fn has_camera_positions(&self) -> bool;

    // ===== Orientation (iOS) =====

    fn set_forced_orientation(&mut self, orientation: ForcedOrientation) -> bool;

    fn reset_forced_orientation(&mut self) -> bool;
}
