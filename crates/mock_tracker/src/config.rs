//! Mock SDK failure injection

use contracts::{CameraPosition, InitializationErrorKind};

/// Injectable behaviour of the simulated SDK
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Initialization fails with this error
    pub fail_init: Option<InitializationErrorKind>,
    /// Hold initialization callbacks until `MockTrackerSdk::complete_pending`
    pub defer_init: bool,
    /// Tracking stops with `CameraStart` instead of starting
    pub fail_camera_start: bool,
    /// Tracking stops with `CameraInterrupt` after this many frames
    pub interrupt_after_frames: Option<u64>,
    /// Highest tracking rate `set_tracking_fps` accepts
    pub max_tracking_fps: i32,
    /// Camera position registry contents at initialization
    pub camera_positions: Vec<CameraPosition>,
    pub version_name: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_init: None,
            defer_init: false,
            fail_camera_start: false,
            interrupt_after_frames: None,
            max_tracking_fps: 30,
            camera_positions: Vec::new(),
            version_name: format!("mock-{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl MockConfig {
    pub fn failing_init(kind: InitializationErrorKind) -> Self {
        Self {
            fail_init: Some(kind),
            ..Default::default()
        }
    }

    pub fn deferred() -> Self {
        Self {
            defer_init: true,
            ..Default::default()
        }
    }
}
