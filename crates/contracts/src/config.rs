//! BridgeConfig - Config Loader output
//!
//! Describes the target platform, display density, session policy, event
//! queue sizes, default tracker options and the simulated SDK.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{CameraPreset, TrackerOptions};

/// Host platform the bridge runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    #[default]
    Android,
    Ios,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Android => "android",
            Self::Ios => "ios",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "android" => Ok(Self::Android),
            "ios" => Ok(Self::Ios),
            other => Err(format!("unknown platform: {other}")),
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct BridgeConfig {
    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    #[validate(nested)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    #[validate(nested)]
    pub event_bus: EventBusConfig,

    #[serde(default)]
    #[validate(nested)]
    pub tracker: TrackerDefaults,

    #[serde(default)]
    #[validate(nested)]
    pub mock: MockTrackerConfig,
}

/// Display density
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DisplayConfig {
    /// Logical-to-device scale factor
    #[serde(default = "default_density")]
    #[validate(range(exclusive_min = 0.0, max = 16.0))]
    pub density: f64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            density: default_density(),
        }
    }
}

fn default_density() -> f64 {
    1.0
}

/// Session lifecycle policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Release the session when the tracker stops with a failure reason
    #[serde(default = "default_true")]
    pub release_on_fatal_status: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            release_on_fatal_status: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Per-category subscriber queue sizes
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct EventBusConfig {
    #[serde(default = "default_tracking_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub tracking_queue_capacity: usize,

    #[serde(default = "default_control_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub status_queue_capacity: usize,

    #[serde(default = "default_control_capacity")]
    #[validate(range(min = 1, max = 65536))]
    pub calibration_queue_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            tracking_queue_capacity: default_tracking_capacity(),
            status_queue_capacity: default_control_capacity(),
            calibration_queue_capacity: default_control_capacity(),
        }
    }
}

fn default_tracking_capacity() -> usize {
    64
}

fn default_control_capacity() -> usize {
    16
}

/// Default initialization options, merged under per-call options
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TrackerDefaults {
    #[serde(default)]
    pub use_blink: Option<bool>,

    #[serde(default)]
    pub use_user_status: Option<bool>,

    #[serde(default)]
    pub use_gaze_filter: Option<bool>,

    #[serde(default)]
    #[validate(range(min = 1, max = 64))]
    pub max_concurrency: Option<u32>,

    #[serde(default)]
    pub camera_preset: Option<CameraPreset>,
}

impl TrackerDefaults {
    pub fn to_options(&self) -> TrackerOptions {
        TrackerOptions {
            use_blink: self.use_blink,
            use_user_status: self.use_user_status,
            use_gaze_filter: self.use_gaze_filter,
            max_concurrency: self.max_concurrency,
            camera_preset: self.camera_preset,
        }
    }
}

/// Simulated SDK behaviour
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MockTrackerConfig {
    #[serde(default = "default_frame_rate")]
    #[validate(range(exclusive_min = 0.0, max = 240.0))]
    pub frame_rate_hz: f64,

    #[serde(default = "default_init_delay_ms")]
    pub init_delay_ms: u64,

    #[serde(default = "default_calibration_point_ms")]
    #[validate(range(min = 1))]
    pub calibration_point_ms: u64,

    /// Screen size in device pixels
    #[serde(default = "default_screen_width")]
    #[validate(range(exclusive_min = 0.0))]
    pub screen_width: f64,

    #[serde(default = "default_screen_height")]
    #[validate(range(exclusive_min = 0.0))]
    pub screen_height: f64,
}

impl Default for MockTrackerConfig {
    fn default() -> Self {
        Self {
            frame_rate_hz: default_frame_rate(),
            init_delay_ms: default_init_delay_ms(),
            calibration_point_ms: default_calibration_point_ms(),
            screen_width: default_screen_width(),
            screen_height: default_screen_height(),
        }
    }
}

fn default_frame_rate() -> f64 {
    30.0
}

fn default_init_delay_ms() -> u64 {
    50
}

fn default_calibration_point_ms() -> u64 {
    200
}

fn default_screen_width() -> f64 {
    1080.0
}

fn default_screen_height() -> f64 {
    2340.0
}
