//! Tracker initialization options

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Camera capture resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraPreset {
    #[default]
    #[serde(rename = "vga640x480")]
    Vga640x480,
    #[serde(rename = "hd1280x720")]
    Hd1280x720,
    #[serde(rename = "fhd1920x1080")]
    Fhd1920x1080,
}

impl CameraPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vga640x480 => "vga640x480",
            Self::Hd1280x720 => "hd1280x720",
            Self::Fhd1920x1080 => "fhd1920x1080",
        }
    }

    /// Frame dimensions in pixels
    pub fn frame_size(&self) -> (u32, u32) {
        match self {
            Self::Vga640x480 => (640, 480),
            Self::Hd1280x720 => (1280, 720),
            Self::Fhd1920x1080 => (1920, 1080),
        }
    }
}

impl fmt::Display for CameraPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CameraPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vga640x480" => Ok(Self::Vga640x480),
            "hd1280x720" => Ok(Self::Hd1280x720),
            "fhd1920x1080" => Ok(Self::Fhd1920x1080),
            other => Err(format!("unknown camera preset: {other}")),
        }
    }
}

/// Options passed to the SDK at initialization
///
/// Every field is optional; unset fields keep the SDK default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TrackerOptions {
    #[serde(default)]
    pub use_blink: Option<bool>,
    #[serde(default)]
    pub use_user_status: Option<bool>,
    #[serde(default)]
    pub use_gaze_filter: Option<bool>,
    #[serde(default)]
    pub max_concurrency: Option<u32>,
    #[serde(default)]
    pub camera_preset: Option<CameraPreset>,
}

impl TrackerOptions {
    /// True when no option was supplied
    pub fn is_empty(&self) -> bool {
        self.use_blink.is_none()
            && self.use_user_status.is_none()
            && self.use_gaze_filter.is_none()
            && self.max_concurrency.is_none()
            && self.camera_preset.is_none()
    }

    /// `None` when nothing was supplied, so the SDK applies its defaults
    pub fn into_non_empty(self) -> Option<Self> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    /// Fill unset fields from `defaults`
    pub fn or(self, defaults: &TrackerOptions) -> Self {
        Self {
            use_blink: self.use_blink.or(defaults.use_blink),
            use_user_status: self.use_user_status.or(defaults.use_user_status),
            use_gaze_filter: self.use_gaze_filter.or(defaults.use_gaze_filter),
            max_concurrency: self.max_concurrency.or(defaults.max_concurrency),
            camera_preset: self.camera_preset.or(defaults.camera_preset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_preset_parse_is_case_insensitive() {
        assert_eq!("HD1280x720".parse::<CameraPreset>(), Ok(CameraPreset::Hd1280x720));
        assert!("4k".parse::<CameraPreset>().is_err());
    }

    #[test]
    fn test_empty_options_become_none() {
        assert!(TrackerOptions::default().into_non_empty().is_none());
        let opts = TrackerOptions {
            use_blink: Some(true),
            ..Default::default()
        };
        assert!(opts.into_non_empty().is_some());
    }

    #[test]
    fn test_or_keeps_explicit_values() {
        let defaults = TrackerOptions {
            use_blink: Some(true),
            max_concurrency: Some(4),
            ..Default::default()
        };
        let explicit = TrackerOptions {
            use_blink: Some(false),
            ..Default::default()
        };
        let merged = explicit.or(&defaults);
        assert_eq!(merged.use_blink, Some(false));
        assert_eq!(merged.max_concurrency, Some(4));
    }
}
