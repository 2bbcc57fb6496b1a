//! Camera position registry entries and display orientation

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Where the front camera sits relative to the screen of a device model
///
/// Only meaningful on Android, where the SDK keeps a registry of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraPosition {
    pub model_name: String,
    pub screen_width: f64,
    pub screen_height: f64,
    pub screen_origin_x: f64,
    pub screen_origin_y: f64,
    #[serde(default)]
    pub camera_on_longer_axis: bool,
}

/// Interface orientation the tracker should assume (iOS only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ForcedOrientation {
    #[default]
    Portrait,
    PortraitUpsideDown,
    LandscapeLeft,
    LandscapeRight,
}

impl ForcedOrientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::PortraitUpsideDown => "portraitUpsideDown",
            Self::LandscapeLeft => "landscapeLeft",
            Self::LandscapeRight => "landscapeRight",
        }
    }
}

impl FromStr for ForcedOrientation {
    type Err = std::convert::Infallible;

    /// Unknown values fall back to portrait
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "portraitUpsideDown" => Self::PortraitUpsideDown,
            "landscapeLeft" => Self::LandscapeLeft,
            "landscapeRight" => Self::LandscapeRight,
            _ => Self::Portrait,
        })
    }
}
