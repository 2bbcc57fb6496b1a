//! Hardware-side metric types
//!
//! Raw values as the tracker SDK reports them, in device pixels.
//! `CallbackAdapter` normalizes these into `TrackingEvent`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Gaze estimation result for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GazeInfo {
    pub x: f64,
    pub y: f64,
    pub fixation_x: f64,
    pub fixation_y: f64,
    pub tracking_state: TrackingState,
    pub eye_movement_state: EyeMovementState,
    pub screen_state: ScreenState,
}

/// Face detection result for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FaceInfo {
    pub score: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub pitch: f64,
    pub yaw: f64,
    pub roll: f64,
    pub center_x: f64,
    pub center_y: f64,
    pub center_z: f64,
}

/// Blink detection result; only populated when blink detection is enabled
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BlinkInfo {
    pub is_blink: bool,
    pub is_blink_left: bool,
    pub is_blink_right: bool,
    pub left_openness: f64,
    pub right_openness: f64,
}

/// User status result; only populated when user status is enabled
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct UserStatusInfo {
    pub is_drowsy: bool,
    pub drowsiness_intensity: f64,
    pub attention_score: f64,
}

/// Gaze tracking state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackingState {
    Success,
    GazeNotFound,
    FaceMissing,
}

impl TrackingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::GazeNotFound => "GAZE_NOT_FOUND",
            Self::FaceMissing => "FACE_MISSING",
        }
    }
}

/// Eye movement classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EyeMovementState {
    Fixation,
    Saccade,
    Unknown,
}

impl EyeMovementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fixation => "FIXATION",
            Self::Saccade => "SACCADE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Whether the gaze point falls on the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScreenState {
    InsideOfScreen,
    OutsideOfScreen,
    Unknown,
}

impl ScreenState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsideOfScreen => "INSIDE_OF_SCREEN",
            Self::OutsideOfScreen => "OUTSIDE_OF_SCREEN",
            Self::Unknown => "UNKNOWN",
        }
    }
}

/// Initialization error reported by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InitializationErrorKind {
    /// Initialization succeeded
    None,
    /// Generic SDK initialization failure
    Init,
    /// Camera permission was revoked before initialization finished
    CameraPermission,
    /// License key rejected
    AuthInvalidKey,
    AuthInvalidEnvUsedDevInProd,
    AuthInvalidEnvUsedProdInDev,
    AuthInvalidPackageName,
    AuthInvalidAppSignature,
    AuthExceededFreeTier,
    AuthDeactivatedKey,
    AuthInvalidAccess,
    AuthUnknownError,
    AuthServerError,
    AuthCannotFindHost,
    AuthWrongLocalTime,
    AuthInvalidKeyFormat,
    AuthExpiredKey,
    /// Device or OS not supported by the SDK
    NotSupported,
}

impl InitializationErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "ERROR_NONE",
            Self::Init => "ERROR_INIT",
            Self::CameraPermission => "ERROR_CAMERA_PERMISSION",
            Self::AuthInvalidKey => "AUTH_INVALID_KEY",
            Self::AuthInvalidEnvUsedDevInProd => "AUTH_INVALID_ENV_USED_DEV_IN_PROD",
            Self::AuthInvalidEnvUsedProdInDev => "AUTH_INVALID_ENV_USED_PROD_IN_DEV",
            Self::AuthInvalidPackageName => "AUTH_INVALID_PACKAGE_NAME",
            Self::AuthInvalidAppSignature => "AUTH_INVALID_APP_SIGNATURE",
            Self::AuthExceededFreeTier => "AUTH_EXCEEDED_FREE_TIER",
            Self::AuthDeactivatedKey => "AUTH_DEACTIVATED_KEY",
            Self::AuthInvalidAccess => "AUTH_INVALID_ACCESS",
            Self::AuthUnknownError => "AUTH_UNKNOWN_ERROR",
            Self::AuthServerError => "AUTH_SERVER_ERROR",
            Self::AuthCannotFindHost => "AUTH_CANNOT_FIND_HOST",
            Self::AuthWrongLocalTime => "AUTH_WRONG_LOCAL_TIME",
            Self::AuthInvalidKeyFormat => "AUTH_INVALID_KEY_FORMAT",
            Self::AuthExpiredKey => "AUTH_EXPIRED_KEY",
            Self::NotSupported => "ERROR_NOT_SUPPORTED",
        }
    }
}

impl fmt::Display for InitializationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reason reported when tracking stops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusErrorKind {
    /// Stopped on request
    None,
    /// Camera could not be opened
    CameraStart,
    /// Camera was taken away while tracking
    CameraInterrupt,
}

impl StatusErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "ERROR_NONE",
            Self::CameraStart => "ERROR_CAMERA_START",
            Self::CameraInterrupt => "ERROR_CAMERA_INTERRUPT",
        }
    }

    /// Whether the stop was caused by a hardware failure rather than a request
    pub fn is_failure(&self) -> bool {
        !matches!(self, Self::None)
    }
}

impl fmt::Display for StatusErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
