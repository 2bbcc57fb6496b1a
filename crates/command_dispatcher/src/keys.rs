//! Wire keys for command arguments and replies

// ===== Initialization =====
pub const LICENSE: &str = "license";
pub const USE_BLINK: &str = "useBlink";
pub const USE_USER_STATUS: &str = "useUserStatus";
pub const USE_GAZE_FILTER: &str = "useGazeFilter";
pub const MAX_CONCURRENCY: &str = "maxConcurrency";
pub const CAMERA_PRESET: &str = "cameraPreset";

// ===== Camera position =====
pub const MODEL_NAME: &str = "modelName";
pub const SCREEN_WIDTH: &str = "screenWidth";
pub const SCREEN_HEIGHT: &str = "screenHeight";
pub const SCREEN_ORIGIN_X: &str = "screenOriginX";
pub const SCREEN_ORIGIN_Y: &str = "screenOriginY";
pub const CAMERA_ON_LONGER_AXIS: &str = "cameraOnLongerAxis";
pub const CAMERA_POSITION_INDEX: &str = "cameraPositionListIndex";

// ===== Tracking / calibration =====
pub const TRACKING_FPS: &str = "trackingFPS";
pub const CALIBRATION_MODE: &str = "calibrationMode";
pub const CALIBRATION_CRITERIA: &str = "calibrationCriteria";
pub const CALIBRATION_REGION_LEFT: &str = "calibrationRegionLeft";
pub const CALIBRATION_REGION_TOP: &str = "calibrationRegionTop";
pub const CALIBRATION_REGION_RIGHT: &str = "calibrationRegionRight";
pub const CALIBRATION_REGION_BOTTOM: &str = "calibrationRegionBottom";
pub const USE_PREVIOUS_CALIBRATION: &str = "usePreviousCalibration";
pub const CALIBRATION_DATA: &str = "calibrationData";

// ===== Attention region =====
pub const ATTENTION_REGION_LEFT: &str = "attentionRegionLeft";
pub const ATTENTION_REGION_TOP: &str = "attentionRegionTop";
pub const ATTENTION_REGION_RIGHT: &str = "attentionRegionRight";
pub const ATTENTION_REGION_BOTTOM: &str = "attentionRegionBottom";

pub const ORIENTATION: &str = "orientation";

// ===== Replies =====
pub const INITIALIZED_RESULT: &str = "initializedResultKey";
pub const INITIALIZED_MESSAGE: &str = "initializedMessageKey";
pub const RELEASED: &str = "released";
pub const VERSION: &str = "eyeTrackerVersion";

// ===== Reply messages =====
pub const ALREADY_ATTEMPTING: &str = "Already attempting";
pub const ALREADY_INITIALIZED: &str = "Gaze tracker is already initialized.";
pub const CAMERA_POSITION_NULL: &str = "Camera Position Null";
pub const ANDROID_NOT_SUPPORTED: &str = "Android platform not supported.";
pub const IOS_NOT_SUPPORTED: &str = "iOS platform not supported";
