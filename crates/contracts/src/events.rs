//! Event records delivered on the three event channels
//!
//! One immutable record per hardware occurrence. Field names serialize to
//! the camelCase keys client code reads from the streams.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Event channel category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Tracking,
    Status,
    Calibration,
}

impl EventCategory {
    pub const ALL: [EventCategory; 3] = [Self::Tracking, Self::Status, Self::Calibration];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tracking => "tracking",
            Self::Status => "status",
            Self::Calibration => "calibration",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ties an event record to the channel it travels on
pub trait CategorizedEvent: Send + 'static {
    const CATEGORY: EventCategory;
}

/// Per-frame tracking metrics
///
/// Gaze and fixation coordinates are in logical (device-independent) units;
/// face geometry stays in camera-frame pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingEvent {
    pub timestamp: i64,

    pub gaze_x: f64,
    pub gaze_y: f64,
    pub fixation_x: f64,
    pub fixation_y: f64,
    pub tracking_state: String,
    pub eye_movement_state: String,
    pub screen_state: String,

    pub face_score: f64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub face_left: f64,
    pub face_top: f64,
    pub face_right: f64,
    pub face_bottom: f64,
    pub face_pitch: f64,
    pub face_yaw: f64,
    pub face_roll: f64,
    pub face_center_x: f64,
    pub face_center_y: f64,
    pub face_center_z: f64,

    pub is_blink: bool,
    pub is_blink_left: bool,
    pub is_blink_right: bool,
    pub left_openness: f64,
    pub right_openness: f64,

    pub is_drowsy: bool,
    pub drowsiness_intensity: f64,
    pub attention_score: f64,
}

impl CategorizedEvent for TrackingEvent {
    const CATEGORY: EventCategory = EventCategory::Tracking;
}

/// Tracking start/stop notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "statusEventType", rename_all = "camelCase")]
pub enum StatusEvent {
    Start,
    Stop {
        #[serde(rename = "statusFailedReason")]
        failed_reason: String,
    },
}

impl CategorizedEvent for StatusEvent {
    const CATEGORY: EventCategory = EventCategory::Status;
}

/// Calibration progress notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "calibrationType")]
pub enum CalibrationEvent {
    #[serde(rename = "onCalibrationProgress")]
    Progress {
        #[serde(rename = "calibrationProgress")]
        progress: f64,
    },
    #[serde(rename = "onCalibrationNextXY")]
    NextPoint {
        #[serde(rename = "calibrationNextX")]
        x: f64,
        #[serde(rename = "calibrationNextY")]
        y: f64,
    },
    #[serde(rename = "onCalibrationFinished")]
    Finished {
        #[serde(rename = "calibrationData")]
        data: Vec<f64>,
    },
    #[serde(rename = "onCalibrationCanceled")]
    Canceled {
        #[serde(rename = "calibrationData")]
        data: Vec<f64>,
    },
}

impl CalibrationEvent {
    /// Finished and canceled end a calibration run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Canceled { .. })
    }
}

impl CategorizedEvent for CalibrationEvent {
    const CATEGORY: EventCategory = EventCategory::Calibration;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_event_wire_keys() {
        let json = serde_json::to_value(StatusEvent::Stop {
            failed_reason: "ERROR_CAMERA_INTERRUPT".into(),
        })
        .unwrap();
        assert_eq!(json["statusEventType"], "stop");
        assert_eq!(json["statusFailedReason"], "ERROR_CAMERA_INTERRUPT");

        let json = serde_json::to_value(StatusEvent::Start).unwrap();
        assert_eq!(json["statusEventType"], "start");
    }

    #[test]
    fn test_calibration_event_wire_keys() {
        let json = serde_json::to_value(CalibrationEvent::NextPoint { x: 10.0, y: 20.0 }).unwrap();
        assert_eq!(json["calibrationType"], "onCalibrationNextXY");
        assert_eq!(json["calibrationNextX"], 10.0);

        let json = serde_json::to_value(CalibrationEvent::Canceled { data: vec![1.0] }).unwrap();
        assert_eq!(json["calibrationType"], "onCalibrationCanceled");
        assert_eq!(json["calibrationData"][0], 1.0);
    }

    #[test]
    fn test_terminal_calibration_events() {
        assert!(CalibrationEvent::Finished { data: vec![] }.is_terminal());
        assert!(!CalibrationEvent::Progress { progress: 0.5 }.is_terminal());
    }
}
