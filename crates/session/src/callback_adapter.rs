//! CallbackAdapter - hardware callbacks into the event bus
//!
//! Runs on SDK producer threads. Takes no locks of its own; the only
//! synchronization is the per-channel lock inside `EventBus::publish`.

use std::sync::{Arc, Weak};

use contracts::{
    BlinkInfo, CalibrationEvent, DisplayScale, FaceInfo, GazeInfo, Generation,
    InitializationCallback, StatusErrorKind, StatusEvent, TrackerListener, TrackingEvent,
    UserStatusInfo,
};
use event_bus::EventBus;
use tracing::{trace, warn};

use crate::controller::Inner;

/// Listener registered with the tracker of one session generation
pub struct CallbackAdapter {
    generation: Generation,
    bus: Arc<EventBus>,
    scale: DisplayScale,
    controller: Weak<Inner>,
}

impl CallbackAdapter {
    pub(crate) fn new(
        generation: Generation,
        bus: Arc<EventBus>,
        scale: DisplayScale,
        controller: Weak<Inner>,
    ) -> Self {
        Self {
            generation,
            bus,
            scale,
            controller,
        }
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

/// SDK callback that routes the initialization result back to the controller
pub(crate) fn initialization_callback(
    controller: Weak<Inner>,
    generation: Generation,
) -> InitializationCallback {
    Box::new(move |result| match controller.upgrade() {
        Some(inner) => inner.on_initialization_complete(generation, result),
        None => warn!(
            generation = %generation,
            "Initialization completed after controller was dropped"
        ),
    })
}

impl TrackerListener for CallbackAdapter {
    fn on_metrics(
        &self,
        timestamp: i64,
        gaze: GazeInfo,
        face: FaceInfo,
        blink: BlinkInfo,
        user_status: UserStatusInfo,
    ) {
        let event = tracking_event(timestamp, &gaze, &face, &blink, &user_status, self.scale);
        if !self.bus.publish(self.generation, event) {
            trace!(generation = %self.generation, "Tracking event not delivered");
        }
    }

    fn on_started(&self) {
        self.bus.publish(self.generation, StatusEvent::Start);
    }

    fn on_stopped(&self, error: StatusErrorKind) {
        self.bus.publish(
            self.generation,
            StatusEvent::Stop {
                failed_reason: error.as_str().to_string(),
            },
        );

        if !error.is_failure() {
            return;
        }
        if let Some(controller) = self.controller.upgrade() {
            controller.report_fatal_status(self.generation, error);
        }
    }

    fn on_calibration_progress(&self, progress: f64) {
        self.bus
            .publish(self.generation, CalibrationEvent::Progress { progress });
    }

    fn on_calibration_next_point(&self, x: f64, y: f64) {
        self.bus.publish(
            self.generation,
            CalibrationEvent::NextPoint {
                x: self.scale.to_logical(x),
                y: self.scale.to_logical(y),
            },
        );
    }

    fn on_calibration_finished(&self, data: Vec<f64>) {
        self.bus
            .publish(self.generation, CalibrationEvent::Finished { data });
    }

    fn on_calibration_canceled(&self, data: Vec<f64>) {
        self.bus
            .publish(self.generation, CalibrationEvent::Canceled { data });
    }
}

/// Flatten one frame of hardware metrics into a `TrackingEvent`
///
/// Gaze and fixation move to logical units; face geometry stays in camera
/// pixels.
pub fn tracking_event(
    timestamp: i64,
    gaze: &GazeInfo,
    face: &FaceInfo,
    blink: &BlinkInfo,
    user_status: &UserStatusInfo,
    scale: DisplayScale,
) -> TrackingEvent {
    TrackingEvent {
        timestamp,
        gaze_x: scale.to_logical(gaze.x),
        gaze_y: scale.to_logical(gaze.y),
        fixation_x: scale.to_logical(gaze.fixation_x),
        fixation_y: scale.to_logical(gaze.fixation_y),
        tracking_state: gaze.tracking_state.as_str().to_string(),
        eye_movement_state: gaze.eye_movement_state.as_str().to_string(),
        screen_state: gaze.screen_state.as_str().to_string(),
        face_score: face.score,
        frame_width: face.frame_width,
        frame_height: face.frame_height,
        face_left: face.left,
        face_top: face.top,
        face_right: face.right,
        face_bottom: face.bottom,
        face_pitch: face.pitch,
        face_yaw: face.yaw,
        face_roll: face.roll,
        face_center_x: face.center_x,
        face_center_y: face.center_y,
        face_center_z: face.center_z,
        is_blink: blink.is_blink,
        is_blink_left: blink.is_blink_left,
        is_blink_right: blink.is_blink_right,
        left_openness: blink.left_openness,
        right_openness: blink.right_openness,
        is_drowsy: user_status.is_drowsy,
        drowsiness_intensity: user_status.drowsiness_intensity,
        attention_score: user_status.attention_score,
    }
}
