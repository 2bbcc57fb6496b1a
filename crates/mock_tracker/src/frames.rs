//! Synthetic per-frame metrics

use std::f64::consts::PI;

use contracts::{
    BlinkInfo, EyeMovementState, FaceInfo, GazeInfo, ScreenState, TrackingState, UserStatusInfo,
};
use rand::Rng;

/// Gaze lost once every this many frames
const GAZE_LOST_PERIOD: u64 = 60;
/// Blink once every this many frames
const BLINK_PERIOD: u64 = 90;

/// Walks the gaze point along a Lissajous curve over the screen
pub(crate) struct FrameGenerator {
    screen_width: f64,
    screen_height: f64,
    frame_width: u32,
    frame_height: u32,
    use_blink: bool,
    use_user_status: bool,
    frame: u64,
    fixation: (f64, f64),
}

impl FrameGenerator {
    pub(crate) fn new(
        screen_width: f64,
        screen_height: f64,
        frame_size: (u32, u32),
        use_blink: bool,
        use_user_status: bool,
    ) -> Self {
        Self {
            screen_width,
            screen_height,
            frame_width: frame_size.0,
            frame_height: frame_size.1,
            use_blink,
            use_user_status,
            frame: 0,
            fixation: (screen_width / 2.0, screen_height / 2.0),
        }
    }

    pub(crate) fn next_frame(&mut self) -> (GazeInfo, FaceInfo, BlinkInfo, UserStatusInfo) {
        self.frame += 1;
        let mut rng = rand::rng();
        let t = self.frame as f64 * 0.05;

        let x = self.screen_width * (0.5 + 0.45 * t.sin()) + rng.random_range(-4.0..4.0);
        let y = self.screen_height * (0.5 + 0.45 * (2.0 * t + PI / 4.0).sin())
            + rng.random_range(-4.0..4.0);

        // Saccade for one quarter of each 60-frame cycle
        let eye_movement_state = if (self.frame / 15) % 4 == 3 {
            EyeMovementState::Saccade
        } else {
            self.fixation = (x, y);
            EyeMovementState::Fixation
        };

        let tracking_state = if self.frame % GAZE_LOST_PERIOD == 0 {
            TrackingState::GazeNotFound
        } else {
            TrackingState::Success
        };

        let inside =
            (0.0..=self.screen_width).contains(&x) && (0.0..=self.screen_height).contains(&y);
        let screen_state = match tracking_state {
            TrackingState::Success if inside => ScreenState::InsideOfScreen,
            TrackingState::Success => ScreenState::OutsideOfScreen,
            _ => ScreenState::Unknown,
        };

        let gaze = GazeInfo {
            x,
            y,
            fixation_x: self.fixation.0,
            fixation_y: self.fixation.1,
            tracking_state,
            eye_movement_state,
            screen_state,
        };

        let fw = self.frame_width as f64;
        let fh = self.frame_height as f64;
        let face = FaceInfo {
            score: rng.random_range(0.85..0.99),
            frame_width: self.frame_width,
            frame_height: self.frame_height,
            left: fw * 0.3,
            top: fh * 0.2,
            right: fw * 0.7,
            bottom: fh * 0.8,
            pitch: rng.random_range(-5.0..5.0),
            yaw: 10.0 * t.sin(),
            roll: rng.random_range(-2.0..2.0),
            center_x: 0.0,
            center_y: 0.0,
            center_z: 350.0 + rng.random_range(-10.0..10.0),
        };

        let blink = if self.use_blink {
            let is_blink = self.frame % BLINK_PERIOD < 3;
            let openness = if is_blink { 0.05 } else { 0.9 };
            BlinkInfo {
                is_blink,
                is_blink_left: is_blink,
                is_blink_right: is_blink,
                left_openness: openness,
                right_openness: openness,
            }
        } else {
            BlinkInfo::default()
        };

        let user_status = if self.use_user_status {
            let drowsiness = (self.frame as f64 / 3000.0).min(1.0);
            UserStatusInfo {
                is_drowsy: drowsiness > 0.6,
                drowsiness_intensity: drowsiness,
                attention_score: 1.0 - drowsiness * 0.5,
            }
        } else {
            UserStatusInfo::default()
        };

        (gaze, face, blink, user_status)
    }
}
