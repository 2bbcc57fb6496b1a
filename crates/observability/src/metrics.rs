//! Bridge metrics
//!
//! Thin helpers over the `metrics` facade plus an in-memory aggregator for
//! the tracking stream. Event delivery counters live in `event_bus`.

use std::collections::HashMap;

use contracts::{CalibrationEvent, StatusEvent, TrackingEvent};
use metrics::{counter, gauge};

/// Record an initialization request outcome
///
/// `outcome` is one of `accepted`, `already_attempting`,
/// `already_initialized`, `success`, `failure`, `stale`.
pub fn record_init_attempt(outcome: &'static str) {
    counter!("gaze_bridge_init_attempts_total", "outcome" => outcome).increment(1);
}

/// Record a session teardown and why it happened
pub fn record_session_released(cause: &'static str) {
    counter!("gaze_bridge_sessions_released_total", "cause" => cause).increment(1);
    record_session_active(false);
}

pub fn record_session_active(active: bool) {
    gauge!("gaze_bridge_session_active").set(if active { 1.0 } else { 0.0 });
}

/// Record a dispatched command
pub fn record_command(command: &'static str, status: &'static str) {
    counter!(
        "gaze_bridge_commands_total",
        "command" => command,
        "status" => status
    )
    .increment(1);
}

/// Aggregates the event streams in memory for run summaries
#[derive(Debug, Clone, Default)]
pub struct TrackingStatsAggregator {
    /// Tracking events seen
    pub total_frames: u64,

    /// Frames whose tracking state was `SUCCESS`
    pub gaze_found_frames: u64,

    /// Frames flagged as a blink
    pub blink_frames: u64,

    /// Frames flagged drowsy
    pub drowsy_frames: u64,

    /// Time between consecutive frames (ms)
    pub frame_interval_stats: RunningStats,

    /// Face detection score
    pub face_score_stats: RunningStats,

    /// Attention score
    pub attention_stats: RunningStats,

    /// Frames per eye-movement state
    pub eye_movement_counts: HashMap<String, u64>,

    /// Status events by type, plus stop reasons
    pub status_counts: HashMap<String, u64>,

    /// Calibration events by type
    pub calibration_counts: HashMap<String, u64>,

    last_timestamp: Option<i64>,
}

impl TrackingStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, event: &TrackingEvent) {
        self.total_frames += 1;
        if event.tracking_state == "SUCCESS" {
            self.gaze_found_frames += 1;
        }
        if event.is_blink {
            self.blink_frames += 1;
        }
        if event.is_drowsy {
            self.drowsy_frames += 1;
        }

        if let Some(previous) = self.last_timestamp {
            self.frame_interval_stats
                .push((event.timestamp - previous) as f64);
        }
        self.last_timestamp = Some(event.timestamp);

        self.face_score_stats.push(event.face_score);
        self.attention_stats.push(event.attention_score);
        *self
            .eye_movement_counts
            .entry(event.eye_movement_state.clone())
            .or_insert(0) += 1;
    }

    pub fn update_status(&mut self, event: &StatusEvent) {
        let key = match event {
            StatusEvent::Start => "start".to_string(),
            StatusEvent::Stop { failed_reason } => format!("stop:{failed_reason}"),
        };
        *self.status_counts.entry(key).or_insert(0) += 1;
    }

    pub fn update_calibration(&mut self, event: &CalibrationEvent) {
        let key = match event {
            CalibrationEvent::Progress { .. } => "progress",
            CalibrationEvent::NextPoint { .. } => "next_point",
            CalibrationEvent::Finished { .. } => "finished",
            CalibrationEvent::Canceled { .. } => "canceled",
        };
        *self.calibration_counts.entry(key.to_string()).or_insert(0) += 1;
    }

    pub fn summary(&self) -> TrackingSummary {
        TrackingSummary {
            total_frames: self.total_frames,
            gaze_found_rate: rate(self.gaze_found_frames, self.total_frames),
            blink_frames: self.blink_frames,
            drowsy_frames: self.drowsy_frames,
            frame_interval_ms: StatsSummary::from(&self.frame_interval_stats),
            face_score: StatsSummary::from(&self.face_score_stats),
            attention_score: StatsSummary::from(&self.attention_stats),
            eye_movement_counts: self.eye_movement_counts.clone(),
            status_counts: self.status_counts.clone(),
            calibration_counts: self.calibration_counts.clone(),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total > 0 {
        part as f64 / total as f64 * 100.0
    } else {
        0.0
    }
}

/// Run summary
#[derive(Debug, Clone, Default)]
pub struct TrackingSummary {
    pub total_frames: u64,
    pub gaze_found_rate: f64,
    pub blink_frames: u64,
    pub drowsy_frames: u64,
    pub frame_interval_ms: StatsSummary,
    pub face_score: StatsSummary,
    pub attention_score: StatsSummary,
    pub eye_movement_counts: HashMap<String, u64>,
    pub status_counts: HashMap<String, u64>,
    pub calibration_counts: HashMap<String, u64>,
}

impl std::fmt::Display for TrackingSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Tracking Summary ===")?;
        writeln!(f, "Total frames: {}", self.total_frames)?;
        writeln!(f, "Gaze found: {:.2}%", self.gaze_found_rate)?;
        writeln!(f, "Blink frames: {}", self.blink_frames)?;
        writeln!(f, "Drowsy frames: {}", self.drowsy_frames)?;
        writeln!(f, "Frame interval (ms): {}", self.frame_interval_ms)?;
        writeln!(f, "Face score: {}", self.face_score)?;
        writeln!(f, "Attention score: {}", self.attention_score)?;

        for (title, counts) in [
            ("Eye movement", &self.eye_movement_counts),
            ("Status events", &self.status_counts),
            ("Calibration events", &self.calibration_counts),
        ] {
            if counts.is_empty() {
                continue;
            }
            let mut entries: Vec<_> = counts.iter().collect();
            entries.sort();
            writeln!(f, "{title}:")?;
            for (key, count) in entries {
                writeln!(f, "  {key}: {count}")?;
            }
        }

        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 { 0.0 } else { self.mean }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(timestamp: i64, state: &str, blink: bool) -> TrackingEvent {
        TrackingEvent {
            timestamp,
            gaze_x: 0.0,
            gaze_y: 0.0,
            fixation_x: 0.0,
            fixation_y: 0.0,
            tracking_state: state.to_string(),
            eye_movement_state: "FIXATION".to_string(),
            screen_state: "INSIDE_OF_SCREEN".to_string(),
            face_score: 0.9,
            frame_width: 640,
            frame_height: 480,
            face_left: 0.0,
            face_top: 0.0,
            face_right: 0.0,
            face_bottom: 0.0,
            face_pitch: 0.0,
            face_yaw: 0.0,
            face_roll: 0.0,
            face_center_x: 0.0,
            face_center_y: 0.0,
            face_center_z: 0.0,
            is_blink: blink,
            is_blink_left: blink,
            is_blink_right: blink,
            left_openness: 1.0,
            right_openness: 1.0,
            is_drowsy: false,
            drowsiness_intensity: 0.0,
            attention_score: 1.0,
        }
    }

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = TrackingStatsAggregator::new();
        aggregator.update(&frame(1000, "SUCCESS", false));
        aggregator.update(&frame(1033, "GAZE_NOT_FOUND", true));
        aggregator.update_status(&StatusEvent::Stop {
            failed_reason: "ERROR_CAMERA_INTERRUPT".into(),
        });

        let summary = aggregator.summary();
        assert_eq!(summary.total_frames, 2);
        assert!((summary.gaze_found_rate - 50.0).abs() < 1e-10);
        assert_eq!(summary.blink_frames, 1);
        assert_eq!(summary.frame_interval_ms.count, 1);
        assert!((summary.frame_interval_ms.mean - 33.0).abs() < 1e-10);
        assert_eq!(
            summary.status_counts.get("stop:ERROR_CAMERA_INTERRUPT"),
            Some(&1)
        );
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = TrackingStatsAggregator::new();
        aggregator.update(&frame(0, "SUCCESS", false));
        aggregator.update_calibration(&CalibrationEvent::Finished { data: vec![] });

        let output = aggregator.summary().to_string();
        assert!(output.contains("Total frames: 1"));
        assert!(output.contains("100.00%"));
        assert!(output.contains("finished: 1"));
    }
}
