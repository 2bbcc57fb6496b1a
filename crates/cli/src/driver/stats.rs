//! Run statistics.

use std::time::Duration;

use observability::TrackingStatsAggregator;

/// Statistics from one session run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Tracker SDK version reported at startup
    pub version: String,

    /// Commands sent through the dispatcher
    pub commands_sent: u64,

    /// Coefficients received when calibration finished
    pub calibration_coefficients: Option<usize>,

    /// Stop reason when the tracker stopped on its own
    pub stopped_reason: Option<String>,

    /// Total duration of the run
    pub duration: Duration,

    /// Stream aggregates
    pub events: TrackingStatsAggregator,
}

impl RunStats {
    /// Tracking frames per second
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.events.total_frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Session Statistics ===\n");
        println!("SDK version: {}", self.version);
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Commands sent: {}", self.commands_sent);
        println!("Tracking FPS: {:.2}", self.fps());
        match self.calibration_coefficients {
            Some(count) => println!("Calibration: finished ({count} coefficients)"),
            None => println!("Calibration: not completed"),
        }
        if let Some(ref reason) = self.stopped_reason {
            println!("Tracker stopped: {reason}");
        }
        println!();
        print!("{}", self.events.summary());
        println!();
    }
}
