//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use contracts::{CameraPreset, Platform};
use std::path::PathBuf;

/// Gaze Bridge - session lifecycle and event bridge for gaze trackers
#[derive(Parser, Debug)]
#[command(
    name = "gaze-bridge",
    author,
    version,
    about = "Gaze tracker session bridge",
    long_about = "Drives a single gaze tracking session through the command surface.\n\n\
                  Initializes the (simulated) tracker SDK, subscribes to the tracking, \n\
                  status and calibration streams, and prints a run summary."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "GAZE_BRIDGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "GAZE_BRIDGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a tracking session against the simulated SDK
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when absent
    #[arg(short, long, env = "GAZE_BRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// License key passed to the tracker SDK
    #[arg(long, default_value = "dev-license", env = "GAZE_BRIDGE_LICENSE")]
    pub license: String,

    /// Override the host platform from configuration
    #[arg(long, env = "GAZE_BRIDGE_PLATFORM")]
    pub platform: Option<Platform>,

    /// Override the display density from configuration
    #[arg(long, env = "GAZE_BRIDGE_DENSITY")]
    pub density: Option<f64>,

    /// Override the camera preset (vga640x480, hd1280x720, fhd1920x1080)
    #[arg(long)]
    pub camera_preset: Option<CameraPreset>,

    /// Enable blink detection
    #[arg(long)]
    pub use_blink: bool,

    /// Enable user status (attention / drowsiness) detection
    #[arg(long)]
    pub use_user_status: bool,

    /// Tracking duration in seconds (0 = until Ctrl+C)
    #[arg(long, default_value = "5", env = "GAZE_BRIDGE_DURATION")]
    pub duration: u64,

    /// Run a calibration after tracking starts
    #[arg(long)]
    pub calibrate: bool,

    /// Calibration points (1 = one-point, anything else = five-point)
    #[arg(long, default_value = "5")]
    pub calibration_points: i64,

    /// Tracking FPS to request after start (0 = SDK default)
    #[arg(long, default_value = "0")]
    pub tracking_fps: i32,

    /// Log every bus event as it is delivered
    #[arg(long)]
    pub log_events: bool,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "GAZE_BRIDGE_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "gaze-bridge.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "gaze-bridge.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the simulated SDK settings
    #[arg(long)]
    pub mock: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_args_parse() {
        let cli = Cli::try_parse_from([
            "gaze-bridge",
            "run",
            "--platform",
            "ios",
            "--camera-preset",
            "hd1280x720",
            "--calibrate",
            "--log-events",
            "--duration",
            "2",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.platform, Some(Platform::Ios));
        assert_eq!(args.camera_preset, Some(CameraPreset::Hd1280x720));
        assert!(args.calibrate);
        assert!(args.log_events);
        assert_eq!(args.duration, 2);
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["gaze-bridge", "-q", "-v", "info"]).is_err());
    }
}
