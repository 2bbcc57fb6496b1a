//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{BridgeConfig, MockTrackerConfig};

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    platform: String,
    density: f64,
    release_on_fatal_status: bool,
    queues: QueueInfo,
    tracker_defaults: TrackerInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    mock: Option<MockTrackerConfig>,
}

#[derive(Serialize)]
struct QueueInfo {
    tracking: usize,
    status: usize,
    calibration: usize,
}

#[derive(Serialize)]
struct TrackerInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    use_blink: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_user_status: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    use_gaze_filter: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_concurrency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    camera_preset: Option<String>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&config, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&config, args);
    }

    Ok(())
}

fn build_config_info(config: &BridgeConfig, args: &InfoArgs) -> ConfigInfo {
    let tracker = &config.tracker;
    ConfigInfo {
        platform: config.platform.to_string(),
        density: config.display.density,
        release_on_fatal_status: config.session.release_on_fatal_status,
        queues: QueueInfo {
            tracking: config.event_bus.tracking_queue_capacity,
            status: config.event_bus.status_queue_capacity,
            calibration: config.event_bus.calibration_queue_capacity,
        },
        tracker_defaults: TrackerInfo {
            use_blink: tracker.use_blink,
            use_user_status: tracker.use_user_status,
            use_gaze_filter: tracker.use_gaze_filter,
            max_concurrency: tracker.max_concurrency,
            camera_preset: tracker.camera_preset.map(|p| p.to_string()),
        },
        mock: args.mock.then(|| config.mock.clone()),
    }
}

fn print_config_info(config: &BridgeConfig, args: &InfoArgs) {
    println!("=== Gaze Bridge Configuration ===\n");

    println!("Platform");
    println!("   ├─ Name: {}", config.platform);
    println!("   ├─ Display density: {}", config.display.density);
    println!(
        "   └─ Release on fatal status: {}",
        config.session.release_on_fatal_status
    );

    println!("\nEvent queues");
    println!("   ├─ tracking: {}", config.event_bus.tracking_queue_capacity);
    println!("   ├─ status: {}", config.event_bus.status_queue_capacity);
    println!(
        "   └─ calibration: {}",
        config.event_bus.calibration_queue_capacity
    );

    let options = config.tracker.to_options();
    println!("\nTracker defaults");
    if options.is_empty() {
        println!("   └─ (SDK defaults)");
    } else {
        let fmt_flag = |flag: Option<bool>| flag.map_or("-".to_string(), |b| b.to_string());
        println!("   ├─ useBlink: {}", fmt_flag(options.use_blink));
        println!("   ├─ useUserStatus: {}", fmt_flag(options.use_user_status));
        println!("   ├─ useGazeFilter: {}", fmt_flag(options.use_gaze_filter));
        println!(
            "   ├─ maxConcurrency: {}",
            options
                .max_concurrency
                .map_or("-".to_string(), |n| n.to_string())
        );
        println!(
            "   └─ cameraPreset: {}",
            options
                .camera_preset
                .map_or("-".to_string(), |p| p.to_string())
        );
    }

    if args.mock {
        let mock = &config.mock;
        println!("\nSimulated SDK");
        println!("   ├─ Frame rate: {} Hz", mock.frame_rate_hz);
        println!("   ├─ Init delay: {} ms", mock.init_delay_ms);
        println!("   ├─ Calibration point: {} ms", mock.calibration_point_ms);
        println!(
            "   └─ Screen: {}x{} px",
            mock.screen_width, mock.screen_height
        );
    }

    println!();
}
