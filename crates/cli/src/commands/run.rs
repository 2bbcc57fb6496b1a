//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::{BridgeConfig, TrackerOptions};

use crate::cli::RunArgs;
use crate::driver::{Driver, DriverConfig};
use crate::error::CliError;

/// Execute the `run` command
pub async fn run_session(args: &RunArgs) -> Result<()> {
    let mut config = load_config(args)?;

    // Apply CLI overrides
    if let Some(platform) = args.platform {
        info!(platform = %platform, "Overriding platform from CLI");
        config.platform = platform;
    }
    if let Some(density) = args.density {
        info!(density, "Overriding display density from CLI");
        config.display.density = density;
    }

    info!(
        platform = %config.platform,
        density = config.display.density,
        frame_rate_hz = config.mock.frame_rate_hz,
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&config);
        return Ok(());
    }

    let driver_config = DriverConfig {
        bridge: config,
        license: args.license.clone(),
        options: TrackerOptions {
            use_blink: args.use_blink.then_some(true),
            use_user_status: args.use_user_status.then_some(true),
            camera_preset: args.camera_preset,
            ..Default::default()
        },
        duration: (args.duration > 0).then(|| Duration::from_secs(args.duration)),
        calibration_mode: args.calibrate.then_some(args.calibration_points),
        tracking_fps: (args.tracking_fps > 0).then_some(args.tracking_fps),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
        log_events: args.log_events,
    };

    info!("Starting session...");
    let stats = Driver::new(driver_config)
        .run(shutdown_signal())
        .await
        .context("Session run failed")?;

    info!(
        frames = stats.events.total_frames,
        commands = stats.commands_sent,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Session completed"
    );
    stats.print_summary();

    info!("Gaze bridge finished");
    Ok(())
}

fn load_config(args: &RunArgs) -> Result<BridgeConfig> {
    let Some(ref path) = args.config else {
        info!("No configuration file given, using defaults");
        return Ok(BridgeConfig::default());
    };
    info!(config = %path.display(), "Loading configuration");

    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(config: &BridgeConfig) {
    println!("\n=== Configuration Summary ===\n");
    println!("Platform: {}", config.platform);
    println!("Display density: {}", config.display.density);
    println!(
        "Release on fatal status: {}",
        config.session.release_on_fatal_status
    );
    println!("\nEvent queues:");
    println!("  tracking: {}", config.event_bus.tracking_queue_capacity);
    println!("  status: {}", config.event_bus.status_queue_capacity);
    println!("  calibration: {}", config.event_bus.calibration_queue_capacity);
    println!("\nSimulated SDK:");
    println!("  Frame rate: {} Hz", config.mock.frame_rate_hz);
    println!(
        "  Screen: {}x{} px",
        config.mock.screen_width, config.mock.screen_height
    );
    println!();
}
