//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use contracts::{BridgeConfig, Platform};

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    platform: String,
    density: f64,
    tracking_queue_capacity: usize,
    release_on_fatal_status: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(config) => {
            let warnings = collect_warnings(&config);
            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    platform: config.platform.to_string(),
                    density: config.display.density,
                    tracking_queue_capacity: config.event_bus.tracking_queue_capacity,
                    release_on_fatal_status: config.session.release_on_fatal_status,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &BridgeConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    // One second of frames should fit in the tracking queue
    let frames_per_second = config.mock.frame_rate_hz.ceil() as usize;
    if config.event_bus.tracking_queue_capacity < frames_per_second {
        warnings.push(format!(
            "event_bus.tracking_queue_capacity ({}) holds less than one second of frames at {} Hz",
            config.event_bus.tracking_queue_capacity, config.mock.frame_rate_hz
        ));
    }

    if !config.session.release_on_fatal_status {
        warnings.push(
            "session.release_on_fatal_status is off - a failed camera keeps the session alive"
                .to_string(),
        );
    }

    if config.platform == Platform::Ios && config.tracker.max_concurrency.is_some() {
        warnings.push("tracker.max_concurrency is ignored by the iOS SDK".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Platform: {}", summary.platform);
            println!("  Density: {}", summary.density);
            println!("  Tracking queue: {}", summary.tracking_queue_capacity);
            println!("  Release on fatal status: {}", summary.release_on_fatal_status);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
