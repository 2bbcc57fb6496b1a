//! Configuration validation
//!
//! Rules:
//! - field ranges declared on the config types (`validator` derive)
//! - the mock screen must span at least one logical pixel at the configured density

use std::collections::BTreeMap;

use contracts::{BridgeConfig, BridgeError};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validate a BridgeConfig
///
/// Returns the first error encountered, ordered by field path.
pub fn validate(config: &BridgeConfig) -> Result<(), BridgeError> {
    validate_ranges(config)?;
    validate_screen_density(config)?;
    Ok(())
}

fn validate_ranges(config: &BridgeConfig) -> Result<(), BridgeError> {
    let Err(errors) = config.validate() else {
        return Ok(());
    };
    let mut flat = BTreeMap::new();
    flatten("", &errors, &mut flat);
    match flat.into_iter().next() {
        Some((field, message)) => Err(BridgeError::config_validation(field, message)),
        None => Ok(()),
    }
}

/// Collect `path -> message` for every failing field
fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut BTreeMap<String, String>) {
    for (field, kind) in errors.errors() {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        match kind {
            ValidationErrorsKind::Field(failures) => {
                let message = failures
                    .iter()
                    .map(|f| match &f.message {
                        Some(message) => message.to_string(),
                        None => format!("failed '{}' check", f.code),
                    })
                    .collect::<Vec<_>>()
                    .join(", ");
                out.insert(path, message);
            }
            ValidationErrorsKind::Struct(nested) => flatten(&path, nested, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    flatten(&format!("{path}[{index}]"), nested, out);
                }
            }
        }
    }
}

fn validate_screen_density(config: &BridgeConfig) -> Result<(), BridgeError> {
    let density = config.display.density;
    let mock = &config.mock;
    if mock.screen_width / density < 1.0 || mock.screen_height / density < 1.0 {
        return Err(BridgeError::config_validation(
            "mock.screen_width / mock.screen_height",
            format!(
                "screen {}x{} is smaller than one logical pixel at density {density}",
                mock.screen_width, mock.screen_height
            ),
        ));
    }
    Ok(())
}
