//! Layered error definitions
//!
//! Categorized by source: session / command arguments / hardware / config

use thiserror::Error;

/// Unified error type
#[derive(Debug, Error)]
pub enum BridgeError {
    // ===== Session Errors =====
    /// Command needs a tracker handle but none exists
    #[error("gaze tracker is not initialized")]
    NotInitialized,

    /// A second initialization was requested while one is outstanding
    #[error("already attempting")]
    AlreadyAttempting,

    /// Required hardware permission is missing
    #[error("camera permission is not granted")]
    PermissionDenied,

    // ===== Argument Errors =====
    /// Required argument missing or out of range
    #[error("invalid argument '{field}': {message}")]
    InvalidArgument { field: String, message: String },

    // ===== Hardware Errors =====
    /// SDK rejected the initialization request; reason is passed through verbatim
    #[error("gaze tracker initialization failed: {reason}")]
    HardwareInitializationFailed { reason: String },

    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create invalid argument error
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create missing argument error
    pub fn missing_argument(field: impl Into<String>) -> Self {
        Self::invalid_argument(field, "argument is null")
    }

    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_argument_message() {
        let err = BridgeError::missing_argument("license");
        assert_eq!(err.to_string(), "invalid argument 'license': argument is null");
    }

    #[test]
    fn test_hardware_reason_passes_through() {
        let err = BridgeError::HardwareInitializationFailed {
            reason: "ERROR_INIT".into(),
        };
        assert!(err.to_string().ends_with("ERROR_INIT"));
    }
}
