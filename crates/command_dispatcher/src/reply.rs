//! Command replies and their wire-form errors

use contracts::BridgeError;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Successful answer to a command
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CommandReply {
    /// Handled; `Value::Null` for commands with no result
    Success(Value),
    /// The command name is not in the table
    NotImplemented,
}

impl CommandReply {
    pub fn null() -> Self {
        Self::Success(Value::Null)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Success(value) => Some(value),
            Self::NotImplemented => None,
        }
    }
}

impl From<Value> for CommandReply {
    fn from(value: Value) -> Self {
        Self::Success(value)
    }
}

/// Error returned to the command caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{code}: {message}")]
pub struct CommandError {
    pub code: &'static str,
    pub message: String,
}

impl CommandError {
    pub const NOT_INITIALIZED: &'static str = "not_initialized";
    pub const ALREADY_ATTEMPTING: &'static str = "already_attempting";
    pub const PERMISSION_DENIED: &'static str = "permission_denied";
    pub const INVALID_ARGUMENT: &'static str = "invalid_argument";
    pub const INITIALIZATION_FAILED: &'static str = "initialization_failed";
    pub const INTERNAL: &'static str = "internal";

    /// Label used for the command metrics
    pub fn status(&self) -> &'static str {
        self.code
    }
}

impl From<BridgeError> for CommandError {
    fn from(err: BridgeError) -> Self {
        let code = match &err {
            BridgeError::NotInitialized => Self::NOT_INITIALIZED,
            BridgeError::AlreadyAttempting => Self::ALREADY_ATTEMPTING,
            BridgeError::PermissionDenied => Self::PERMISSION_DENIED,
            BridgeError::InvalidArgument { .. } => Self::INVALID_ARGUMENT,
            BridgeError::HardwareInitializationFailed { .. } => Self::INITIALIZATION_FAILED,
            BridgeError::ConfigParse { .. }
            | BridgeError::ConfigValidation { .. }
            | BridgeError::Io(_) => Self::INTERNAL,
        };
        Self {
            code,
            message: err.to_string(),
        }
    }
}
