//! Error types for CLI operations.

use command_dispatcher::CommandError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// The tracker SDK refused to initialize
    #[error("Gaze tracker initialization failed: {message}")]
    Initialization { message: String },

    /// A bridge command returned an error
    #[error("Command '{command}' failed: {source}")]
    Command {
        command: &'static str,
        #[source]
        source: CommandError,
    },
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    pub fn command(command: &'static str, source: CommandError) -> Self {
        Self::Command { command, source }
    }
}
