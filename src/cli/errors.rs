//! CLI errors. Every one ends the process with a non-zero exit.

use std::fmt;
use std::io;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration missing, unreadable or invalid
    ConfigError,
    IoError,
    /// `init` found a file at the config path
    AlreadyInitialized,
    /// Runtime or listener did not come up
    BootFailed,
}

impl CliErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ConfigError => "POSTDIR_CLI_CONFIG_ERROR",
            Self::IoError => "POSTDIR_CLI_IO_ERROR",
            Self::AlreadyInitialized => "POSTDIR_CLI_ALREADY_INITIALIZED",
            Self::BootFailed => "POSTDIR_CLI_BOOT_FAILED",
        }
    }
}

/// Failure of a CLI command, rendered as `CODE: message`
#[derive(Debug, Error)]
#[error("{}: {}", .code.as_str(), .message)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    fn with_code(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::with_code(CliErrorCode::ConfigError, msg)
    }

    pub fn already_initialized(path: impl fmt::Display) -> Self {
        Self::with_code(
            CliErrorCode::AlreadyInitialized,
            format!("Config file already exists: {}", path),
        )
    }

    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::with_code(CliErrorCode::BootFailed, msg)
    }

    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::with_code(CliErrorCode::IoError, e.to_string())
    }
}

/// The only JSON the CLI handles is the config file
impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::config_error(format!("JSON error: {}", e))
    }
}

pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_leads_with_code() {
        let err = CliError::boot_failed("port in use");
        assert_eq!(err.to_string(), "POSTDIR_CLI_BOOT_FAILED: port in use");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: CliError = io::Error::new(io::ErrorKind::PermissionDenied, "denied").into();
        assert_eq!(err.code(), &CliErrorCode::IoError);
        assert!(err.to_string().ends_with("denied"));
    }
}
