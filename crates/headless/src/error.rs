//! Runner errors and process exit codes.

use lurker_session::ConfigError;
use thiserror::Error;

/// Process exit codes.
pub struct ExitCode;

impl ExitCode {
    pub const SUCCESS: i32 = 0;

    /// Configuration file missing, unreadable, or invalid.
    pub const CONFIG_ERROR: i32 = 2;

    pub const IO_ERROR: i32 = 3;

    /// Invalid command-line arguments.
    pub const USAGE_ERROR: i32 = 64;
}

#[derive(Debug, Error)]
pub enum HeadlessError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid argument --{arg}: {reason}")]
    Usage { arg: &'static str, reason: String },
}

impl HeadlessError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(ConfigError::Io { .. }) => ExitCode::IO_ERROR,
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Usage { .. } => ExitCode::USAGE_ERROR,
        }
    }
}
