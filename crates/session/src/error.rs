//! Error types for the session crate.
//!
//! Session operations themselves never fail: missing controllers, debounced
//! pause toggles and absent monsters all degrade silently. Only configuration
//! loading and validation report errors.

use std::path::PathBuf;

use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid RON for [`crate::SessionConfig`].
    #[error("parse error in {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// A field holds a value the session cannot run with.
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
