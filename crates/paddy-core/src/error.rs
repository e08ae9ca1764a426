// SPDX-FileCopyrightText: 2026 Paddy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Paddy survey bot.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across all Paddy adapter traits and core operations.
#[derive(Debug, Error)]
pub enum PaddyError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Messaging channel errors (connection failure, rejected request, closed stream).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Remote drive errors. `transient` marks failures worth retrying
    /// (rate limits, timeouts, connection resets).
    #[error("drive error: {message}")]
    Drive {
        message: String,
        transient: bool,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Local filesystem errors, always carrying the offending path.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Survey log storage errors (CSV serialization, flush failure).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Inbound data that does not match any legal value for its slot.
    #[error("decode error: {0}")]
    Decode(String),

    /// The upload queue refused work (stopped or worker gone).
    #[error("queue error: {0}")]
    Queue(String),

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PaddyError {
    /// Builds an [`PaddyError::Io`] for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether retrying the failed operation could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Drive { transient, .. } => *transient,
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drive_errors_carry_transience() {
        let transient = PaddyError::Drive {
            message: "429".into(),
            transient: true,
            source: None,
        };
        let permanent = PaddyError::Drive {
            message: "403".into(),
            transient: false,
            source: None,
        };
        assert!(transient.is_transient());
        assert!(!permanent.is_transient());
    }

    #[test]
    fn timeouts_are_transient_but_config_is_not() {
        let timeout = PaddyError::Timeout {
            duration: std::time::Duration::from_secs(1),
        };
        assert!(timeout.is_transient());
        assert!(!PaddyError::Config("x".into()).is_transient());
        assert!(!PaddyError::io("/tmp/missing", std::io::Error::other("gone")).is_transient());
    }

    #[test]
    fn io_error_displays_path() {
        let err = PaddyError::io(
            "/tmp/photo.jpg",
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/photo.jpg"), "got: {msg}");
    }
}
