//! Error types for Prelytics.
//!
//! Library crates use [`PrelyticsError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! The report assembly/parsing core never produces errors; everything here
//! belongs to the collaborators around it (config, HTTP, LLM, filesystem).

use std::path::PathBuf;

/// Top-level error type for all fallible Prelytics operations.
#[derive(Debug, thiserror::Error)]
pub enum PrelyticsError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error while scraping or calling a data source.
    #[error("network error: {0}")]
    Network(String),

    /// Response body or page content could not be interpreted.
    #[error("parse error: {message}")]
    Parse { message: String },

    /// Text generation (LLM) request failed or returned nothing usable.
    #[error("generation error: {0}")]
    Generation(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input validation error (bad URL, unknown target, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PrelyticsError>;

impl PrelyticsError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a parse error from any displayable message.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
