//! Settings errors.

use std::path::PathBuf;

use thiserror::Error;

/// Why settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The file is not JSON, or a value has the wrong shape.
    #[error("malformed settings: {0}")]
    Json(#[from] serde_json::Error),
    /// A value parsed but is unusable.
    #[error("invalid settings value: {0}")]
    InvalidValue(String),
}

/// Result alias for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
