//! Log output for binaries.
//!
//! The store and aggregation crates only emit `tracing` events. A binary
//! calls [`init`] once to send them to stderr, either human-readable or as
//! one JSON object per line.

use tracing_subscriber::EnvFilter;

/// Shape of each log line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Single-line text with the event target.
    #[default]
    Compact,
    /// Newline-delimited JSON.
    Json,
}

impl LogFormat {
    /// `Json` when `json` is set, otherwise `Compact`.
    pub fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Compact }
    }
}

/// Filter from `RUST_LOG`, or from `level` when that is unset or invalid.
fn filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Only the first call in a process wins.
pub fn init(level: &str, format: LogFormat) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(level))
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Compact => builder.with_target(true).compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(?format, "log output ready");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
