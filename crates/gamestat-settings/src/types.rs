//! Settings types.
//!
//! Every struct deserializes with `camelCase` keys and falls back to its
//! [`Default`] for missing fields, so partial user files are always valid.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings object.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Database connection settings.
    pub database: DatabaseSettings,
    /// Retention windows for sampled data.
    pub retention: RetentionSettings,
    /// Aggregation tuning.
    pub analysis: AnalysisSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

impl Settings {
    /// Reject values that would make the store unusable.
    pub fn validate(&self) -> Result<()> {
        if self.database.pool_size == 0 {
            return Err(SettingsError::InvalidValue(
                "database.poolSize must be at least 1".into(),
            ));
        }
        if self.database.kind == DatabaseKind::Sqlite && self.database.sqlite_path.is_empty() {
            return Err(SettingsError::InvalidValue(
                "database.sqlitePath must not be empty".into(),
            ));
        }
        if self.retention.tps_days == 0 || self.retention.ping_days == 0 {
            return Err(SettingsError::InvalidValue(
                "retention windows must be at least one day".into(),
            ));
        }
        let threshold = self.analysis.low_tps_threshold;
        if threshold.is_nan() || threshold <= 0.0 {
            return Err(SettingsError::InvalidValue(
                "analysis.lowTpsThreshold must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Which SQL dialect the database speaks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    /// Embedded single-file database.
    #[default]
    Sqlite,
    /// Networked database server.
    Mysql,
    /// Embedded database server.
    H2,
}

impl DatabaseKind {
    /// Lowercase name as used in settings files.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            Self::H2 => "h2",
        }
    }
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Database connection settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// SQL dialect.
    pub kind: DatabaseKind,
    /// Path to the database file when `kind` is `sqlite`.
    pub sqlite_path: String,
    /// Maximum pool size.
    pub pool_size: u32,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
    /// Page cache size in KiB.
    pub cache_size_kib: i64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            kind: DatabaseKind::Sqlite,
            sqlite_path: "database.db".to_string(),
            pool_size: 16,
            busy_timeout_ms: 30_000,
            cache_size_kib: 8192,
        }
    }
}

/// How long sampled data is kept before cleanup sweeps remove it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RetentionSettings {
    /// Days of TPS samples to keep.
    pub tps_days: u32,
    /// Days of ping samples to keep.
    pub ping_days: u32,
}

impl Default for RetentionSettings {
    fn default() -> Self {
        Self {
            tps_days: 90,
            ping_days: 14,
        }
    }
}

/// Tuning for derived aggregates.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    /// TPS below this value counts as a low-TPS spike.
    pub low_tps_threshold: f64,
    /// Days of TPS history loaded into a server view.
    pub tps_window_days: u32,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            low_tps_threshold: 10.0,
            tps_window_days: 30,
        }
    }
}

/// Logging settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
