//! Reading settings from disk and the environment.
//!
//! The JSON file is overlaid onto the serialized defaults, the result is
//! deserialized, and finally `GAMESTAT_*` variables patch individual fields.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};
use crate::types::{DatabaseKind, Settings};

/// `~/.gamestat/settings.json`, or under `/tmp` when `HOME` is unset.
pub fn settings_path() -> PathBuf {
    std::env::var_os("HOME")
        .map_or_else(|| PathBuf::from("/tmp"), PathBuf::from)
        .join(".gamestat")
        .join("settings.json")
}

/// Load settings from `path`, then apply environment overrides.
///
/// A missing file yields the defaults. Unreadable files, malformed JSON and
/// values of the wrong type are errors.
pub fn load_settings_from_path(path: &Path) -> Result<Settings> {
    let mut tree = serde_json::to_value(Settings::default())?;
    match std::fs::read_to_string(path) {
        Ok(text) => {
            debug!(path = %path.display(), "settings file found");
            overlay(&mut tree, serde_json::from_str(&text)?);
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    }

    let mut settings: Settings = serde_json::from_value(tree)?;
    apply_overrides(&mut settings, |name| std::env::var(name).ok());
    Ok(settings)
}

/// Overlay `layer` onto `base` in place.
///
/// Objects merge key by key, anything else replaces what was there, and a
/// `null` in the layer leaves the base value untouched.
pub fn overlay(base: &mut Value, layer: Value) {
    match (base, layer) {
        (_, Value::Null) => {}
        (Value::Object(base), Value::Object(layer)) => {
            for (key, value) in layer {
                match base.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None if value.is_null() => {}
                    None => {
                        let _ = base.insert(key, value);
                    }
                }
            }
        }
        (base, layer) => *base = layer,
    }
}

type Setter = fn(&mut Settings, &str) -> Option<()>;

const OVERRIDES: &[(&str, Setter)] = &[
    ("GAMESTAT_DB_KIND", |s, v| {
        s.database.kind = parse_database_kind(v)?;
        Some(())
    }),
    ("GAMESTAT_DB_PATH", |s, v| {
        s.database.sqlite_path = v.to_owned();
        Some(())
    }),
    ("GAMESTAT_POOL_SIZE", |s, v| {
        s.database.pool_size = bounded(v, 1..=256)?;
        Some(())
    }),
    ("GAMESTAT_TPS_RETENTION_DAYS", |s, v| {
        s.retention.tps_days = bounded(v, 1..=3650)?;
        Some(())
    }),
    ("GAMESTAT_PING_RETENTION_DAYS", |s, v| {
        s.retention.ping_days = bounded(v, 1..=3650)?;
        Some(())
    }),
    ("GAMESTAT_LOG_LEVEL", |s, v| {
        s.logging.level = v.to_owned();
        Some(())
    }),
];

/// Patch `settings` from variables returned by `lookup`.
///
/// Empty values count as unset. A value that does not parse is logged and
/// skipped, keeping whatever the file or defaults said.
pub fn apply_overrides(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for (name, set) in OVERRIDES {
        let Some(value) = lookup(name).filter(|v| !v.is_empty()) else {
            continue;
        };
        if set(settings, &value).is_none() {
            warn!(var = *name, %value, "ignoring unusable environment override");
        }
    }
}

/// Database kind by name, ignoring case. `mariadb` is accepted for `mysql`.
pub fn parse_database_kind(name: &str) -> Option<DatabaseKind> {
    if name.eq_ignore_ascii_case("sqlite") {
        Some(DatabaseKind::Sqlite)
    } else if name.eq_ignore_ascii_case("mysql") || name.eq_ignore_ascii_case("mariadb") {
        Some(DatabaseKind::Mysql)
    } else if name.eq_ignore_ascii_case("h2") {
        Some(DatabaseKind::H2)
    } else {
        None
    }
}

fn bounded(value: &str, range: std::ops::RangeInclusive<u32>) -> Option<u32> {
    value.trim().parse().ok().filter(|n| range.contains(n))
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
