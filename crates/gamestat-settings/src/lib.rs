//! # gamestat-settings
//!
//! Store, retention and analysis settings.
//!
//! Later layers win: compiled defaults, then the JSON file (usually
//! `~/.gamestat/settings.json`), then `GAMESTAT_*` environment variables.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_overrides, load_settings_from_path, overlay, settings_path};
pub use types::*;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
