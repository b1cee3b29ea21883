//! Pooled `SQLite` connections.
//!
//! Every connection handed out by the pool has already run the session
//! pragmas rendered from [`PoolOptions`]: write-ahead journaling, enforced
//! foreign keys, the configured busy timeout and page cache, and
//! `synchronous = NORMAL`.

use std::fmt::Write as _;
use std::time::Duration;

use gamestat_settings::DatabaseSettings;
use r2d2::{CustomizeConnection, Pool};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::errors::Result;

/// Pool of `SQLite` connections with session pragmas applied.
pub type ConnectionPool = Pool<SqliteConnectionManager>;

/// Where the pooled connections point.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location<'a> {
    /// Private in-memory database. Capped at one connection because each
    /// in-memory connection is a separate database.
    Memory,
    /// Database file at this path.
    File(&'a str),
}

/// Sizing and pragma values for a pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// How long a statement waits on a locked database.
    pub busy_timeout: Duration,
    /// Page cache per connection, in KiB.
    pub cache_kib: i64,
    /// How long `pool.get()` waits for a free connection.
    pub checkout_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self::from(&DatabaseSettings::default())
    }
}

impl From<&DatabaseSettings> for PoolOptions {
    fn from(settings: &DatabaseSettings) -> Self {
        Self {
            max_connections: settings.pool_size.max(1),
            busy_timeout: Duration::from_millis(u64::from(settings.busy_timeout_ms)),
            cache_kib: settings.cache_size_kib,
            checkout_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolOptions {
    /// Render the pragma script run on each new connection.
    ///
    /// A negative `cache_size` is read by `SQLite` as KiB instead of pages.
    fn session_script(&self) -> String {
        let mut script = String::from("PRAGMA journal_mode = WAL;\nPRAGMA foreign_keys = ON;\n");
        let _ = writeln!(script, "PRAGMA busy_timeout = {};", self.busy_timeout.as_millis());
        let _ = writeln!(script, "PRAGMA cache_size = -{};", self.cache_kib.unsigned_abs());
        script.push_str("PRAGMA synchronous = NORMAL;");
        script
    }
}

#[derive(Debug)]
struct SessionPragmas(String);

impl CustomizeConnection<Connection, rusqlite::Error> for SessionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> std::result::Result<(), rusqlite::Error> {
        conn.execute_batch(&self.0)
    }
}

/// Open a pool for `location`.
pub fn open_pool(location: Location<'_>, options: &PoolOptions) -> Result<ConnectionPool> {
    let (manager, max_size) = match location {
        Location::Memory => (SqliteConnectionManager::memory(), 1),
        Location::File(path) => (SqliteConnectionManager::file(path), options.max_connections),
    };
    Ok(Pool::builder()
        .max_size(max_size)
        .connection_timeout(options.checkout_timeout)
        .connection_customizer(Box::new(SessionPragmas(options.session_script())))
        .build(manager)?)
}

/// Session pragmas as a connection reports them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivePragmas {
    /// `wal` for files; in-memory databases report `memory`.
    pub journal_mode: String,
    /// Foreign key enforcement.
    pub foreign_keys: bool,
    /// Busy timeout in milliseconds.
    pub busy_timeout_ms: i64,
}

/// Read the session pragmas back from `conn`.
pub fn read_pragmas(conn: &Connection) -> Result<ActivePragmas> {
    let pragma_i64 = |name: &str| -> rusqlite::Result<i64> {
        conn.pragma_query_value(None, name, |row| row.get(0))
    };
    Ok(ActivePragmas {
        journal_mode: conn.pragma_query_value(None, "journal_mode", |row| row.get(0))?,
        foreign_keys: pragma_i64("foreign_keys")? == 1,
        busy_timeout_ms: pragma_i64("busy_timeout")?,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_db() -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.db").to_string_lossy().into_owned();
        (dir, path)
    }

    #[test]
    fn options_follow_database_settings() {
        let settings = DatabaseSettings {
            pool_size: 3,
            busy_timeout_ms: 750,
            cache_size_kib: 1024,
            ..Default::default()
        };
        let options = PoolOptions::from(&settings);
        assert_eq!(options.max_connections, 3);
        assert_eq!(options.busy_timeout, Duration::from_millis(750));
        assert_eq!(options.cache_kib, 1024);
    }

    #[test]
    fn script_sets_cache_in_kib() {
        let options = PoolOptions {
            cache_kib: 2048,
            ..Default::default()
        };
        let script = options.session_script();
        assert!(script.contains("cache_size = -2048;"), "{script}");
        assert!(script.contains("busy_timeout = 30000;"), "{script}");
    }

    #[test]
    fn memory_pool_keeps_one_database() {
        let pool = open_pool(Location::Memory, &PoolOptions::default()).unwrap();
        assert_eq!(pool.max_size(), 1);
        pool.get()
            .unwrap()
            .execute_batch("CREATE TABLE plan_probe (id INTEGER)")
            .unwrap();

        let conn = pool.get().unwrap();
        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE name = 'plan_probe'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 1);
        assert!(read_pragmas(&conn).unwrap().foreign_keys);
    }

    #[test]
    fn file_pool_applies_session_pragmas() {
        let (_dir, path) = temp_db();
        let options = PoolOptions {
            busy_timeout: Duration::from_millis(1234),
            ..Default::default()
        };
        let pool = open_pool(Location::File(&path), &options).unwrap();
        let active = read_pragmas(&pool.get().unwrap()).unwrap();
        assert_eq!(
            active,
            ActivePragmas {
                journal_mode: "wal".into(),
                foreign_keys: true,
                busy_timeout_ms: 1234,
            }
        );
    }

    #[test]
    fn file_pool_lends_up_to_max_connections() {
        let (_dir, path) = temp_db();
        let options = PoolOptions {
            max_connections: 2,
            checkout_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let pool = open_pool(Location::File(&path), &options).unwrap();
        let first = pool.get().unwrap();
        let second = pool.get().unwrap();
        assert!(pool.get().is_err());
        drop((first, second));
        assert!(pool.get().is_ok());
    }
}
