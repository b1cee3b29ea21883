//! Fixtures shared by the integration tests.

#![allow(dead_code, unused_results)]

use std::path::{Path, PathBuf};

use gamestat_settings::DatabaseSettings;
use gamestat_store::schema::tables;
use gamestat_store::{Database, Query};
use rusqlite::Connection;
use tempfile::TempDir;

pub const U1: &str = "00000000-0000-0000-0000-000000000001";
pub const U2: &str = "00000000-0000-0000-0000-000000000002";
pub const S1: &str = "00000000-0000-0000-0000-0000000000aa";

/// Schema as written by releases before natural keys, with sample rows.
///
/// One ping row references a deleted player and cannot survive the rewrite.
pub const LEGACY_SCHEMA: &str = "
CREATE TABLE plan_users (
  id INTEGER PRIMARY KEY AUTOINCREMENT, uuid VARCHAR(36) NOT NULL UNIQUE,
  registered BIGINT NOT NULL, name VARCHAR(36) NOT NULL, times_kicked INT NOT NULL DEFAULT 0);
CREATE TABLE plan_servers (
  id INTEGER PRIMARY KEY AUTOINCREMENT, uuid VARCHAR(36) NOT NULL UNIQUE, name VARCHAR(100),
  web_address VARCHAR(100), is_installed BOOLEAN NOT NULL DEFAULT 1,
  is_proxy BOOLEAN NOT NULL DEFAULT 0, max_players INT NOT NULL DEFAULT -1);
CREATE TABLE plan_version (version INT NOT NULL);
CREATE TABLE plan_transfer (sender_server_id INT, expiry_date BIGINT, type VARCHAR(100));
CREATE TABLE plan_sessions (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, server_id INT NOT NULL,
  session_start BIGINT NOT NULL, session_end BIGINT NOT NULL,
  mob_kills INT NOT NULL, deaths INT NOT NULL);
CREATE TABLE plan_worlds (
  id INTEGER PRIMARY KEY AUTOINCREMENT, world_name VARCHAR(100) NOT NULL,
  server_uuid VARCHAR(36) NOT NULL);
CREATE TABLE plan_world_times (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, world_id INT NOT NULL,
  server_id INT NOT NULL, session_id INT NOT NULL,
  survival_time BIGINT NOT NULL DEFAULT 0, creative_time BIGINT NOT NULL DEFAULT 0,
  adventure_time BIGINT NOT NULL DEFAULT 0, spectator_time BIGINT NOT NULL DEFAULT 0);
CREATE TABLE plan_kills (
  id INTEGER PRIMARY KEY AUTOINCREMENT, killer_id INT NOT NULL, victim_id INT NOT NULL,
  server_id INT NOT NULL, weapon VARCHAR(30) NOT NULL, date BIGINT NOT NULL,
  session_id INT NOT NULL);
CREATE TABLE plan_ping (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, server_id INT NOT NULL,
  date BIGINT NOT NULL, max_ping INT NOT NULL, min_ping INT NOT NULL, avg_ping DOUBLE NOT NULL);
CREATE TABLE plan_user_info (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, server_id INT NOT NULL,
  registered BIGINT NOT NULL, opped BOOLEAN NOT NULL DEFAULT 0,
  banned BOOLEAN NOT NULL DEFAULT 0);
CREATE TABLE plan_nicknames (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, nickname VARCHAR(75) NOT NULL,
  server_id INT NOT NULL);
CREATE TABLE plan_geolocations (
  id INTEGER PRIMARY KEY AUTOINCREMENT, user_id INT NOT NULL, geolocation VARCHAR(50) NOT NULL);
CREATE TABLE plan_tps (
  server_uuid VARCHAR(36) NOT NULL, date BIGINT NOT NULL, tps DOUBLE NOT NULL,
  players_online INT NOT NULL, cpu_usage DOUBLE NOT NULL, ram_usage BIGINT NOT NULL,
  entities INT NOT NULL, chunks_loaded INT NOT NULL);

INSERT INTO plan_users (id, uuid, registered, name) VALUES
  (1, '00000000-0000-0000-0000-000000000001', 1000, 'Alice'),
  (2, '00000000-0000-0000-0000-000000000002', 2000, 'Bob');
INSERT INTO plan_servers (id, uuid, name) VALUES
  (1, '00000000-0000-0000-0000-0000000000aa', 'lobby');
INSERT INTO plan_version VALUES (11);
INSERT INTO plan_sessions VALUES
  (1, 1, 1, 10000, 70000, 3, 1),
  (2, 1, 1, 80000, 95000, 0, 0),
  (3, 2, 1, 10000, 40000, 1, 2);
INSERT INTO plan_worlds VALUES (1, 'world', '00000000-0000-0000-0000-0000000000aa');
INSERT INTO plan_world_times VALUES
  (1, 1, 1, 1, 1, 60000, 0, 0, 0),
  (2, 2, 1, 1, 3, 20000, 10000, 0, 0);
INSERT INTO plan_kills VALUES (1, 1, 2, 1, 'Diamond Sword', 30000, 1);
INSERT INTO plan_ping VALUES
  (1, 1, 1, 60000, 80, 20, 40.0),
  (2, 2, 1, 60000, 120, 60, 90.0),
  (3, 99, 1, 60000, 10, 10, 10.0);
INSERT INTO plan_user_info VALUES (1, 1, 1, 1000, 1, 0), (2, 2, 1, 2000, 0, 1);
INSERT INTO plan_nicknames VALUES (1, 1, 'Ally', 1), (2, 2, 'Bobby', 1);
INSERT INTO plan_geolocations VALUES (1, 1, 'Finland'), (2, 2, 'Sweden');
INSERT INTO plan_tps VALUES
  ('00000000-0000-0000-0000-0000000000aa', 60000, 19.9, 2, 12.5, 2048, 300, 120),
  ('00000000-0000-0000-0000-0000000000aa', 120000, 8.0, 2, 40.0, 2100, 900, 130);
";

/// Every current table.
pub const TABLES: &[&str] = &[
    tables::USERS,
    tables::SERVERS,
    tables::USER_INFO,
    tables::SESSIONS,
    tables::WORLDS,
    tables::WORLD_TIMES,
    tables::KILLS,
    tables::PING,
    tables::NICKNAMES,
    tables::GEOLOCATIONS,
    tables::TPS,
    tables::EXTENSION_PLUGINS,
    tables::EXTENSION_USER_VALUES,
];

/// A database file inside its own temporary directory.
pub struct DbFile {
    _dir: TempDir,
    pub path: PathBuf,
}

impl DbFile {
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("database.db");
        Self { _dir: dir, path }
    }

    pub fn legacy() -> Self {
        let file = Self::empty();
        file.raw().execute_batch(LEGACY_SCHEMA).unwrap();
        file
    }

    /// Direct connection, bypassing the store.
    pub fn raw(&self) -> Connection {
        Connection::open(&self.path).unwrap()
    }

    pub fn database(&self) -> Database {
        Database::open(&settings(&self.path)).unwrap()
    }
}

pub fn settings(path: &Path) -> DatabaseSettings {
    DatabaseSettings {
        sqlite_path: path.to_string_lossy().into_owned(),
        pool_size: 4,
        ..Default::default()
    }
}

pub fn row_count(db: &Database, table: &str) -> i64 {
    db.query(&Query::count(format!("SELECT COUNT(*) FROM {table}"), vec![]))
        .unwrap()
}

pub fn row_counts(db: &Database) -> Vec<(&'static str, i64)> {
    TABLES.iter().map(|t| (*t, row_count(db, t))).collect()
}

pub fn has_table(conn: &Connection, table: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |r| r.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> bool {
    conn.query_row(
        "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
        [table, column],
        |r| r.get::<_, i64>(0),
    )
    .unwrap()
        > 0
}
