//! `CREATE TABLE` statements for the current schema.
//!
//! Each table is written once; the only dialect-specific fragment is the
//! auto-increment id column. Uuids are `VARCHAR(36)` and times are epoch
//! milliseconds.

use crate::dialect::Dialect;

/// Players, one row per uuid.
pub const USERS: &str = "plan_users";
/// Registered servers.
pub const SERVERS: &str = "plan_servers";
/// Per-server player facts (operator, banned, join address).
pub const USER_INFO: &str = "plan_user_info";
/// Finished play sessions.
pub const SESSIONS: &str = "plan_sessions";
/// World names per server.
pub const WORLDS: &str = "plan_worlds";
/// Per-session game-mode time per world.
pub const WORLD_TIMES: &str = "plan_world_times";
/// Player-versus-player kills.
pub const KILLS: &str = "plan_kills";
/// Sampled ping aggregates.
pub const PING: &str = "plan_ping";
/// Display names seen per server.
pub const NICKNAMES: &str = "plan_nicknames";
/// Resolved player locations.
pub const GEOLOCATIONS: &str = "plan_geolocations";
/// Sampled server performance.
pub const TPS: &str = "plan_tps";
/// Plugins providing extension values.
pub const EXTENSION_PLUGINS: &str = "plan_extension_plugins";
/// Per-player extension values.
pub const EXTENSION_USER_VALUES: &str = "plan_extension_user_values";

/// Every current table, in creation order.
pub fn create_statements(dialect: &dyn Dialect) -> Vec<String> {
    vec![
        users(dialect),
        servers(dialect),
        user_info(dialect),
        sessions(dialect),
        worlds(dialect),
        world_times(dialect),
        kills(dialect),
        ping(dialect),
        nicknames(dialect),
        geolocations(dialect),
        tps(),
        extension_plugins(dialect),
        extension_user_values(dialect),
    ]
}

/// `plan_users`.
pub fn users(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {USERS} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL UNIQUE, \
         registered BIGINT NOT NULL, \
         name VARCHAR(36) NOT NULL, \
         times_kicked INT NOT NULL DEFAULT 0)",
        id = dialect.id_column()
    )
}

/// `plan_servers`.
pub fn servers(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {SERVERS} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL UNIQUE, \
         name VARCHAR(100), \
         web_address VARCHAR(100), \
         is_installed BOOLEAN NOT NULL DEFAULT 1, \
         is_proxy BOOLEAN NOT NULL DEFAULT 0, \
         max_players INT NOT NULL DEFAULT -1)",
        id = dialect.id_column()
    )
}

/// `plan_user_info`.
pub fn user_info(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {USER_INFO} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         registered BIGINT NOT NULL, \
         opped BOOLEAN NOT NULL DEFAULT 0, \
         banned BOOLEAN NOT NULL DEFAULT 0, \
         join_address VARCHAR(255))",
        id = dialect.id_column()
    )
}

/// `plan_sessions`, including AFK time.
pub fn sessions(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {SESSIONS} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         session_start BIGINT NOT NULL, \
         session_end BIGINT NOT NULL, \
         mob_kills INT NOT NULL, \
         deaths INT NOT NULL, \
         afk_time BIGINT NOT NULL DEFAULT 0)",
        id = dialect.id_column()
    )
}

/// `plan_worlds`.
pub fn worlds(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {WORLDS} (\
         {id}, \
         world_name VARCHAR(100) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL)",
        id = dialect.id_column()
    )
}

/// `plan_world_times`.
pub fn world_times(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {WORLD_TIMES} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         world_id INT NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         session_id INT NOT NULL, \
         survival_time BIGINT NOT NULL DEFAULT 0, \
         creative_time BIGINT NOT NULL DEFAULT 0, \
         adventure_time BIGINT NOT NULL DEFAULT 0, \
         spectator_time BIGINT NOT NULL DEFAULT 0)",
        id = dialect.id_column()
    )
}

/// `plan_kills`.
pub fn kills(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {KILLS} (\
         {id}, \
         killer_uuid VARCHAR(36) NOT NULL, \
         victim_uuid VARCHAR(36) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         weapon VARCHAR(30) NOT NULL, \
         date BIGINT NOT NULL, \
         session_id INT NOT NULL)",
        id = dialect.id_column()
    )
}

/// `plan_ping`.
pub fn ping(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {PING} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         date BIGINT NOT NULL, \
         max_ping INT NOT NULL, \
         min_ping INT NOT NULL, \
         avg_ping DOUBLE NOT NULL)",
        id = dialect.id_column()
    )
}

/// `plan_nicknames`.
pub fn nicknames(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {NICKNAMES} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         nickname VARCHAR(75) NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL, \
         last_used BIGINT NOT NULL)",
        id = dialect.id_column()
    )
}

/// `plan_geolocations`.
pub fn geolocations(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {GEOLOCATIONS} (\
         {id}, \
         uuid VARCHAR(36) NOT NULL, \
         geolocation VARCHAR(50) NOT NULL, \
         last_used BIGINT NOT NULL DEFAULT 0)",
        id = dialect.id_column()
    )
}

/// `plan_tps`. Samples carry no surrogate id.
pub fn tps() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {TPS} (\
         server_uuid VARCHAR(36) NOT NULL, \
         date BIGINT NOT NULL, \
         tps DOUBLE NOT NULL, \
         players_online INT NOT NULL, \
         cpu_usage DOUBLE NOT NULL, \
         ram_usage BIGINT NOT NULL, \
         entities INT NOT NULL, \
         chunks_loaded INT NOT NULL, \
         free_disk_space BIGINT NOT NULL DEFAULT -1)"
    )
}

/// `plan_extension_plugins`.
pub fn extension_plugins(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {EXTENSION_PLUGINS} (\
         {id}, \
         name VARCHAR(50) NOT NULL, \
         last_updated BIGINT NOT NULL, \
         server_uuid VARCHAR(36) NOT NULL)",
        id = dialect.id_column()
    )
}

/// `plan_extension_user_values`.
pub fn extension_user_values(dialect: &dyn Dialect) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {EXTENSION_USER_VALUES} (\
         {id}, \
         plugin_id INT NOT NULL, \
         uuid VARCHAR(36) NOT NULL, \
         provider_name VARCHAR(50) NOT NULL, \
         boolean_value BOOLEAN, \
         double_value DOUBLE, \
         long_value BIGINT, \
         string_value VARCHAR(50))",
        id = dialect.id_column()
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
