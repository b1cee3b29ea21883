//! Row types read from and written to the store.
//!
//! Times are epoch milliseconds throughout. Players and servers are
//! identified by uuid; surrogate row ids only appear where rows reference
//! each other (sessions, worlds, extension plugins).

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

/// A player as first registered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseUser {
    /// Player uuid.
    pub uuid: Uuid,
    /// Last known account name.
    pub name: String,
    /// First join on any server.
    pub registered: i64,
    /// Times kicked across all servers.
    pub times_kicked: i32,
}

/// A registered server.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    /// Row id.
    pub id: i64,
    /// Server uuid.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// Address of the server's web view, when it has one.
    pub web_address: Option<String>,
    /// Whether the capture plugin is still installed.
    pub is_installed: bool,
    /// Whether this is a proxy in front of other servers.
    pub is_proxy: bool,
    /// Configured player limit, `-1` when unknown.
    pub max_players: i32,
}

/// Time spent in each game mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GmTimes {
    /// Survival mode.
    pub survival: i64,
    /// Creative mode.
    pub creative: i64,
    /// Adventure mode.
    pub adventure: i64,
    /// Spectator mode.
    pub spectator: i64,
}

impl GmTimes {
    /// Sum over all modes.
    pub fn total(&self) -> i64 {
        self.survival + self.creative + self.adventure + self.spectator
    }

    /// Add `other` mode by mode.
    pub fn add(&mut self, other: &GmTimes) {
        self.survival += other.survival;
        self.creative += other.creative;
        self.adventure += other.adventure;
        self.spectator += other.spectator;
    }
}

/// Game-mode times keyed by world name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WorldTimes {
    worlds: BTreeMap<String, GmTimes>,
}

impl WorldTimes {
    /// Empty breakdown.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add time spent in `world`.
    pub fn add(&mut self, world: impl Into<String>, times: &GmTimes) {
        self.worlds.entry(world.into()).or_default().add(times);
    }

    /// Fold every world of `other` into this breakdown.
    pub fn merge(&mut self, other: &WorldTimes) {
        for (world, times) in &other.worlds {
            self.worlds.entry(world.clone()).or_default().add(times);
        }
    }

    /// Times for one world.
    pub fn world(&self, world: &str) -> Option<&GmTimes> {
        self.worlds.get(world)
    }

    /// Every world with its times, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &GmTimes)> {
        self.worlds.iter().map(|(name, times)| (name.as_str(), times))
    }

    /// Time across every world and mode.
    pub fn total(&self) -> i64 {
        self.worlds.values().map(GmTimes::total).sum()
    }

    /// Whether no world has been recorded.
    pub fn is_empty(&self) -> bool {
        self.worlds.is_empty()
    }
}

/// One player killing another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerKill {
    /// Killer uuid.
    pub killer: Uuid,
    /// Victim uuid.
    pub victim: Uuid,
    /// Server the kill happened on.
    pub server_uuid: Uuid,
    /// Weapon name.
    pub weapon: String,
    /// Time of the kill.
    pub date: i64,
    /// Killer's session, when stored.
    #[serde(skip)]
    pub session_id: Option<i64>,
}

/// A play session that has ended.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishedSession {
    /// Row id once stored.
    pub id: Option<i64>,
    /// Player uuid.
    pub player_uuid: Uuid,
    /// Server uuid.
    pub server_uuid: Uuid,
    /// Session start.
    pub start: i64,
    /// Session end.
    pub end: i64,
    /// Mobs killed.
    pub mob_kills: i32,
    /// Deaths of any cause.
    pub deaths: i32,
    /// Recorded AFK time; may be out of range in old data.
    pub afk_time: i64,
    /// Per-world game-mode times.
    pub world_times: WorldTimes,
    /// Player kills made during the session.
    pub player_kills: Vec<PlayerKill>,
}

impl FinishedSession {
    /// Session length, never negative.
    pub fn length(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    /// AFK time clamped into `0..=length`.
    pub fn afk(&self) -> i64 {
        self.afk_time.clamp(0, self.length())
    }

    /// Length minus AFK time.
    pub fn active(&self) -> i64 {
        self.length() - self.afk()
    }
}

/// Ping aggregate over one sample window.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ping {
    /// Server sampled on.
    pub server_uuid: Uuid,
    /// Window end.
    pub date: i64,
    /// Lowest ping in the window.
    pub min: i32,
    /// Highest ping in the window.
    pub max: i32,
    /// Mean ping in the window.
    pub avg: f64,
}

/// Per-server player facts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    /// Player uuid.
    pub player_uuid: Uuid,
    /// Server uuid.
    pub server_uuid: Uuid,
    /// First join on this server.
    pub registered: i64,
    /// Operator on this server.
    pub opped: bool,
    /// Banned on this server.
    pub banned: bool,
    /// Address the player connected through.
    pub join_address: Option<String>,
}

/// A display name seen for a player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Nickname {
    /// The name.
    pub name: String,
    /// Server it was seen on.
    pub server_uuid: Uuid,
    /// Last time it was seen.
    pub last_used: i64,
}

/// A resolved player location.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoInfo {
    /// Country or region name.
    pub geolocation: String,
    /// Last time the player connected from it.
    pub last_used: i64,
}

/// One server performance sample.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TpsSample {
    /// Server sampled.
    pub server_uuid: Uuid,
    /// Sample time.
    pub date: i64,
    /// Ticks per second.
    pub tps: f64,
    /// Players online.
    pub players_online: i32,
    /// Process CPU usage percentage.
    pub cpu_usage: f64,
    /// Used memory in MB.
    pub ram_usage: i64,
    /// Loaded entities.
    pub entities: i32,
    /// Loaded chunks.
    pub chunks_loaded: i32,
    /// Free disk space in MB, `-1` when unknown.
    pub free_disk_space: i64,
}

/// Typed value provided by a plugin.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExtensionData {
    /// Yes/no value.
    Boolean(bool),
    /// Decimal value.
    Double(f64),
    /// Integer value.
    Long(i64),
    /// Text value.
    String(String),
}

/// One plugin-provided value for a player.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionValue {
    /// Providing plugin.
    pub plugin: String,
    /// Server the plugin runs on.
    pub server_uuid: Uuid,
    /// Provider name within the plugin.
    pub provider: String,
    /// The value.
    pub value: ExtensionData,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
