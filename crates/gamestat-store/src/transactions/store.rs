//! Write transactions used by the capture layer.
//!
//! All of them are best-effort: a lost sample is logged, never fatal. They
//! avoid dialect-specific upserts by probing for an existing row first.

use rusqlite::types::Value;
use uuid::Uuid;

use crate::errors::{Result, StoreError};
use crate::model::{ExtensionData, FinishedSession, GeoInfo, Nickname, Ping, PlayerKill, TpsSample};
use crate::statement::{Executable, Query, text, uuid};
use crate::transaction::{Transaction, TxContext};

// ── Players and servers ─────────────────────────────────────────────────────

/// Registers a server or refreshes its details.
#[derive(Clone, Debug)]
pub struct RegisterServer {
    /// Server uuid.
    pub uuid: Uuid,
    /// Display name.
    pub name: String,
    /// Web view address.
    pub web_address: Option<String>,
    /// Proxy flag.
    pub is_proxy: bool,
    /// Player limit.
    pub max_players: i32,
}

impl Transaction for RegisterServer {
    fn name(&self) -> &str {
        "RegisterServer"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let exists = ctx.query(&Query::exists(
            "SELECT 1 FROM plan_servers WHERE uuid = ?",
            vec![uuid(&self.uuid)],
        ))?;
        let details = vec![
            text(self.name.as_str()),
            Value::from(self.web_address.clone()),
            Value::from(self.is_proxy),
            Value::from(self.max_players),
            uuid(&self.uuid),
        ];
        let sql = if exists {
            "UPDATE plan_servers SET name = ?, web_address = ?, is_proxy = ?, max_players = ?, \
             is_installed = 1 WHERE uuid = ?"
        } else {
            "INSERT INTO plan_servers (name, web_address, is_proxy, max_players, is_installed, uuid) \
             VALUES (?, ?, ?, ?, 1, ?)"
        };
        let _ = ctx.execute(&Executable::with_params(sql, details))?;
        Ok(())
    }
}

/// Registers a player globally and on one server.
///
/// Existing rows keep their original registration date; the account name
/// is refreshed.
#[derive(Clone, Debug)]
pub struct RegisterPlayer {
    /// Player uuid.
    pub player: Uuid,
    /// Account name.
    pub name: String,
    /// Join time.
    pub registered: i64,
    /// Server joined.
    pub server: Uuid,
    /// Address connected through.
    pub join_address: Option<String>,
}

impl Transaction for RegisterPlayer {
    fn name(&self) -> &str {
        "RegisterPlayer"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let known = ctx.query(&Query::exists(
            "SELECT 1 FROM plan_users WHERE uuid = ?",
            vec![uuid(&self.player)],
        ))?;
        let _ = if known {
            ctx.execute(&Executable::with_params(
                "UPDATE plan_users SET name = ? WHERE uuid = ?",
                vec![text(self.name.as_str()), uuid(&self.player)],
            ))?
        } else {
            ctx.execute(&Executable::with_params(
                "INSERT INTO plan_users (uuid, registered, name) VALUES (?, ?, ?)",
                vec![
                    uuid(&self.player),
                    Value::Integer(self.registered),
                    text(self.name.as_str()),
                ],
            ))?
        };

        let joined = ctx.query(&Query::exists(
            "SELECT 1 FROM plan_user_info WHERE uuid = ? AND server_uuid = ?",
            vec![uuid(&self.player), uuid(&self.server)],
        ))?;
        if !joined {
            let _ = ctx.execute(&Executable::with_params(
                "INSERT INTO plan_user_info (uuid, server_uuid, registered, join_address) \
                 VALUES (?, ?, ?, ?)",
                vec![
                    uuid(&self.player),
                    uuid(&self.server),
                    Value::Integer(self.registered),
                    Value::from(self.join_address.clone()),
                ],
            ))?;
        }
        Ok(())
    }
}

/// Sets the banned flag of a player on one server.
#[derive(Clone, Debug)]
pub struct SetBanStatus {
    /// Player uuid.
    pub player: Uuid,
    /// Server uuid.
    pub server: Uuid,
    /// New flag.
    pub banned: bool,
}

impl Transaction for SetBanStatus {
    fn name(&self) -> &str {
        "SetBanStatus"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let _ = ctx.execute(&Executable::with_params(
            "UPDATE plan_user_info SET banned = ? WHERE uuid = ? AND server_uuid = ?",
            vec![Value::from(self.banned), uuid(&self.player), uuid(&self.server)],
        ))?;
        Ok(())
    }
}

/// Sets the operator flag of a player on one server.
#[derive(Clone, Debug)]
pub struct SetOperatorStatus {
    /// Player uuid.
    pub player: Uuid,
    /// Server uuid.
    pub server: Uuid,
    /// New flag.
    pub opped: bool,
}

impl Transaction for SetOperatorStatus {
    fn name(&self) -> &str {
        "SetOperatorStatus"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let _ = ctx.execute(&Executable::with_params(
            "UPDATE plan_user_info SET opped = ? WHERE uuid = ? AND server_uuid = ?",
            vec![Value::from(self.opped), uuid(&self.player), uuid(&self.server)],
        ))?;
        Ok(())
    }
}

/// Counts a kick.
#[derive(Clone, Debug)]
pub struct KickPlayer {
    /// Player uuid.
    pub player: Uuid,
}

impl Transaction for KickPlayer {
    fn name(&self) -> &str {
        "KickPlayer"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let _ = ctx.execute(&Executable::with_params(
            "UPDATE plan_users SET times_kicked = times_kicked + 1 WHERE uuid = ?",
            vec![uuid(&self.player)],
        ))?;
        Ok(())
    }
}

// ── Sessions ────────────────────────────────────────────────────────────────

/// Stores a finished session with its world times and kills.
///
/// Worlds seen for the first time are registered on the session's server.
#[derive(Clone, Debug)]
pub struct StoreSession {
    /// The session; its `id` is ignored and assigned by the database.
    pub session: FinishedSession,
}

impl StoreSession {
    fn insert_session(&self, ctx: &TxContext<'_>) -> Result<i64> {
        let s = &self.session;
        let identity = vec![
            uuid(&s.player_uuid),
            uuid(&s.server_uuid),
            Value::Integer(s.start),
            Value::Integer(s.end),
        ];
        let mut params = identity.clone();
        params.extend([
            Value::from(s.mob_kills),
            Value::from(s.deaths),
            Value::Integer(s.afk_time),
        ]);
        let _ = ctx.execute(&Executable::with_params(
            "INSERT INTO plan_sessions \
             (uuid, server_uuid, session_start, session_end, mob_kills, deaths, afk_time) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            params,
        ))?;

        ctx.query(&Query::single(
            "SELECT MAX(id) FROM plan_sessions \
             WHERE uuid = ? AND server_uuid = ? AND session_start = ? AND session_end = ?",
            identity,
            |row| Ok(row.get::<_, Option<i64>>(0)?),
        ))?
        .flatten()
        .ok_or_else(|| StoreError::InvalidData("stored session could not be read back".into()))
    }

    fn world_id(&self, ctx: &TxContext<'_>, world: &str) -> Result<i64> {
        let lookup = || {
            Query::single(
                "SELECT id FROM plan_worlds WHERE world_name = ? AND server_uuid = ?",
                vec![text(world), uuid(&self.session.server_uuid)],
                |row| Ok(row.get::<_, i64>(0)?),
            )
        };
        if let Some(id) = ctx.query(&lookup())? {
            return Ok(id);
        }
        let _ = ctx.execute(&Executable::with_params(
            "INSERT INTO plan_worlds (world_name, server_uuid) VALUES (?, ?)",
            vec![text(world), uuid(&self.session.server_uuid)],
        ))?;
        ctx.query(&lookup())?
            .ok_or_else(|| StoreError::InvalidData(format!("world '{world}' could not be read back")))
    }
}

impl Transaction for StoreSession {
    fn name(&self) -> &str {
        "StoreSession"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let session_id = self.insert_session(ctx)?;
        let s = &self.session;

        let mut statements = Vec::new();
        for (world, times) in s.world_times.iter() {
            statements.push(Executable::with_params(
                "INSERT INTO plan_world_times \
                 (uuid, world_id, server_uuid, session_id, \
                  survival_time, creative_time, adventure_time, spectator_time) \
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                vec![
                    uuid(&s.player_uuid),
                    Value::Integer(self.world_id(ctx, world)?),
                    uuid(&s.server_uuid),
                    Value::Integer(session_id),
                    Value::Integer(times.survival),
                    Value::Integer(times.creative),
                    Value::Integer(times.adventure),
                    Value::Integer(times.spectator),
                ],
            ));
        }
        statements.extend(s.player_kills.iter().map(|kill| kill_insert(kill, session_id)));
        let _ = ctx.execute_many(&statements)?;
        Ok(())
    }
}

fn kill_insert(kill: &PlayerKill, session_id: i64) -> Executable {
    Executable::with_params(
        "INSERT INTO plan_kills (killer_uuid, victim_uuid, server_uuid, weapon, date, session_id) \
         VALUES (?, ?, ?, ?, ?, ?)",
        vec![
            uuid(&kill.killer),
            uuid(&kill.victim),
            uuid(&kill.server_uuid),
            text(kill.weapon.as_str()),
            Value::Integer(kill.date),
            Value::Integer(session_id),
        ],
    )
}

// ── Samples ─────────────────────────────────────────────────────────────────

/// Stores one ping window.
#[derive(Clone, Debug)]
pub struct StorePing {
    /// Player uuid.
    pub player: Uuid,
    /// The sample.
    pub ping: Ping,
}

impl Transaction for StorePing {
    fn name(&self) -> &str {
        "StorePing"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let p = &self.ping;
        let _ = ctx.execute(&Executable::with_params(
            "INSERT INTO plan_ping (uuid, server_uuid, date, max_ping, min_ping, avg_ping) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                uuid(&self.player),
                uuid(&p.server_uuid),
                Value::Integer(p.date),
                Value::from(p.max),
                Value::from(p.min),
                Value::Real(p.avg),
            ],
        ))?;
        Ok(())
    }
}

/// Stores one TPS sample.
#[derive(Clone, Debug)]
pub struct StoreTps {
    /// The sample.
    pub sample: TpsSample,
}

impl Transaction for StoreTps {
    fn name(&self) -> &str {
        "StoreTps"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let t = &self.sample;
        let _ = ctx.execute(&Executable::with_params(
            "INSERT INTO plan_tps (server_uuid, date, tps, players_online, cpu_usage, ram_usage, \
             entities, chunks_loaded, free_disk_space) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            vec![
                uuid(&t.server_uuid),
                Value::Integer(t.date),
                Value::Real(t.tps),
                Value::from(t.players_online),
                Value::Real(t.cpu_usage),
                Value::Integer(t.ram_usage),
                Value::from(t.entities),
                Value::from(t.chunks_loaded),
                Value::Integer(t.free_disk_space),
            ],
        ))?;
        Ok(())
    }
}

/// Records a nickname sighting.
#[derive(Clone, Debug)]
pub struct StoreNickname {
    /// Player uuid.
    pub player: Uuid,
    /// The nickname.
    pub nickname: Nickname,
}

impl Transaction for StoreNickname {
    fn name(&self) -> &str {
        "StoreNickname"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let n = &self.nickname;
        let refreshed = ctx.execute(&Executable::with_params(
            "UPDATE plan_nicknames SET last_used = ? \
             WHERE uuid = ? AND server_uuid = ? AND nickname = ?",
            vec![
                Value::Integer(n.last_used),
                uuid(&self.player),
                uuid(&n.server_uuid),
                text(n.name.as_str()),
            ],
        ))?;
        if !refreshed {
            let _ = ctx.execute(&Executable::with_params(
                "INSERT INTO plan_nicknames (uuid, nickname, server_uuid, last_used) \
                 VALUES (?, ?, ?, ?)",
                vec![
                    uuid(&self.player),
                    text(n.name.as_str()),
                    uuid(&n.server_uuid),
                    Value::Integer(n.last_used),
                ],
            ))?;
        }
        Ok(())
    }
}

/// Records a geolocation sighting.
#[derive(Clone, Debug)]
pub struct StoreGeoInfo {
    /// Player uuid.
    pub player: Uuid,
    /// The location.
    pub geo: GeoInfo,
}

impl Transaction for StoreGeoInfo {
    fn name(&self) -> &str {
        "StoreGeoInfo"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let refreshed = ctx.execute(&Executable::with_params(
            "UPDATE plan_geolocations SET last_used = ? WHERE uuid = ? AND geolocation = ?",
            vec![
                Value::Integer(self.geo.last_used),
                uuid(&self.player),
                text(self.geo.geolocation.as_str()),
            ],
        ))?;
        if !refreshed {
            let _ = ctx.execute(&Executable::with_params(
                "INSERT INTO plan_geolocations (uuid, geolocation, last_used) VALUES (?, ?, ?)",
                vec![
                    uuid(&self.player),
                    text(self.geo.geolocation.as_str()),
                    Value::Integer(self.geo.last_used),
                ],
            ))?;
        }
        Ok(())
    }
}

// ── Extensions ──────────────────────────────────────────────────────────────

/// Stores a plugin-provided value for a player, replacing the previous one.
#[derive(Clone, Debug)]
pub struct StoreExtensionValue {
    /// Player uuid.
    pub player: Uuid,
    /// Server the plugin runs on.
    pub server: Uuid,
    /// Plugin name.
    pub plugin: String,
    /// Provider name within the plugin.
    pub provider: String,
    /// The value.
    pub value: ExtensionData,
    /// Time of the update.
    pub updated: i64,
}

impl StoreExtensionValue {
    fn plugin_id(&self, ctx: &TxContext<'_>) -> Result<i64> {
        let lookup = || {
            Query::single(
                "SELECT id FROM plan_extension_plugins WHERE name = ? AND server_uuid = ?",
                vec![text(self.plugin.as_str()), uuid(&self.server)],
                |row| Ok(row.get::<_, i64>(0)?),
            )
        };
        let refreshed = ctx.execute(&Executable::with_params(
            "UPDATE plan_extension_plugins SET last_updated = ? WHERE name = ? AND server_uuid = ?",
            vec![
                Value::Integer(self.updated),
                text(self.plugin.as_str()),
                uuid(&self.server),
            ],
        ))?;
        if !refreshed {
            let _ = ctx.execute(&Executable::with_params(
                "INSERT INTO plan_extension_plugins (name, last_updated, server_uuid) \
                 VALUES (?, ?, ?)",
                vec![
                    text(self.plugin.as_str()),
                    Value::Integer(self.updated),
                    uuid(&self.server),
                ],
            ))?;
        }
        ctx.query(&lookup())?.ok_or_else(|| {
            StoreError::InvalidData(format!("plugin '{}' could not be read back", self.plugin))
        })
    }
}

impl Transaction for StoreExtensionValue {
    fn name(&self) -> &str {
        "StoreExtensionValue"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let plugin_id = self.plugin_id(ctx)?;
        let (boolean, double, long, string) = match &self.value {
            ExtensionData::Boolean(b) => (Value::from(*b), Value::Null, Value::Null, Value::Null),
            ExtensionData::Double(d) => (Value::Null, Value::Real(*d), Value::Null, Value::Null),
            ExtensionData::Long(l) => (Value::Null, Value::Null, Value::Integer(*l), Value::Null),
            ExtensionData::String(s) => (Value::Null, Value::Null, Value::Null, text(s.as_str())),
        };
        let _ = ctx.execute_many(&[
            Executable::with_params(
                "DELETE FROM plan_extension_user_values \
                 WHERE plugin_id = ? AND uuid = ? AND provider_name = ?",
                vec![
                    Value::Integer(plugin_id),
                    uuid(&self.player),
                    text(self.provider.as_str()),
                ],
            ),
            Executable::with_params(
                "INSERT INTO plan_extension_user_values \
                 (plugin_id, uuid, provider_name, boolean_value, double_value, long_value, \
                  string_value) VALUES (?, ?, ?, ?, ?, ?, ?)",
                vec![
                    Value::Integer(plugin_id),
                    uuid(&self.player),
                    text(self.provider.as_str()),
                    boolean,
                    double,
                    long,
                    string,
                ],
            ),
        ])?;
        Ok(())
    }
}
