//! Queries scoped to one player.

use std::collections::BTreeMap;

use uuid::Uuid;

use super::{KILL_COLUMNS, SESSION_COLUMNS, kill_row, session_row};
use crate::model::{
    BaseUser, ExtensionData, ExtensionValue, FinishedSession, GeoInfo, Nickname, Ping, PlayerKill,
    UserInfo, WorldTimes,
};
use crate::statement::{Query, uuid, uuid_column};

/// The player's `plan_users` row.
pub fn base_user(player: &Uuid) -> Query<Option<BaseUser>> {
    Query::single(
        "SELECT uuid, name, registered, times_kicked FROM plan_users WHERE uuid = ?",
        vec![uuid(player)],
        |row| {
            Ok(BaseUser {
                uuid: uuid_column(row, 0)?,
                name: row.get(1)?,
                registered: row.get(2)?,
                times_kicked: row.get(3)?,
            })
        },
    )
}

/// Per-server facts for every server the player joined.
pub fn user_info(player: &Uuid) -> Query<Vec<UserInfo>> {
    Query::list(
        "SELECT uuid, server_uuid, registered, opped, banned, join_address \
         FROM plan_user_info WHERE uuid = ? ORDER BY registered",
        vec![uuid(player)],
        |row| {
            Ok(UserInfo {
                player_uuid: uuid_column(row, 0)?,
                server_uuid: uuid_column(row, 1)?,
                registered: row.get(2)?,
                opped: row.get(3)?,
                banned: row.get(4)?,
                join_address: row.get(5)?,
            })
        },
    )
}

/// Nicknames, most recently used first.
pub fn nicknames(player: &Uuid) -> Query<Vec<Nickname>> {
    Query::list(
        "SELECT nickname, server_uuid, last_used FROM plan_nicknames \
         WHERE uuid = ? ORDER BY last_used DESC",
        vec![uuid(player)],
        |row| {
            Ok(Nickname {
                name: row.get(0)?,
                server_uuid: uuid_column(row, 1)?,
                last_used: row.get(2)?,
            })
        },
    )
}

/// Geolocations, most recently used first.
pub fn geolocations(player: &Uuid) -> Query<Vec<GeoInfo>> {
    Query::list(
        "SELECT geolocation, last_used FROM plan_geolocations \
         WHERE uuid = ? ORDER BY last_used DESC",
        vec![uuid(player)],
        |row| {
            Ok(GeoInfo {
                geolocation: row.get(0)?,
                last_used: row.get(1)?,
            })
        },
    )
}

/// Ping samples, oldest first.
pub fn ping(player: &Uuid) -> Query<Vec<Ping>> {
    Query::list(
        "SELECT server_uuid, date, min_ping, max_ping, avg_ping FROM plan_ping \
         WHERE uuid = ? ORDER BY date",
        vec![uuid(player)],
        |row| {
            Ok(Ping {
                server_uuid: uuid_column(row, 0)?,
                date: row.get(1)?,
                min: row.get(2)?,
                max: row.get(3)?,
                avg: row.get(4)?,
            })
        },
    )
}

/// Sessions on every server, oldest first, without world times or kills.
pub fn sessions(player: &Uuid) -> Query<Vec<FinishedSession>> {
    Query::list(
        format!(
            "SELECT {SESSION_COLUMNS} FROM plan_sessions s WHERE s.uuid = ? ORDER BY s.session_start"
        ),
        vec![uuid(player)],
        session_row,
    )
}

/// World times of the player's sessions keyed by session id.
pub fn world_times(player: &Uuid) -> Query<BTreeMap<i64, WorldTimes>> {
    super::world_times_by_session("wt.uuid = ?", vec![uuid(player)])
}

/// Player kills the player made.
pub fn kills(player: &Uuid) -> Query<Vec<PlayerKill>> {
    Query::list(
        format!("SELECT {KILL_COLUMNS} FROM plan_kills k WHERE k.killer_uuid = ? ORDER BY k.date"),
        vec![uuid(player)],
        kill_row,
    )
}

/// Times the player was killed by another player.
pub fn deaths(player: &Uuid) -> Query<Vec<PlayerKill>> {
    Query::list(
        format!("SELECT {KILL_COLUMNS} FROM plan_kills k WHERE k.victim_uuid = ? ORDER BY k.date"),
        vec![uuid(player)],
        kill_row,
    )
}

/// Plugin-provided values for the player.
pub fn extension_values(player: &Uuid) -> Query<Vec<ExtensionValue>> {
    Query::list(
        "SELECT p.name, p.server_uuid, v.provider_name, \
         v.boolean_value, v.double_value, v.long_value, v.string_value \
         FROM plan_extension_user_values v \
         JOIN plan_extension_plugins p ON p.id = v.plugin_id \
         WHERE v.uuid = ? ORDER BY p.name, v.provider_name",
        vec![uuid(player)],
        |row| {
            let boolean: Option<bool> = row.get(3)?;
            let double: Option<f64> = row.get(4)?;
            let long: Option<i64> = row.get(5)?;
            let string: Option<String> = row.get(6)?;
            let value = match (boolean, double, long, string) {
                (Some(b), ..) => ExtensionData::Boolean(b),
                (_, Some(d), ..) => ExtensionData::Double(d),
                (_, _, Some(l), _) => ExtensionData::Long(l),
                (_, _, _, s) => ExtensionData::String(s.unwrap_or_default()),
            };
            Ok(ExtensionValue {
                plugin: row.get(0)?,
                server_uuid: uuid_column(row, 1)?,
                provider: row.get(2)?,
                value,
            })
        },
    )
}
