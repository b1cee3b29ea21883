//! Queries scoped to one server, plus the server list.

use std::collections::BTreeMap;

use rusqlite::Row;
use rusqlite::types::Value;
use uuid::Uuid;

use super::{KILL_COLUMNS, SESSION_COLUMNS, kill_row, session_row};
use crate::errors::Result;
use crate::model::{FinishedSession, PlayerKill, Server, TpsSample, WorldTimes};
use crate::statement::{Query, uuid, uuid_column};

const SERVER_COLUMNS: &str = "id, uuid, name, web_address, is_installed, is_proxy, max_players";

fn server_row(row: &Row<'_>) -> Result<Server> {
    Ok(Server {
        id: row.get(0)?,
        uuid: uuid_column(row, 1)?,
        name: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
        web_address: row.get(3)?,
        is_installed: row.get(4)?,
        is_proxy: row.get(5)?,
        max_players: row.get(6)?,
    })
}

/// Every registered server by row id.
pub fn all_servers() -> Query<Vec<Server>> {
    Query::list(
        format!("SELECT {SERVER_COLUMNS} FROM plan_servers ORDER BY id"),
        vec![],
        server_row,
    )
}

/// One server.
pub fn server(server: &Uuid) -> Query<Option<Server>> {
    Query::single(
        format!("SELECT {SERVER_COLUMNS} FROM plan_servers WHERE uuid = ?"),
        vec![uuid(server)],
        server_row,
    )
}

/// TPS samples taken at or after `since`, oldest first.
pub fn tps_since(server: &Uuid, since: i64) -> Query<Vec<TpsSample>> {
    Query::list(
        "SELECT server_uuid, date, tps, players_online, cpu_usage, ram_usage, entities, \
         chunks_loaded, free_disk_space FROM plan_tps \
         WHERE server_uuid = ? AND date >= ? ORDER BY date",
        vec![uuid(server), Value::Integer(since)],
        |row| {
            Ok(TpsSample {
                server_uuid: uuid_column(row, 0)?,
                date: row.get(1)?,
                tps: row.get(2)?,
                players_online: row.get(3)?,
                cpu_usage: row.get(4)?,
                ram_usage: row.get(5)?,
                entities: row.get(6)?,
                chunks_loaded: row.get(7)?,
                free_disk_space: row.get(8)?,
            })
        },
    )
}

/// Sessions on the server, oldest first, without world times or kills.
pub fn sessions(server: &Uuid) -> Query<Vec<FinishedSession>> {
    Query::list(
        format!(
            "SELECT {SESSION_COLUMNS} FROM plan_sessions s \
             WHERE s.server_uuid = ? ORDER BY s.session_start"
        ),
        vec![uuid(server)],
        session_row,
    )
}

/// World times of the server's sessions keyed by session id.
pub fn world_times(server: &Uuid) -> Query<BTreeMap<i64, WorldTimes>> {
    super::world_times_by_session("wt.server_uuid = ?", vec![uuid(server)])
}

/// Player kills on the server.
pub fn kills(server: &Uuid) -> Query<Vec<PlayerKill>> {
    Query::list(
        format!("SELECT {KILL_COLUMNS} FROM plan_kills k WHERE k.server_uuid = ? ORDER BY k.date"),
        vec![uuid(server)],
        kill_row,
    )
}

/// Players who ever joined the server.
pub fn registered_players(server: &Uuid) -> Query<i64> {
    Query::count(
        "SELECT COUNT(DISTINCT uuid) FROM plan_user_info WHERE server_uuid = ?",
        vec![uuid(server)],
    )
}
