//! Read queries.
//!
//! Every function builds a [`Query`](crate::statement::Query) without touching
//! the database; run it with [`Database::query`](crate::Database::query).

pub mod player;
pub mod server;

use std::collections::BTreeMap;

use rusqlite::Row;
use rusqlite::types::Value;

use crate::errors::Result;
use crate::model::{FinishedSession, GmTimes, PlayerKill, WorldTimes};
use crate::statement::{Query, uuid_column};

const SESSION_COLUMNS: &str =
    "s.id, s.uuid, s.server_uuid, s.session_start, s.session_end, s.mob_kills, s.deaths, s.afk_time";

const KILL_COLUMNS: &str =
    "k.killer_uuid, k.victim_uuid, k.server_uuid, k.weapon, k.date, k.session_id";

fn session_row(row: &Row<'_>) -> Result<FinishedSession> {
    Ok(FinishedSession {
        id: Some(row.get(0)?),
        player_uuid: uuid_column(row, 1)?,
        server_uuid: uuid_column(row, 2)?,
        start: row.get(3)?,
        end: row.get(4)?,
        mob_kills: row.get(5)?,
        deaths: row.get(6)?,
        afk_time: row.get(7)?,
        world_times: WorldTimes::new(),
        player_kills: Vec::new(),
    })
}

fn kill_row(row: &Row<'_>) -> Result<PlayerKill> {
    Ok(PlayerKill {
        killer: uuid_column(row, 0)?,
        victim: uuid_column(row, 1)?,
        server_uuid: uuid_column(row, 2)?,
        weapon: row.get(3)?,
        date: row.get(4)?,
        session_id: row.get(5)?,
    })
}

/// World times grouped by session id, filtered by `filter` on `wt`.
fn world_times_by_session(
    filter: &str,
    params: Vec<Value>,
) -> Query<BTreeMap<i64, WorldTimes>> {
    Query::new(
        format!(
            "SELECT wt.session_id, w.world_name, wt.survival_time, wt.creative_time, \
             wt.adventure_time, wt.spectator_time \
             FROM plan_world_times wt JOIN plan_worlds w ON w.id = wt.world_id \
             WHERE {filter}"
        ),
        params,
        |rows, _| {
            let mut by_session: BTreeMap<i64, WorldTimes> = BTreeMap::new();
            while let Some(row) = rows.next()? {
                let session_id: i64 = row.get(0)?;
                let world: String = row.get(1)?;
                let times = GmTimes {
                    survival: row.get(2)?,
                    creative: row.get(3)?,
                    adventure: row.get(4)?,
                    spectator: row.get(5)?,
                };
                by_session.entry(session_id).or_default().add(world, &times);
            }
            Ok(by_session)
        },
    )
}
