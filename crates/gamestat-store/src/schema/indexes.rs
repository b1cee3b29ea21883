//! Lookup indexes, created after all patches have run.

use super::tables::{KILLS, PING, SESSIONS, TPS, USER_INFO, WORLD_TIMES};

/// One index declaration.
#[derive(Clone, Copy, Debug)]
pub struct IndexDef {
    /// Indexed table.
    pub table: &'static str,
    /// Index name, unique across the database.
    pub name: &'static str,
    /// Indexed columns in order.
    pub columns: &'static [&'static str],
}

/// Every index of the current schema.
pub const INDEXES: &[IndexDef] = &[
    IndexDef {
        table: SESSIONS,
        name: "plan_sessions_uuid_index",
        columns: &["uuid"],
    },
    IndexDef {
        table: SESSIONS,
        name: "plan_sessions_server_index",
        columns: &["server_uuid", "session_start"],
    },
    IndexDef {
        table: WORLD_TIMES,
        name: "plan_world_times_session_index",
        columns: &["session_id"],
    },
    IndexDef {
        table: KILLS,
        name: "plan_kills_killer_index",
        columns: &["killer_uuid"],
    },
    IndexDef {
        table: KILLS,
        name: "plan_kills_victim_index",
        columns: &["victim_uuid"],
    },
    IndexDef {
        table: PING,
        name: "plan_ping_date_index",
        columns: &["date"],
    },
    IndexDef {
        table: TPS,
        name: "plan_tps_server_date_index",
        columns: &["server_uuid", "date"],
    },
    IndexDef {
        table: USER_INFO,
        name: "plan_user_info_uuid_index",
        columns: &["uuid"],
    },
];
