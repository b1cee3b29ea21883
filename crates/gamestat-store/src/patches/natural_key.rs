//! Surrogate-id to natural-key table rewrites.
//!
//! Older schemas referenced players and servers through their integer row
//! ids (`user_id`, `server_id`, ...). The current schema stores the uuids
//! directly. Changing a column's meaning is done as a table rewrite:
//!
//! 1. rename the live table to `temp_<table>`
//! 2. create the table fresh in the current shape
//! 3. `INSERT ... SELECT` every row across, resolving each surrogate id to a
//!    uuid through a correlated subquery; row ids are preserved
//! 4. drop `temp_<table>`
//!
//! The temporary table's presence is the only record of progress. While it
//! exists the patch counts as not applied, so an interrupted rewrite is
//! retried from whatever step it reached on the next startup.

use tracing::{debug, info, warn};

use crate::dialect::Dialect;
use crate::errors::{Result, StoreError};
use crate::schema::tables;
use crate::statement::{Executable, Query};
use crate::transaction::TxContext;

use super::Patch;

/// One surrogate column replaced by a natural key.
#[derive(Clone, Copy, Debug)]
pub struct Resolve {
    /// Column in the current shape.
    pub column: &'static str,
    /// Surrogate column in the legacy shape.
    pub legacy: &'static str,
    /// Table whose `id` the surrogate refers to and whose `uuid` replaces it.
    pub lookup: &'static str,
}

const fn user(column: &'static str, legacy: &'static str) -> Resolve {
    Resolve {
        column,
        legacy,
        lookup: tables::USERS,
    }
}

const fn server() -> Resolve {
    Resolve {
        column: "server_uuid",
        legacy: "server_id",
        lookup: tables::SERVERS,
    }
}

/// Rewrites a table from surrogate ids to natural keys.
#[derive(Clone, Debug)]
pub struct NaturalKeyPatch {
    name: &'static str,
    table: &'static str,
    resolved: &'static [Resolve],
    copied: &'static [&'static str],
    create: fn(&dyn Dialect) -> String,
}

impl NaturalKeyPatch {
    /// `copied` columns move across unchanged; `resolved` columns are looked
    /// up. `create` builds the current shape of `table`.
    pub const fn new(
        name: &'static str,
        table: &'static str,
        resolved: &'static [Resolve],
        copied: &'static [&'static str],
        create: fn(&dyn Dialect) -> String,
    ) -> Self {
        Self {
            name,
            table,
            resolved,
            copied,
            create,
        }
    }

    /// Table being rewritten.
    pub fn table(&self) -> &'static str {
        self.table
    }

    /// Name of the temporary table holding the legacy rows mid-rewrite.
    pub fn temporary_table(&self) -> String {
        format!("temp_{}", self.table)
    }

    /// Step 1: park the legacy table under its temporary name.
    pub fn move_to_temporary(&self, ctx: &TxContext<'_>) -> Result<()> {
        ctx.rename_table(self.table, &self.temporary_table())
    }

    /// Step 2: create the table in its current shape.
    pub fn recreate(&self, ctx: &TxContext<'_>) -> Result<()> {
        ctx.execute_ddl(&(self.create)(ctx.dialect()))
    }

    /// Step 3: copy rows out of the temporary table. Returns the number copied.
    ///
    /// Rows whose surrogate ids no longer resolve cannot be expressed in the
    /// new shape; they are left behind and counted in a warning.
    pub fn copy_rows(&self, ctx: &TxContext<'_>) -> Result<usize> {
        let temp = self.temporary_table();
        let total = ctx.query(&Query::count(format!("SELECT COUNT(*) FROM {temp}"), vec![]))?;
        let copied = ctx.execute_count(&Executable::new(self.copy_statement()))?;

        let dropped = usize::try_from(total).unwrap_or(0).saturating_sub(copied);
        if dropped > 0 {
            warn!(
                patch = self.name,
                table = self.table,
                dropped,
                "rows referencing unknown players or servers were not copied"
            );
        }
        Ok(copied)
    }

    /// Step 4: discard the legacy rows.
    pub fn drop_temporary(&self, ctx: &TxContext<'_>) -> Result<()> {
        ctx.drop_table_if_exists(&self.temporary_table())
    }

    fn copy_statement(&self) -> String {
        let temp = self.temporary_table();
        let targets = self
            .copied
            .iter()
            .copied()
            .chain(self.resolved.iter().map(|r| r.column))
            .collect::<Vec<_>>()
            .join(", ");
        let sources = self
            .copied
            .iter()
            .map(|column| format!("t.{column}"))
            .chain(self.resolved.iter().map(|r| {
                format!(
                    "(SELECT l.uuid FROM {} l WHERE l.id = t.{})",
                    r.lookup, r.legacy
                )
            }))
            .collect::<Vec<_>>()
            .join(", ");
        let resolvable = self
            .resolved
            .iter()
            .map(|r| format!("EXISTS (SELECT 1 FROM {} l WHERE l.id = t.{})", r.lookup, r.legacy))
            .collect::<Vec<_>>()
            .join(" AND ");
        format!(
            "INSERT INTO {table} ({targets}) SELECT {sources} FROM {temp} t WHERE {resolvable}",
            table = self.table
        )
    }
}

impl Patch for NaturalKeyPatch {
    fn name(&self) -> &'static str {
        self.name
    }

    fn has_been_applied(&self, ctx: &TxContext<'_>) -> Result<bool> {
        for resolve in self.resolved {
            if !ctx.has_column(self.table, resolve.column)?
                || ctx.has_column(self.table, resolve.legacy)?
            {
                return Ok(false);
            }
        }
        Ok(!ctx.has_table(&self.temporary_table())?)
    }

    fn apply(&self, ctx: &TxContext<'_>) -> Result<()> {
        if self.has_been_applied(ctx)? {
            debug!(patch = self.name, "natural keys already in place");
            return Ok(());
        }

        let temp = self.temporary_table();
        if ctx.has_table(&temp)? {
            if ctx.has_table(self.table)? {
                let legacy_live = self
                    .resolved
                    .iter()
                    .map(|r| ctx.has_column(self.table, r.legacy))
                    .collect::<Result<Vec<_>>>()?
                    .into_iter()
                    .any(|present| present);
                if legacy_live {
                    return Err(StoreError::PatchFailed {
                        patch: self.name,
                        message: format!(
                            "both {temp} and a legacy-shaped {} exist; inspect them and drop \
                             the stale one before restarting",
                            self.table
                        ),
                    });
                }
                // Left by an attempt that stopped after recreating; its copy
                // may be partial, so start the copy over.
                info!(patch = self.name, table = self.table, "discarding partial rewrite");
                ctx.drop_table_if_exists(self.table)?;
            } else {
                info!(patch = self.name, table = %temp, "resuming interrupted rewrite");
            }
        } else {
            self.move_to_temporary(ctx)?;
        }

        self.recreate(ctx)?;
        let copied = self.copy_rows(ctx)?;
        self.drop_temporary(ctx)?;
        info!(patch = self.name, table = self.table, copied, "rewrote table with natural keys");
        Ok(())
    }
}

// ── Registered rewrites ─────────────────────────────────────────────────────

const PLAYER_AND_SERVER: &[Resolve] = &[user("uuid", "user_id"), server()];
const KILLER_VICTIM_AND_SERVER: &[Resolve] = &[
    user("killer_uuid", "killer_id"),
    user("victim_uuid", "victim_id"),
    server(),
];
const PLAYER: &[Resolve] = &[user("uuid", "user_id")];

/// `plan_sessions`.
pub fn sessions() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "SessionsNaturalKeyPatch",
        tables::SESSIONS,
        PLAYER_AND_SERVER,
        &["id", "session_start", "session_end", "mob_kills", "deaths", "afk_time"],
        tables::sessions,
    )
}

/// `plan_world_times`.
pub fn world_times() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "WorldTimesNaturalKeyPatch",
        tables::WORLD_TIMES,
        PLAYER_AND_SERVER,
        &[
            "id",
            "world_id",
            "session_id",
            "survival_time",
            "creative_time",
            "adventure_time",
            "spectator_time",
        ],
        tables::world_times,
    )
}

/// `plan_kills`.
pub fn kills() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "KillsNaturalKeyPatch",
        tables::KILLS,
        KILLER_VICTIM_AND_SERVER,
        &["id", "weapon", "date", "session_id"],
        tables::kills,
    )
}

/// `plan_ping`.
pub fn ping() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "PingNaturalKeyPatch",
        tables::PING,
        PLAYER_AND_SERVER,
        &["id", "date", "max_ping", "min_ping", "avg_ping"],
        tables::ping,
    )
}

/// `plan_user_info`.
pub fn user_info() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "UserInfoNaturalKeyPatch",
        tables::USER_INFO,
        PLAYER_AND_SERVER,
        &["id", "registered", "opped", "banned", "join_address"],
        tables::user_info,
    )
}

/// `plan_nicknames`.
pub fn nicknames() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "NicknamesNaturalKeyPatch",
        tables::NICKNAMES,
        PLAYER_AND_SERVER,
        &["id", "nickname", "last_used"],
        tables::nicknames,
    )
}

/// `plan_geolocations`.
pub fn geolocations() -> NaturalKeyPatch {
    NaturalKeyPatch::new(
        "GeoInfoNaturalKeyPatch",
        tables::GEOLOCATIONS,
        PLAYER,
        &["id", "geolocation", "last_used"],
        tables::geolocations,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
