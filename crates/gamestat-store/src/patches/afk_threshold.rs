use crate::errors::Result;
use crate::schema::tables::SESSIONS;
use crate::statement::{Executable, Query};
use crate::transaction::{TransactionKind, TxContext};

use super::Patch;

const BAD_AFK: &str = "afk_time < 0 OR afk_time > session_end - session_start";

/// Resets AFK times that are negative or longer than their session.
///
/// Such values were written by a capture bug and would make active playtime
/// negative. Best-effort: the data stays usable if the reset fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct BadAfkThresholdValuePatch;

impl Patch for BadAfkThresholdValuePatch {
    fn name(&self) -> &'static str {
        "BadAfkThresholdValuePatch"
    }

    fn kind(&self) -> TransactionKind {
        TransactionKind::BestEffort
    }

    fn has_been_applied(&self, ctx: &TxContext<'_>) -> Result<bool> {
        // Without the column there is nothing to reset.
        if !ctx.has_table(SESSIONS)? || !ctx.has_column(SESSIONS, "afk_time")? {
            return Ok(true);
        }
        let bad = ctx.query(&Query::exists(
            format!("SELECT 1 FROM {SESSIONS} WHERE {BAD_AFK}"),
            vec![],
        ))?;
        Ok(!bad)
    }

    fn apply(&self, ctx: &TxContext<'_>) -> Result<()> {
        let _ = ctx.execute_count(&Executable::new(format!(
            "UPDATE {SESSIONS} SET afk_time = 0 WHERE {BAD_AFK}"
        )))?;
        Ok(())
    }
}
