//! Retention sweeps over sampled data.
//!
//! Each table is swept with an optimistic delete: count the rows below the
//! threshold, delete them, and compare. A mismatch means another writer
//! touched the same rows in between; the sweep then fails with
//! [`StoreError::ConcurrentModification`]. Because the sweep tolerates lost
//! races, the executor rolls it back with a quiet skip and the next scheduled
//! sweep picks the rows up.

use gamestat_settings::RetentionSettings;
use rusqlite::types::Value;
use serde::Serialize;
use tracing::info;

use crate::errors::{Result, StoreError};
use crate::schema::tables::{PING, TPS};
use crate::statement::{Executable, Query};
use crate::transaction::{Transaction, TxContext};

/// One day in milliseconds.
pub const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Rows removed by one sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SweepCounts {
    /// TPS samples removed.
    pub tps: usize,
    /// Ping samples removed.
    pub ping: usize,
}

/// Removes TPS and ping samples older than their thresholds.
#[derive(Clone, Debug)]
pub struct RemoveOldSampledData {
    tps_before: i64,
    ping_before: i64,
    removed: Option<SweepCounts>,
}

impl RemoveOldSampledData {
    /// Sweep removing TPS samples dated before `tps_before` and ping samples
    /// dated before `ping_before` (epoch milliseconds).
    pub fn new(tps_before: i64, ping_before: i64) -> Self {
        Self {
            tps_before,
            ping_before,
            removed: None,
        }
    }

    /// Thresholds `now` minus the configured retention windows.
    pub fn from_retention(retention: &RetentionSettings, now: i64) -> Self {
        Self::new(
            now - i64::from(retention.tps_days) * DAY_MS,
            now - i64::from(retention.ping_days) * DAY_MS,
        )
    }

    /// TPS threshold.
    pub fn tps_before(&self) -> i64 {
        self.tps_before
    }

    /// Ping threshold.
    pub fn ping_before(&self) -> i64 {
        self.ping_before
    }

    /// Counts from the last run whose deletes all matched their counts.
    pub fn removed(&self) -> Option<SweepCounts> {
        self.removed
    }
}

fn sweep(ctx: &TxContext<'_>, table: &'static str, before: i64) -> Result<usize> {
    let expected = ctx.query(&Query::count(
        format!("SELECT COUNT(*) FROM {table} WHERE date < ?"),
        vec![Value::Integer(before)],
    ))?;
    let expected = usize::try_from(expected).unwrap_or(0);
    let actual = ctx.execute_count(&Executable::with_params(
        format!("DELETE FROM {table} WHERE date < ?"),
        vec![Value::Integer(before)],
    ))?;
    if actual != expected {
        return Err(StoreError::ConcurrentModification {
            table,
            expected,
            actual,
        });
    }
    Ok(actual)
}

impl Transaction for RemoveOldSampledData {
    fn name(&self) -> &str {
        "RemoveOldSampledData"
    }

    fn tolerates_concurrent_modification(&self) -> bool {
        true
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        self.removed = None;
        let counts = SweepCounts {
            tps: sweep(ctx, TPS, self.tps_before)?,
            ping: sweep(ctx, PING, self.ping_before)?,
        };
        info!(tps = counts.tps, ping = counts.ping, "removed old samples");
        self.removed = Some(counts);
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_retention_days() {
        let retention = RetentionSettings {
            tps_days: 2,
            ping_days: 1,
        };
        let sweep = RemoveOldSampledData::from_retention(&retention, 10 * DAY_MS);
        assert_eq!(sweep.tps_before(), 8 * DAY_MS);
        assert_eq!(sweep.ping_before(), 9 * DAY_MS);
        assert_eq!(sweep.removed(), None);
    }

    #[test]
    fn sweep_is_the_race_tolerant_transaction() {
        let sweep = RemoveOldSampledData::new(0, 0);
        assert!(sweep.tolerates_concurrent_modification());
        assert_eq!(sweep.kind(), crate::transaction::TransactionKind::BestEffort);
    }
}
