//! Ordered schema patches.
//!
//! A [`Patch`] knows how to tell whether it already ran and how to move the
//! schema into its shape. [`registry`] lists every patch in the order they
//! must run; later patches assume earlier ones have been applied. Each patch
//! runs in its own [`PatchTransaction`], which skips patches that report
//! themselves applied and re-checks after `apply` so a patch that ran but
//! left the wrong shape fails instead of passing silently.

mod add_column;
mod afk_threshold;
mod natural_key;
mod table_removal;

pub use add_column::AddColumnPatch;
pub use afk_threshold::BadAfkThresholdValuePatch;
pub use natural_key::{NaturalKeyPatch, Resolve};
pub use table_removal::TableRemovalPatch;

use serde::Serialize;
use tracing::{debug, info};

use crate::errors::{Result, StoreError};
use crate::schema::tables;
use crate::transaction::{Transaction, TransactionKind, TxContext};

/// One idempotent schema or data migration step.
pub trait Patch: Send + Sync {
    /// Stable name shown to operators.
    fn name(&self) -> &'static str;

    /// Whether a failure blocks startup. Critical unless overridden.
    fn kind(&self) -> TransactionKind {
        TransactionKind::Critical
    }

    /// Side-effect free probe; safe to call any number of times.
    fn has_been_applied(&self, ctx: &TxContext<'_>) -> Result<bool>;

    /// Move the schema into the patched shape.
    fn apply(&self, ctx: &TxContext<'_>) -> Result<()>;
}

/// What a [`PatchTransaction`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatchOutcome {
    /// The probe reported the patch as already applied.
    AlreadyApplied,
    /// `apply` ran and the probe confirmed the new shape.
    Applied,
}

/// Runs one patch inside a transaction of the patch's kind.
pub struct PatchTransaction<'p> {
    patch: &'p dyn Patch,
    outcome: Option<PatchOutcome>,
}

impl<'p> PatchTransaction<'p> {
    /// Wrap `patch`.
    pub fn new(patch: &'p dyn Patch) -> Self {
        Self {
            patch,
            outcome: None,
        }
    }

    /// Outcome of the last run, if it got that far.
    pub fn outcome(&self) -> Option<PatchOutcome> {
        self.outcome
    }
}

impl Transaction for PatchTransaction<'_> {
    fn name(&self) -> &str {
        self.patch.name()
    }

    fn kind(&self) -> TransactionKind {
        self.patch.kind()
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        let name = self.patch.name();
        if self.patch.has_been_applied(ctx)? {
            debug!(patch = name, "already applied");
            self.outcome = Some(PatchOutcome::AlreadyApplied);
            return Ok(());
        }

        info!(patch = name, "applying patch");
        self.patch.apply(ctx)?;
        if !self.patch.has_been_applied(ctx)? {
            return Err(StoreError::PatchFailed {
                patch: name,
                message: "schema is still not in the patched shape after apply".into(),
            });
        }
        self.outcome = Some(PatchOutcome::Applied);
        Ok(())
    }
}

/// Applied state of one patch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchStatus {
    /// Patch name.
    pub name: &'static str,
    /// Whether `has_been_applied` reports true.
    pub applied: bool,
}

/// Every patch, in application order.
pub fn registry() -> Vec<Box<dyn Patch>> {
    vec![
        Box::new(TableRemovalPatch::new("VersionTableRemovalPatch", "plan_version")),
        Box::new(AddColumnPatch::new(
            "SessionAfkTimePatch",
            tables::SESSIONS,
            "afk_time",
            "BIGINT NOT NULL DEFAULT 0",
        )),
        Box::new(AddColumnPatch::new(
            "GeoInfoLastUsedPatch",
            tables::GEOLOCATIONS,
            "last_used",
            "BIGINT NOT NULL DEFAULT 0",
        )),
        Box::new(AddColumnPatch::new(
            "NicknameLastSeenPatch",
            tables::NICKNAMES,
            "last_used",
            "BIGINT NOT NULL DEFAULT 0",
        )),
        Box::new(AddColumnPatch::new(
            "DiskUsagePatch",
            tables::TPS,
            "free_disk_space",
            "BIGINT NOT NULL DEFAULT -1",
        )),
        Box::new(AddColumnPatch::new(
            "UserInfoJoinAddressPatch",
            tables::USER_INFO,
            "join_address",
            "VARCHAR(255)",
        )),
        Box::new(natural_key::sessions()),
        Box::new(natural_key::world_times()),
        Box::new(natural_key::kills()),
        Box::new(natural_key::ping()),
        Box::new(natural_key::user_info()),
        Box::new(natural_key::nicknames()),
        Box::new(natural_key::geolocations()),
        Box::new(TableRemovalPatch::new("TransferTableRemovalPatch", "plan_transfer")),
        Box::new(BadAfkThresholdValuePatch),
    ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
