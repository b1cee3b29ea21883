use crate::errors::Result;
use crate::transaction::TxContext;

use super::Patch;

/// Drops a table the current schema no longer uses.
#[derive(Clone, Debug)]
pub struct TableRemovalPatch {
    name: &'static str,
    table: &'static str,
}

impl TableRemovalPatch {
    /// Patch named `name` removing `table`.
    pub const fn new(name: &'static str, table: &'static str) -> Self {
        Self { name, table }
    }
}

impl Patch for TableRemovalPatch {
    fn name(&self) -> &'static str {
        self.name
    }

    fn has_been_applied(&self, ctx: &TxContext<'_>) -> Result<bool> {
        Ok(!ctx.has_table(self.table)?)
    }

    fn apply(&self, ctx: &TxContext<'_>) -> Result<()> {
        ctx.drop_table_if_exists(self.table)
    }
}
