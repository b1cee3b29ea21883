use crate::errors::Result;
use crate::transaction::TxContext;

use super::Patch;

/// Adds one column to an existing table.
#[derive(Clone, Debug)]
pub struct AddColumnPatch {
    name: &'static str,
    table: &'static str,
    column: &'static str,
    definition: &'static str,
}

impl AddColumnPatch {
    /// `definition` is the column type and constraints, without the name.
    pub const fn new(
        name: &'static str,
        table: &'static str,
        column: &'static str,
        definition: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            column,
            definition,
        }
    }
}

impl Patch for AddColumnPatch {
    fn name(&self) -> &'static str {
        self.name
    }

    fn has_been_applied(&self, ctx: &TxContext<'_>) -> Result<bool> {
        ctx.has_column(self.table, self.column)
    }

    fn apply(&self, ctx: &TxContext<'_>) -> Result<()> {
        ctx.add_column(self.table, &format!("{} {}", self.column, self.definition))
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::dialect::SqliteDialect;

    #[test]
    fn adds_missing_column_once() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE plan_tps (date BIGINT); INSERT INTO plan_tps VALUES (1);")
            .unwrap();
        let ctx = TxContext::new(&conn, &SqliteDialect);
        let patch = AddColumnPatch::new(
            "DiskUsagePatch",
            "plan_tps",
            "free_disk_space",
            "BIGINT NOT NULL DEFAULT -1",
        );

        assert!(!patch.has_been_applied(&ctx).unwrap());
        patch.apply(&ctx).unwrap();
        assert!(patch.has_been_applied(&ctx).unwrap());

        let value: i64 = conn
            .query_row("SELECT free_disk_space FROM plan_tps", [], |r| r.get(0))
            .unwrap();
        assert_eq!(value, -1);
    }
}
