//! Current table shapes and the startup transactions that create them.

pub mod indexes;
pub mod tables;

use crate::errors::Result;
use crate::transaction::{Transaction, TransactionKind, TxContext};

/// Creates every table that does not exist yet. Critical.
///
/// Tables that exist in an older shape are left alone for the patches.
#[derive(Debug, Default)]
pub struct CreateTablesTransaction;

impl Transaction for CreateTablesTransaction {
    fn name(&self) -> &str {
        "CreateTablesTransaction"
    }

    fn kind(&self) -> TransactionKind {
        TransactionKind::Critical
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        for statement in tables::create_statements(ctx.dialect()) {
            ctx.execute_ddl(&statement)?;
        }
        Ok(())
    }
}

/// Creates the lookup indexes. Best-effort: a missing index only costs speed.
#[derive(Debug, Default)]
pub struct CreateIndexesTransaction;

impl Transaction for CreateIndexesTransaction {
    fn name(&self) -> &str {
        "CreateIndexesTransaction"
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        for index in indexes::INDEXES {
            ctx.create_index_if_missing(index.table, index.name, index.columns)?;
        }
        Ok(())
    }
}
