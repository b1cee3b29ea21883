//! Transaction executor.
//!
//! A [`Transaction`] is a named unit of work run against one borrowed
//! connection. [`run`] commits when `perform_operations` returns `Ok` and
//! rolls back otherwise; the transaction's [`TransactionKind`] then decides
//! whether a failure is fatal or only logged.

use rusqlite::Connection;
use tracing::{debug, error};

use crate::dialect::Dialect;
use crate::errors::{Result, StoreError};
use crate::sqlite::connection::ConnectionPool;
use crate::statement::{Executable, Query};

/// How a failure of the transaction is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionKind {
    /// Failure makes the database unusable and is returned as [`StoreError::Fatal`].
    Critical,
    /// Failure is logged and reported as `Ok(false)`.
    BestEffort,
}

/// A named unit of work.
pub trait Transaction {
    /// Name used in logs and fatal errors.
    fn name(&self) -> &str;

    /// Failure handling; best-effort unless overridden.
    fn kind(&self) -> TransactionKind {
        TransactionKind::BestEffort
    }

    /// Whether losing a race with another writer is an expected outcome.
    ///
    /// Only then is a best-effort failure from
    /// [`StoreError::is_concurrent_modification`] skipped quietly; any other
    /// transaction logs it as an error.
    fn tolerates_concurrent_modification(&self) -> bool {
        false
    }

    /// Run every statement of the unit. Returning `Err` rolls back.
    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()>;
}

// ─────────────────────────────────────────────────────────────────────────────
// TxContext
// ─────────────────────────────────────────────────────────────────────────────

/// Statement surface available inside a running transaction.
///
/// Reads go through the transaction's own connection, so a patch sees the
/// tables it just created or renamed.
pub struct TxContext<'a> {
    conn: &'a Connection,
    dialect: &'a dyn Dialect,
}

impl<'a> TxContext<'a> {
    /// Wrap a connection that already has a transaction open.
    pub fn new(conn: &'a Connection, dialect: &'a dyn Dialect) -> Self {
        Self { conn, dialect }
    }

    /// Dialect the database speaks.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect
    }

    /// Run a write; `true` when at least one row was affected.
    pub fn execute(&self, statement: &Executable) -> Result<bool> {
        Ok(self.execute_count(statement)? > 0)
    }

    /// Run a write and return the affected row count.
    pub fn execute_count(&self, statement: &Executable) -> Result<usize> {
        statement.run(self.conn)
    }

    /// Run several writes in order; returns the total affected row count.
    pub fn execute_many(&self, statements: &[Executable]) -> Result<usize> {
        statements
            .iter()
            .try_fold(0, |total, statement| Ok(total + statement.run(self.conn)?))
    }

    /// Run schema DDL.
    pub fn execute_ddl(&self, sql: &str) -> Result<()> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    /// Run a read on the transaction's connection.
    pub fn query<T>(&self, query: &Query<T>) -> Result<T> {
        query.run(self.conn)
    }

    /// Whether `table` exists.
    pub fn has_table(&self, table: &str) -> Result<bool> {
        self.query(&self.dialect.table_exists_query(table))
    }

    /// Whether `table.column` exists.
    pub fn has_column(&self, table: &str, column: &str) -> Result<bool> {
        self.query(&self.dialect.column_exists_query(table, column))
    }

    /// Whether index `index` exists on `table`.
    pub fn has_index(&self, table: &str, index: &str) -> Result<bool> {
        self.query(&self.dialect.index_exists_query(table, index))
    }

    /// Create an index unless it already exists.
    ///
    /// Dialects without conditional index DDL probe first.
    pub fn create_index_if_missing(
        &self,
        table: &str,
        index: &str,
        columns: &[&str],
    ) -> Result<()> {
        if !self.dialect.supports_conditional_index_ddl() && self.has_index(table, index)? {
            debug!(table, index, "index already present");
            return Ok(());
        }
        self.execute_ddl(&self.dialect.create_index_statement(table, index, columns))
    }

    /// Rename `from` to `to`.
    pub fn rename_table(&self, from: &str, to: &str) -> Result<()> {
        self.execute_ddl(&self.dialect.rename_table_statement(from, to))
    }

    /// Drop `table` when present.
    pub fn drop_table_if_exists(&self, table: &str) -> Result<()> {
        self.execute_ddl(&self.dialect.drop_table_statement(table))
    }

    /// Add a column described by `column_definition` (`name TYPE ...`).
    pub fn add_column(&self, table: &str, column_definition: &str) -> Result<()> {
        self.execute_ddl(&self.dialect.add_column_statement(table, column_definition))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Work
// ─────────────────────────────────────────────────────────────────────────────

/// Closure adapter for one-off transactions.
pub struct Work<F> {
    name: String,
    kind: TransactionKind,
    tolerates_races: bool,
    operations: F,
}

impl<F> Work<F>
where
    F: FnMut(&TxContext<'_>) -> Result<()>,
{
    /// Best-effort unit of work.
    pub fn best_effort(name: impl Into<String>, operations: F) -> Self {
        Self {
            name: name.into(),
            kind: TransactionKind::BestEffort,
            tolerates_races: false,
            operations,
        }
    }

    /// Critical unit of work.
    pub fn critical(name: impl Into<String>, operations: F) -> Self {
        Self {
            name: name.into(),
            kind: TransactionKind::Critical,
            tolerates_races: false,
            operations,
        }
    }

    /// Treat a lost race as an expected skip.
    #[must_use]
    pub fn tolerating_concurrent_modification(mut self) -> Self {
        self.tolerates_races = true;
        self
    }
}

impl<F> Transaction for Work<F>
where
    F: FnMut(&TxContext<'_>) -> Result<()>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> TransactionKind {
        self.kind
    }

    fn tolerates_concurrent_modification(&self) -> bool {
        self.tolerates_races
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        (self.operations)(ctx)
    }
}

/// Runs a normally best-effort transaction as critical.
#[derive(Clone, Debug)]
pub struct Critical<T>(pub T);

impl<T: Transaction> Transaction for Critical<T> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn kind(&self) -> TransactionKind {
        TransactionKind::Critical
    }

    fn tolerates_concurrent_modification(&self) -> bool {
        self.0.tolerates_concurrent_modification()
    }

    fn perform_operations(&mut self, ctx: &TxContext<'_>) -> Result<()> {
        self.0.perform_operations(ctx)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Executor
// ─────────────────────────────────────────────────────────────────────────────

/// Run `transaction` on a connection borrowed from `pool`.
///
/// Returns `Ok(true)` when committed and `Ok(false)` when a best-effort
/// transaction failed. A failed critical transaction becomes
/// [`StoreError::Fatal`] naming it.
pub fn run(
    pool: &ConnectionPool,
    dialect: &dyn Dialect,
    transaction: &mut dyn Transaction,
) -> Result<bool> {
    match attempt(pool, dialect, transaction) {
        Ok(()) => {
            debug!(transaction = %transaction.name(), "committed");
            Ok(true)
        }
        Err(err) => handle_failure(transaction, err),
    }
}

fn attempt(
    pool: &ConnectionPool,
    dialect: &dyn Dialect,
    transaction: &mut dyn Transaction,
) -> Result<()> {
    let conn = pool.get()?;
    let tx = conn.unchecked_transaction()?;
    transaction.perform_operations(&TxContext::new(&tx, dialect))?;
    tx.commit()?;
    Ok(())
}

/// Whether a best-effort failure is an expected lost race.
pub(crate) fn is_benign_failure(transaction: &dyn Transaction, err: &StoreError) -> bool {
    transaction.tolerates_concurrent_modification() && err.is_concurrent_modification()
}

fn handle_failure(transaction: &dyn Transaction, err: StoreError) -> Result<bool> {
    let name = transaction.name();
    match transaction.kind() {
        TransactionKind::Critical => {
            error!(transaction = %name, error = %err, "critical transaction failed, rolled back");
            Err(StoreError::Fatal {
                transaction: name.to_string(),
                source: Box::new(err),
            })
        }
        TransactionKind::BestEffort if is_benign_failure(transaction, &err) => {
            debug!(
                transaction = %name,
                error = %err,
                "lost a race with a concurrent write, skipped until next run"
            );
            Ok(false)
        }
        TransactionKind::BestEffort => {
            error!(transaction = %name, error = %err, "transaction failed, rolled back");
            Ok(false)
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
