//! Database handle and startup sequence.
//!
//! A [`Database`] owns the connection pool and the dialect strategy. It
//! starts `Closed`; [`Database::init`] moves it through `Patching` to `Open`
//! by creating missing tables, running every patch in order and creating
//! indexes. Writes and reads are refused until the database is `Open`, and a
//! fatal startup failure leaves it `Closed`.

use gamestat_settings::{DatabaseKind, DatabaseSettings};
use parking_lot::RwLock;
use serde::Serialize;
use tracing::{info, warn};

use crate::dialect::{self, Dialect, SqliteDialect};
use crate::errors::{Result, StoreError};
use crate::patches::{self, Patch, PatchOutcome, PatchStatus, PatchTransaction};
use crate::schema::{CreateIndexesTransaction, CreateTablesTransaction};
use crate::sqlite::connection::{self, ConnectionPool, Location, PoolOptions};
use crate::statement::Query;
use crate::transaction::{self, Transaction, TxContext};

/// Lifecycle state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum DbState {
    /// Not initialized, or startup failed.
    Closed,
    /// Startup transactions are running.
    Patching,
    /// Ready for reads and writes.
    Open,
}

/// Pooled, dialect-aware database.
pub struct Database {
    pool: ConnectionPool,
    dialect: Box<dyn Dialect>,
    patches: Vec<Box<dyn Patch>>,
    state: RwLock<DbState>,
}

impl Database {
    /// Wrap an existing pool. The database starts `Closed`.
    pub fn new(pool: ConnectionPool, dialect: Box<dyn Dialect>) -> Self {
        Self {
            pool,
            dialect,
            patches: patches::registry(),
            state: RwLock::new(DbState::Closed),
        }
    }

    /// Open the database described by `settings`.
    ///
    /// Only `sqlite` has a connection implementation; other kinds fail with
    /// [`StoreError::UnsupportedDialect`].
    pub fn open(settings: &DatabaseSettings) -> Result<Self> {
        if settings.kind != DatabaseKind::Sqlite {
            return Err(StoreError::UnsupportedDialect(settings.kind));
        }
        let pool = connection::open_pool(
            Location::File(&settings.sqlite_path),
            &PoolOptions::from(settings),
        )?;
        let conn = pool.get()?;
        let pragmas = connection::read_pragmas(&conn)?;
        drop(conn);
        info!(
            path = %settings.sqlite_path,
            journal_mode = %pragmas.journal_mode,
            "database opened"
        );
        Ok(Self::new(pool, dialect::for_kind(settings.kind)))
    }

    /// Open a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let pool = connection::open_pool(Location::Memory, &PoolOptions::default())?;
        Ok(Self::new(pool, Box::new(SqliteDialect)))
    }

    /// Replace the patch list.
    #[must_use]
    pub fn with_patches(mut self, patches: Vec<Box<dyn Patch>>) -> Self {
        self.patches = patches;
        self
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DbState {
        *self.state.read()
    }

    /// Dialect strategy in use.
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// Run the startup sequence: tables, patches, indexes.
    ///
    /// Returns the first fatal error, naming the failed transaction or
    /// patch. Already-open databases are left alone.
    pub fn init(&self) -> Result<()> {
        {
            let mut state = self.state.write();
            if *state == DbState::Open {
                return Ok(());
            }
            *state = DbState::Patching;
        }

        match self.run_startup() {
            Ok(()) => {
                *self.state.write() = DbState::Open;
                info!(dialect = %self.dialect.kind(), "database ready");
                Ok(())
            }
            Err(err) => {
                *self.state.write() = DbState::Closed;
                Err(err)
            }
        }
    }

    fn run_startup(&self) -> Result<()> {
        let _ = self.run(&mut CreateTablesTransaction)?;

        let mut applied = 0;
        for patch in &self.patches {
            let mut tx = PatchTransaction::new(patch.as_ref());
            let committed = self.run(&mut tx)?;
            match tx.outcome() {
                Some(PatchOutcome::Applied) if committed => {
                    info!(patch = patch.name(), "patch applied");
                    applied += 1;
                }
                Some(_) => {}
                None => {
                    warn!(patch = patch.name(), "patch failed, will retry on next start");
                }
            }
        }
        if applied > 0 {
            info!(applied, "schema patched");
        }

        let _ = self.run(&mut CreateIndexesTransaction)?;
        Ok(())
    }

    fn run(&self, transaction: &mut dyn Transaction) -> Result<bool> {
        transaction::run(&self.pool, self.dialect.as_ref(), transaction)
    }

    fn ensure_open(&self) -> Result<()> {
        match self.state() {
            DbState::Open => Ok(()),
            other => Err(StoreError::NotReady(other)),
        }
    }

    /// Run a transaction on its own pooled connection.
    ///
    /// `Ok(true)` when committed, `Ok(false)` when a best-effort transaction
    /// failed and was logged, [`StoreError::Fatal`] when a critical one failed.
    pub fn execute(&self, transaction: &mut dyn Transaction) -> Result<bool> {
        self.ensure_open()?;
        self.run(transaction)
    }

    /// Run a read on a separately borrowed connection.
    pub fn query<T>(&self, query: &Query<T>) -> Result<T> {
        self.ensure_open()?;
        let conn = self.pool.get()?;
        query.run(&conn)
    }

    /// Report which patches are applied, without changing anything.
    ///
    /// Works in any state, so operators can inspect a database that failed
    /// to start.
    pub fn patch_status(&self) -> Result<Vec<PatchStatus>> {
        let conn = self.pool.get()?;
        // Dropped without commit: probes must never leave changes behind.
        let tx = conn.unchecked_transaction()?;
        let ctx = TxContext::new(&tx, self.dialect.as_ref());
        self.patches
            .iter()
            .map(|patch| {
                Ok(PatchStatus {
                    name: patch.name(),
                    applied: patch.has_been_applied(&ctx)?,
                })
            })
            .collect()
    }

    /// Refuse further reads and writes.
    pub fn close(&self) {
        *self.state.write() = DbState::Closed;
        info!("database closed");
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("dialect", &self.dialect.kind())
            .field("state", &self.state())
            .field("patches", &self.patches.len())
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
