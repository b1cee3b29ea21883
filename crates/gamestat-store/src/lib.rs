//! # gamestat-store
//!
//! Transactional SQL store for game-server statistics.
//!
//! - [`statement`]: [`Executable`] and [`Query`] wrappers over parameterized SQL
//! - [`transaction`]: named units of work with commit/rollback and
//!   critical/best-effort failure handling
//! - [`dialect`]: per-engine catalog probes and DDL fragments
//! - [`schema`] and [`patches`]: table creation and the ordered, idempotent
//!   schema patches run at startup
//! - [`transactions`]: capture-layer writes and retention sweeps
//! - [`queries`]: reads feeding the aggregate views
//!
//! Only `SQLite` connections are implemented; the other dialects generate
//! SQL for external pools.

#![deny(unsafe_code)]

pub mod database;
pub mod dialect;
pub mod errors;
pub mod model;
pub mod patches;
pub mod queries;
pub mod schema;
pub mod sqlite;
pub mod statement;
pub mod transaction;
pub mod transactions;

pub use database::{Database, DbState};
pub use errors::{Result, StoreError};
pub use statement::{Executable, Query};
pub use transaction::{Critical, Transaction, TransactionKind, TxContext, Work};
