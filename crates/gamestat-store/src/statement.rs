//! Statement primitives.
//!
//! An [`Executable`] is SQL run for effect; a [`Query`] is SQL whose cursor is
//! fed through a mapper into a typed value. Both bind positional
//! [`Value`] parameters and are immutable once built, so the same statement
//! can run any number of times on any connection.

use std::fmt;

use rusqlite::types::Value;
use rusqlite::{Connection, Row, Rows, params_from_iter};
use uuid::Uuid;

use crate::errors::{Result, StoreError};

/// Cursor mapper: consumes rows and produces the query result.
///
/// The second argument is the statement's size hint for result containers.
pub type Mapper<T> = Box<dyn Fn(&mut Rows<'_>, usize) -> Result<T>>;

/// Text parameter.
pub fn text(value: impl Into<String>) -> Value {
    Value::Text(value.into())
}

/// Uuid parameter, stored as its hyphenated text form.
pub fn uuid(value: &Uuid) -> Value {
    Value::Text(value.to_string())
}

/// Read a uuid stored as text.
pub fn uuid_column(row: &Row<'_>, idx: usize) -> Result<Uuid> {
    let raw: String = row.get(idx)?;
    Uuid::parse_str(&raw).map_err(|e| StoreError::InvalidData(format!("uuid '{raw}': {e}")))
}

// ─────────────────────────────────────────────────────────────────────────────
// Executable
// ─────────────────────────────────────────────────────────────────────────────

/// A write statement.
#[derive(Clone, Debug, PartialEq)]
pub struct Executable {
    sql: String,
    params: Vec<Value>,
}

impl Executable {
    /// Statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Statement with positional parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Run on `conn`, returning the number of affected rows.
    pub(crate) fn run(&self, conn: &Connection) -> Result<usize> {
        let mut stmt = conn.prepare_cached(&self.sql)?;
        Ok(stmt.execute(params_from_iter(self.params.iter()))?)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Query
// ─────────────────────────────────────────────────────────────────────────────

/// A read statement producing a `T`.
pub struct Query<T> {
    sql: String,
    params: Vec<Value>,
    mapper: Mapper<T>,
    size_hint: usize,
}

impl<T> Query<T> {
    /// Query with a custom cursor mapper.
    pub fn new<F>(sql: impl Into<String>, params: Vec<Value>, mapper: F) -> Self
    where
        F: Fn(&mut Rows<'_>, usize) -> Result<T> + 'static,
    {
        Self {
            sql: sql.into(),
            params,
            mapper: Box::new(mapper),
            size_hint: 0,
        }
    }

    /// Expected number of rows, used to pre-size list results.
    #[must_use]
    pub fn with_size_hint(mut self, size_hint: usize) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bound parameters.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Size hint passed to the mapper.
    pub fn size_hint(&self) -> usize {
        self.size_hint
    }

    /// Run on `conn` and map the cursor.
    pub(crate) fn run(&self, conn: &Connection) -> Result<T> {
        let mut stmt = conn.prepare_cached(&self.sql)?;
        let mut rows = stmt.query(params_from_iter(self.params.iter()))?;
        (self.mapper)(&mut rows, self.size_hint)
    }
}

impl<R: 'static> Query<Option<R>> {
    /// First row mapped through `row`, or `None` when the cursor is empty.
    pub fn single<F>(sql: impl Into<String>, params: Vec<Value>, row: F) -> Self
    where
        F: Fn(&Row<'_>) -> Result<R> + 'static,
    {
        Self::new(sql, params, move |rows, _| match rows.next()? {
            Some(first) => row(first).map(Some),
            None => Ok(None),
        })
    }
}

impl<R: 'static> Query<Vec<R>> {
    /// Every row mapped through `row`.
    pub fn list<F>(sql: impl Into<String>, params: Vec<Value>, row: F) -> Self
    where
        F: Fn(&Row<'_>) -> Result<R> + 'static,
    {
        Self::new(sql, params, move |rows, size_hint| {
            let mut out = Vec::with_capacity(size_hint);
            while let Some(next) = rows.next()? {
                out.push(row(next)?);
            }
            Ok(out)
        })
    }
}

impl Query<bool> {
    /// Whether the statement returns at least one row.
    pub fn exists(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::new(sql, params, |rows, _| Ok(rows.next()?.is_some()))
    }
}

impl Query<i64> {
    /// First column of the first row as an integer; `0` for an empty cursor
    /// or a `NULL` aggregate.
    pub fn count(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self::new(sql, params, |rows, _| match rows.next()? {
            Some(row) => Ok(row.get::<_, Option<i64>>(0)?.unwrap_or(0)),
            None => Ok(0),
        })
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("sql", &self.sql)
            .field("params", &self.params)
            .field("size_hint", &self.size_hint)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
