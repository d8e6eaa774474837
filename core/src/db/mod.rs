//! Database connection abstraction
//!
//! The engine never opens connections itself. Callers hand in anything that
//! implements [`Connection`]: a plain connection or an open transaction.
//! All statements use `?` as the positional placeholder.

pub mod sqlite;

use std::error::Error as StdError;
use std::fmt;

use crate::models::Value;

/// Placeholder used for every positional argument
pub const PLACEHOLDER: &str = "?";

/// Error produced by a driver, kept as-is
pub type DbError = Box<dyn StdError + Send + Sync>;

/// Result type for driver calls
pub type DbResult<T> = std::result::Result<T, DbError>;

/// A value as the driver returned it, before type-directed decoding
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// SQL NULL
    Null,
    /// Integer storage
    Integer(i64),
    /// Floating point storage
    Real(f64),
    /// Text storage
    Text(String),
    /// Binary storage
    Blob(Vec<u8>),
}

/// Result set column descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Column name as reported by the driver
    pub name: String,

    /// Declared SQL type, e.g. `VARCHAR(255)`; `None` for expressions
    pub decl_type: Option<String>,
}

impl Column {
    /// Create a column descriptor
    pub fn new(name: impl Into<String>, decl_type: Option<&str>) -> Self {
        Column {
            name: name.into(),
            decl_type: decl_type.map(str::to_string),
        }
    }
}

/// Owned result set: column descriptors plus the remaining rows
///
/// Dropping a `Rows` releases everything it holds, so early termination
/// needs no extra cleanup.
pub struct Rows {
    columns: Vec<Column>,
    rows: std::vec::IntoIter<Vec<RawValue>>,
}

impl Rows {
    /// Create a result set
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<RawValue>>) -> Self {
        Rows {
            columns,
            rows: rows.into_iter(),
        }
    }

    /// Column descriptors, in select-list order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }
}

impl Iterator for Rows {
    type Item = Vec<RawValue>;

    fn next(&mut self) -> Option<Self::Item> {
        self.rows.next()
    }
}

impl fmt::Debug for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rows")
            .field("columns", &self.columns)
            .field("remaining", &self.rows.len())
            .finish()
    }
}

/// Outcome of a statement that does not return rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecResult {
    /// Number of rows changed by the statement
    pub rows_affected: u64,

    /// Row id generated by the last insert, when the driver reports one
    pub last_insert_id: Option<i64>,
}

/// Anything that can run parameterized SQL
///
/// Implemented for `rusqlite::Connection` and `rusqlite::Transaction` in
/// [`sqlite`]. The engine never keeps a connection beyond one call, except
/// inside an [`Outcome`](crate::mutation::Outcome) for a later re-fetch.
#[cfg_attr(test, mockall::automock)]
pub trait Connection {
    /// Run a query and return its rows
    fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows>;

    /// Run a statement that does not return rows
    fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult>;

    /// Run a query and return only its first row
    fn query_row(&self, sql: &str, args: &[Value]) -> DbResult<Option<(Vec<Column>, Vec<RawValue>)>> {
        let mut rows = self.query(sql, args)?;
        let columns = rows.columns().to_vec();
        Ok(rows.next().map(|row| (columns, row)))
    }
}
