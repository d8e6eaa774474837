//! Mutation engine
//!
//! Synthesizes INSERT, UPDATE and DELETE statements from a [`Table`]
//! definition and a caller record. Values are resolved per field (caller
//! value, default or on-update value), written back into a working copy of
//! the record and validated before any statement is issued.

mod engine;
mod outcome;

pub use outcome::Outcome;

use std::fmt;
use std::sync::Arc;

use crate::db::Connection;
use crate::error::Result;
use crate::models::Record;
use crate::schema::{Field, Table};

/// Kind of mutation in progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// INSERT
    Insert,
    /// UPDATE
    Update,
    /// DELETE
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "insert"),
            Operation::Update => write!(f, "update"),
            Operation::Delete => write!(f, "delete"),
        }
    }
}

/// Replacement for a table's default insert, update or delete
pub type Action = Arc<dyn for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync>;

/// Wrap a closure as an [`Action`]
pub fn action<F>(f: F) -> Action
where
    F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What a hook or a validation rule knows about the mutation in progress
///
/// Rules receive the record as resolved so far; hooks receive a copy of the
/// caller's record.
#[derive(Clone)]
pub struct Context<'a> {
    /// Kind of mutation
    pub op: Operation,

    /// Connection the mutation runs on
    pub conn: &'a dyn Connection,

    /// Table being mutated
    pub table: &'a Table,

    /// Record snapshot
    pub record: Record,

    /// Field being validated, if any
    pub field: Option<&'a Field>,
}

impl fmt::Debug for Context<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("op", &self.op)
            .field("table", &self.table.name)
            .field("record", &self.record)
            .field("field", &self.field.map(|field| &field.name))
            .finish()
    }
}

impl<'a> Context<'a> {
    /// Create a context with no current field
    pub fn new(op: Operation, conn: &'a dyn Connection, table: &'a Table, record: Record) -> Self {
        Context {
            op,
            conn,
            table,
            record,
            field: None,
        }
    }

    /// Run the table's default behavior for this context's operation
    ///
    /// Hooks call this to fall through to the built-in statement.
    pub fn proceed(self) -> Result<Outcome<'a>> {
        match self.op {
            Operation::Insert => self.table.default_insert(self.conn, &self.record),
            Operation::Update => self.table.default_update(self.conn, &self.record),
            Operation::Delete => self.table.default_delete(self.conn, &self.record),
        }
    }
}
