//! Mutation results

use std::fmt;
use log::debug;

use crate::db::{Connection, ExecResult};
use crate::error::Result;
use crate::models::{Record, Value};
use crate::schema::Table;
use crate::sql::Selector;

use super::Operation;

/// Result of a successful mutation
///
/// Holds the driver outcome and the record as submitted, after defaults and
/// on-update values were resolved. The connection is kept only so the row
/// can be fetched again with [`Outcome::record`]; re-fetching through a
/// transaction that was already committed fails in the driver.
pub struct Outcome<'a> {
    exec: ExecResult,
    op: Operation,
    conn: &'a dyn Connection,
    table: &'a Table,
    record: Record,
}

impl fmt::Debug for Outcome<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Outcome")
            .field("exec", &self.exec)
            .field("op", &self.op)
            .field("table", &self.table.name)
            .field("record", &self.record)
            .finish()
    }
}

impl<'a> Outcome<'a> {
    /// Wrap a driver outcome
    pub fn new(
        exec: ExecResult,
        op: Operation,
        conn: &'a dyn Connection,
        table: &'a Table,
        record: Record,
    ) -> Self {
        Outcome {
            exec,
            op,
            conn,
            table,
            record,
        }
    }

    /// Number of rows changed
    pub fn rows_affected(&self) -> u64 {
        self.exec.rows_affected
    }

    /// Row id generated by an insert, when the driver reports one
    pub fn last_insert_id(&self) -> Option<i64> {
        self.exec.last_insert_id
    }

    /// The driver outcome
    pub fn exec(&self) -> ExecResult {
        self.exec
    }

    /// The mutation that produced this outcome
    pub fn operation(&self) -> Operation {
        self.op
    }

    /// The table that was mutated
    pub fn table(&self) -> &'a Table {
        self.table
    }

    /// The record as submitted
    pub fn snapshot(&self) -> &Record {
        &self.record
    }

    /// The record, optionally fetched again from the database
    ///
    /// Without `refresh` this is the submitted snapshot and no I/O happens.
    /// With `refresh`, an insert into a table whose auto-increment field is
    /// part of the primary key first takes the generated id; the row is then
    /// selected by primary key and its columns override the snapshot.
    /// `Ok(None)` means the row was not found.
    pub fn record(&self, refresh: bool) -> Result<Option<Record>> {
        let mut record = self.record.clone();
        if !refresh {
            return Ok(Some(record));
        }

        let layout = self.table.open()?;
        if self.op == Operation::Insert {
            if let (Some(i), Some(id)) = (layout.auto_increment, self.exec.last_insert_id) {
                if layout.primary_key.contains(&i) {
                    record.insert(layout.keys[i].clone(), Value::Int(id));
                }
            }
        }

        let filter = self.table.where_primary_key(&record)?;
        let selector = Selector::new().filter(filter.clause).limit(1);
        debug!("refresh {} row of {}", self.op, self.table.name);

        match self.table.select_one(self.conn, &selector, &filter.args)? {
            Some(fetched) => {
                record.extend(fetched);
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }
}
