//! Delete guards
//!
//! Checks run before a row is deleted, typically refusing the delete while
//! other tables still reference the row.

use std::sync::Arc;
use log::warn;

use crate::error::{Error, Result};
use crate::mutation::{action, Action, Context};
use crate::schema::{Field, Table};

/// A pre-delete check; an error refuses the delete
pub type Checker = Arc<dyn Fn(&Context<'_>) -> Result<()> + Send + Sync>;

/// Wrap a closure as a [`Checker`]
pub fn checker<F>(f: F) -> Checker
where
    F: Fn(&Context<'_>) -> Result<()> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Refuse the delete while rows of `table` reference the record
///
/// Counts rows of `table` whose `column` equals the record's value under
/// that column's key in `table`.
pub fn referenced_by(table: Arc<Table>, column: impl Into<String>) -> Checker {
    let column = column.into();
    checker(move |cx| {
        let field = table
            .field(&column)
            .cloned()
            .unwrap_or_else(|| Field::new(column.as_str()));

        if table.count_record(cx.conn, &field, &cx.record, false, None)? > 0 {
            Err(Error::Rejected("this record is in use".to_string()))
        } else {
            Ok(())
        }
    })
}

/// Build a delete hook that runs `checkers` before the default delete
///
/// The first refusal aborts with `Rejected("can not be deleted, <reason>")`.
/// Database failures pass through unchanged.
pub fn guarded_delete(checkers: Vec<Checker>) -> Action {
    action(move |cx| {
        for check in &checkers {
            if let Err(err) = check(&cx) {
                return Err(match err {
                    Error::Execution(_) | Error::Scan { .. } | Error::Schema(_) => err,
                    refusal => {
                        warn!("delete on {} refused: {}", cx.table.name, refusal);
                        Error::Rejected(format!("can not be deleted, {}", refusal))
                    }
                });
            }
        }
        cx.proceed()
    })
}
