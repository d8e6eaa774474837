//! Multi-table views
//!
//! A [`Query`] reads through an arbitrary SELECT, typically a join, and
//! writes through the first of its tables.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use crate::config::EngineConfig;
use crate::db::Connection;
use crate::decode::RowDecoder;
use crate::error::{Error, Result};
use crate::models::{Record, Value};
use crate::mutation::{Action, Context, Operation, Outcome};
use crate::schema::{Field, Table};
use crate::utils::{Derived, Naming};

use super::Selector;

/// A selector over one or more tables
pub struct Query {
    /// Base statement; caller selectors are merged into it
    pub selector: Selector,

    /// Tables read by the selector; mutations go to the first
    pub tables: Vec<Arc<Table>>,

    /// Computed or aliased columns not belonging to any table
    pub fields: Vec<Field>,

    /// Replaces the first table's insert when set
    pub on_insert: Option<Action>,

    /// Replaces the first table's update when set
    pub on_update: Option<Action>,

    /// Replaces the first table's delete when set
    pub on_delete: Option<Action>,

    naming: Naming,
    keys: Derived<HashMap<String, String>>,
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("selector", &self.selector)
            .field("tables", &self.tables.iter().map(|t| &t.name).collect::<Vec<_>>())
            .field("fields", &self.fields)
            .finish()
    }
}

impl Query {
    /// Create a query from its base selector and tables
    pub fn new(selector: Selector, tables: Vec<Arc<Table>>) -> Self {
        Query {
            selector,
            tables,
            fields: Vec::new(),
            on_insert: None,
            on_update: None,
            on_delete: None,
            naming: Naming::default(),
            keys: Derived::new(),
        }
    }

    /// Add fields that only exist in the select list
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self.keys.reset();
        self
    }

    /// Use a specific naming convention for the query's own fields
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self.keys.reset();
        self
    }

    /// Use the naming convention of an engine configuration
    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_naming(config.naming())
    }

    /// Run `hook` instead of the first table's insert
    pub fn with_insert_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_insert = Some(Arc::new(hook));
        self
    }

    /// Run `hook` instead of the first table's update
    pub fn with_update_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(hook));
        self
    }

    /// Run `hook` instead of the first table's delete
    pub fn with_delete_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_delete = Some(Arc::new(hook));
        self
    }

    /// Build the column to key map
    ///
    /// The query's own fields come first, then each table's fields in
    /// order; the first definition of a column name wins.
    pub fn open(&self) -> Arc<HashMap<String, String>> {
        let built = self.keys.get_or_try_init(|| {
            let mut keys = HashMap::new();
            for field in &self.fields {
                keys.entry(field.name.clone())
                    .or_insert_with(|| field.key_with(&self.naming));
            }
            for table in &self.tables {
                for field in table.fields() {
                    keys.entry(field.name.clone())
                        .or_insert_with(|| table.key_of(field));
                }
            }
            Ok::<_, Infallible>(keys)
        });
        match built {
            Ok(keys) => keys,
            Err(never) => match never {},
        }
    }

    /// Drop the key map so the next call rebuilds it
    pub fn close(&self) {
        self.keys.reset();
    }

    /// Whether the key map has been built
    pub fn is_open(&self) -> bool {
        self.keys.is_set()
    }

    /// Select rows through the base selector merged with `selector`
    pub fn select(&self, conn: &dyn Connection, selector: &Selector, args: &[Value]) -> Result<Vec<Record>> {
        let keys = self.open();
        let sql = self.selector.merge(selector).sql();
        RowDecoder::new(&self.naming)
            .with_keys(&keys)
            .fetch_all(conn, &sql, args)
    }

    /// Select the first matching row
    pub fn select_one(&self, conn: &dyn Connection, selector: &Selector, args: &[Value]) -> Result<Option<Record>> {
        let keys = self.open();
        let sql = self.selector.merge(selector).sql();
        RowDecoder::new(&self.naming)
            .with_keys(&keys)
            .fetch_one(conn, &sql, args)
    }

    /// Insert into the first table
    pub fn insert<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        self.dispatch(Operation::Insert, self.on_insert.as_ref(), conn, record)
    }

    /// Update the first table
    pub fn update<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        self.dispatch(Operation::Update, self.on_update.as_ref(), conn, record)
    }

    /// Delete from the first table
    pub fn delete<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        self.dispatch(Operation::Delete, self.on_delete.as_ref(), conn, record)
    }

    fn dispatch<'a>(
        &'a self,
        op: Operation,
        hook: Option<&Action>,
        conn: &'a dyn Connection,
        record: &Record,
    ) -> Result<Outcome<'a>> {
        self.open();
        let table = self
            .tables
            .first()
            .ok_or_else(|| Error::Schema("query has no tables".to_string()))?;

        match hook {
            Some(hook) => {
                table.open()?;
                hook(Context::new(op, conn, table, record.clone()))
            }
            None => match op {
                Operation::Insert => table.insert(conn, record),
                Operation::Update => table.update(conn, record),
                Operation::Delete => table.delete(conn, record),
            },
        }
    }
}
