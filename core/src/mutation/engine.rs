//! Statement synthesis for inserts, updates and deletes

use log::debug;

use crate::db::{Connection, PLACEHOLDER};
use crate::error::{Error, Result};
use crate::models::{Record, Value};
use crate::schema::{Field, Table};
use crate::validation;

use super::{Action, Context, Operation, Outcome};

impl Table {
    /// Insert a record, through the insert hook when one is set
    pub fn insert<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        self.dispatch(Operation::Insert, self.on_insert.as_ref(), conn, record)
    }

    /// Update the record's row, through the update hook when one is set
    pub fn update<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        self.dispatch(Operation::Update, self.on_update.as_ref(), conn, record)
    }

    /// Delete the record's row, through the delete hook when one is set
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
        self.open()?;
        match hook {
            Some(hook) => hook(Context::new(op, conn, self, record.clone())),
            None => Context::new(op, conn, self, record.clone()).proceed(),
        }
    }

    /// Built-in insert
    ///
    /// Auto-increment fields are left to the database. A read-only field is
    /// skipped unless it has a default, which then always wins. Other fields
    /// take the record's value, or their default when the record has none.
    pub fn default_insert<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        let layout = self.open()?;
        let mut working = record.clone();
        let mut columns = Vec::with_capacity(self.fields().len());
        let mut args = Vec::with_capacity(self.fields().len());

        for (i, field) in self.fields().iter().enumerate() {
            if field.auto_increment || (field.read_only && field.default.is_none()) {
                continue;
            }

            let key = &layout.keys[i];
            let value = match working.get(key) {
                Some(value) if !field.read_only && !value.is_null() => value.clone(),
                _ => field.resolve_default(),
            };

            working.insert(key.clone(), value.clone());
            self.check(Operation::Insert, conn, field, &layout.titles[i], &working, &value)?;

            columns.push(field.name.as_str());
            args.push(value);
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.name)
        } else {
            format!(
                "INSERT INTO {}({}) VALUES({})",
                self.name,
                columns.join(", "),
                vec![PLACEHOLDER; columns.len()].join(", ")
            )
        };

        debug!("insert: {} {:?}", sql, args);
        let exec = conn.exec(&sql, &args).map_err(Error::Execution)?;
        Ok(Outcome::new(exec, Operation::Insert, conn, self, working))
    }

    /// Built-in update
    ///
    /// Primary key and auto-increment fields are never set. A read-only
    /// field, or one missing from the record, takes its on-update value or
    /// is left alone. A `Null` in the record is written as NULL unless the
    /// field has an on-update value.
    pub fn default_update<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        let layout = self.open()?;
        let filter = self.where_primary_key(record)?;
        let mut working = record.clone();
        let mut sets = Vec::with_capacity(self.fields().len());
        let mut args = Vec::with_capacity(self.fields().len() + filter.args.len());

        for (i, field) in self.fields().iter().enumerate() {
            if field.primary_key || field.auto_increment {
                continue;
            }

            let key = &layout.keys[i];
            let supplied = if field.read_only { None } else { working.get(key) };
            let value = match (supplied, &field.on_update) {
                (Some(value), Some(source)) if value.is_null() => source.resolve(),
                (Some(value), _) => value.clone(),
                (None, Some(source)) => source.resolve(),
                (None, None) => continue,
            };

            working.insert(key.clone(), value.clone());
            self.check(Operation::Update, conn, field, &layout.titles[i], &working, &value)?;

            sets.push(format!("{} = {}", field.name, PLACEHOLDER));
            args.push(value);
        }

        if sets.is_empty() {
            return Err(Error::Preflight(format!(
                "table {}: not enough columns to update",
                self.name
            )));
        }

        let sql = format!("UPDATE {} SET {} WHERE {}", self.name, sets.join(", "), filter.clause);
        args.extend(filter.args);

        debug!("update: {} {:?}", sql, args);
        let exec = conn.exec(&sql, &args).map_err(Error::Execution)?;
        Ok(Outcome::new(exec, Operation::Update, conn, self, working))
    }

    /// Built-in delete; the record only needs its primary key values
    pub fn default_delete<'a>(&'a self, conn: &'a dyn Connection, record: &Record) -> Result<Outcome<'a>> {
        let filter = self.where_primary_key(record)?;
        let sql = format!("DELETE FROM {} WHERE {}", self.name, filter.clause);

        debug!("delete: {} {:?}", sql, filter.args);
        let exec = conn.exec(&sql, &filter.args).map_err(Error::Execution)?;
        Ok(Outcome::new(exec, Operation::Delete, conn, self, record.clone()))
    }

    fn check<'a>(
        &'a self,
        op: Operation,
        conn: &'a dyn Connection,
        field: &'a Field,
        title: &str,
        working: &Record,
        value: &Value,
    ) -> Result<()> {
        if field.validations.is_empty() {
            return Ok(());
        }

        let mut cx = Context::new(op, conn, self, working.clone());
        cx.field = Some(field);
        validation::check_field(&cx, title, value)
    }
}
