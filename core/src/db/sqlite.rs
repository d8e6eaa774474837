//! SQLite connection support
//!
//! Implements [`Connection`] for `rusqlite` connections and transactions so
//! tables can be used directly against an embedded database.

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};

use super::{Column, Connection, DbResult, ExecResult, RawValue, Rows};
use crate::models::Value;

/// Text layout used when binding timestamps
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self {
            Value::Null => Ok(ToSqlOutput::Owned(SqlValue::Null)),
            Value::Bool(true) => Ok(ToSqlOutput::Owned(SqlValue::Integer(1))),
            Value::Bool(false) => Ok(ToSqlOutput::Owned(SqlValue::Integer(0))),
            Value::Int(v) => Ok(ToSqlOutput::Owned(SqlValue::Integer(*v))),
            Value::Float(v) => Ok(ToSqlOutput::Owned(SqlValue::Real(*v))),
            Value::Text(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::Bytes(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Blob(&v[..]))),
            Value::Timestamp(v) => Ok(ToSqlOutput::Owned(SqlValue::Text(
                v.format(TIMESTAMP_FORMAT).to_string(),
            ))),
        }
    }
}

impl From<ValueRef<'_>> for RawValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => RawValue::Null,
            ValueRef::Integer(v) => RawValue::Integer(v),
            ValueRef::Real(v) => RawValue::Real(v),
            ValueRef::Text(v) => RawValue::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => RawValue::Blob(v.to_vec()),
        }
    }
}

impl Connection for rusqlite::Connection {
    fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows> {
        let mut stmt = self.prepare_cached(sql)?;

        let columns: Vec<Column> = stmt
            .columns()
            .iter()
            .map(|col| Column::new(col.name(), col.decl_type()))
            .collect();
        let width = columns.len();

        let mut rows = stmt.query(rusqlite::params_from_iter(args.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut items = Vec::with_capacity(width);
            for index in 0..width {
                items.push(RawValue::from(row.get_ref(index)?));
            }
            out.push(items);
        }

        Ok(Rows::new(columns, out))
    }

    fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        let mut stmt = self.prepare_cached(sql)?;
        let count = stmt.execute(rusqlite::params_from_iter(args.iter()))?;

        Ok(ExecResult {
            rows_affected: count as u64,
            last_insert_id: Some(self.last_insert_rowid()),
        })
    }
}

impl Connection for rusqlite::Transaction<'_> {
    fn query(&self, sql: &str, args: &[Value]) -> DbResult<Rows> {
        Connection::query(&**self, sql, args)
    }

    fn exec(&self, sql: &str, args: &[Value]) -> DbResult<ExecResult> {
        Connection::exec(&**self, sql, args)
    }
}
