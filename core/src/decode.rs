//! Row decoding
//!
//! Turns result sets into [`Record`]s. Each column is decoded according to
//! its declared SQL type, and SQL NULL columns are left out of the record
//! entirely: a missing key means NULL, a present key always carries a value.

use std::collections::HashMap;
use log::debug;

use crate::db::{Column, Connection, RawValue, Rows};
use crate::error::{Error, Result};
use crate::models::{Record, Value};
use crate::utils::Naming;

/// Decoding target chosen from a column's declared type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanKind {
    /// INT, TINYINT, SMALLINT, BIGINT
    Int,
    /// FLOAT, DOUBLE, REAL
    Float,
    /// BOOL, BOOLEAN
    Bool,
    /// VARCHAR, CHAR, TEXT, JSON, DECIMAL, DATETIME, DATE, TIME
    Text,
    /// Anything else; the driver's own representation is kept
    Opaque,
}

impl ScanKind {
    /// Pick the decoding target for a declared type such as `VARCHAR(20)`
    pub fn from_decl_type(decl_type: Option<&str>) -> Self {
        let decl = match decl_type {
            Some(decl) => decl,
            None => return ScanKind::Opaque,
        };

        let base = decl
            .split('(')
            .next()
            .and_then(|s| s.split_whitespace().next())
            .unwrap_or("")
            .to_uppercase();

        match base.as_str() {
            "INT" | "TINYINT" | "SMALLINT" | "BIGINT" => ScanKind::Int,
            "FLOAT" | "DOUBLE" | "REAL" => ScanKind::Float,
            "BOOL" | "BOOLEAN" => ScanKind::Bool,
            "VARCHAR" | "CHAR" | "TEXT" | "JSON" | "DECIMAL" | "DATETIME" | "DATE" | "TIME" => {
                ScanKind::Text
            }
            _ => ScanKind::Opaque,
        }
    }

    /// Decode one raw value; `None` means SQL NULL
    pub fn scan(self, column: &Column, raw: RawValue) -> Result<Option<Value>> {
        let value = match (self, raw) {
            (_, RawValue::Null) => return Ok(None),

            (ScanKind::Int, RawValue::Integer(v)) => Value::Int(v),
            (ScanKind::Int, RawValue::Real(v)) if v.fract() == 0.0 => Value::Int(v as i64),
            (ScanKind::Int, RawValue::Text(s)) => Value::Int(
                s.trim().parse().map_err(|e| scan_error(column, e))?,
            ),

            (ScanKind::Float, RawValue::Integer(v)) => Value::Float(v as f64),
            (ScanKind::Float, RawValue::Real(v)) => Value::Float(v),
            (ScanKind::Float, RawValue::Text(s)) => Value::Float(
                s.trim().parse().map_err(|e| scan_error(column, e))?,
            ),

            (ScanKind::Bool, RawValue::Integer(v)) => Value::Bool(v != 0),
            (ScanKind::Bool, RawValue::Text(s)) => Value::Bool(parse_bool(&s).ok_or_else(|| {
                scan_error(column, format!("invalid boolean {:?}", s))
            })?),

            (ScanKind::Text, RawValue::Text(s)) => Value::Text(s),
            (ScanKind::Text, RawValue::Integer(v)) => Value::Text(v.to_string()),
            (ScanKind::Text, RawValue::Real(v)) => Value::Text(v.to_string()),
            (ScanKind::Text, RawValue::Blob(b)) => {
                Value::Text(String::from_utf8_lossy(&b).into_owned())
            }

            (ScanKind::Opaque, RawValue::Integer(v)) => Value::Int(v),
            (ScanKind::Opaque, RawValue::Real(v)) => Value::Float(v),
            (ScanKind::Opaque, RawValue::Text(s)) => Value::Text(s),
            (ScanKind::Opaque, RawValue::Blob(b)) => Value::Bytes(b),

            (kind, raw) => {
                return Err(scan_error(
                    column,
                    format!("cannot decode {:?} as {:?}", raw, kind),
                ))
            }
        };

        Ok(Some(value))
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn scan_error<E: std::fmt::Display>(column: &Column, err: E) -> Error {
    Error::Scan {
        column: column.name.clone(),
        reason: err.to_string(),
    }
}

/// Decodes result sets into records
///
/// Column keys come from the override map when it has an entry for the
/// physical column name, otherwise from the naming convention.
#[derive(Debug, Clone, Copy)]
pub struct RowDecoder<'a> {
    keys: Option<&'a HashMap<String, String>>,
    naming: &'a Naming,
}

impl<'a> RowDecoder<'a> {
    /// Create a decoder that derives every key from the naming convention
    pub fn new(naming: &'a Naming) -> Self {
        RowDecoder { keys: None, naming }
    }

    /// Use explicit keys for the columns present in `keys`
    pub fn with_keys(mut self, keys: &'a HashMap<String, String>) -> Self {
        self.keys = Some(keys);
        self
    }

    /// Run a query and decode every row
    pub fn fetch_all(&self, conn: &dyn Connection, sql: &str, args: &[Value]) -> Result<Vec<Record>> {
        debug!("query: {} {:?}", sql, args);
        let rows = conn.query(sql, args).map_err(Error::Execution)?;
        self.decode(rows, false)
    }

    /// Run a query and decode only its first row
    pub fn fetch_one(&self, conn: &dyn Connection, sql: &str, args: &[Value]) -> Result<Option<Record>> {
        debug!("query row: {} {:?}", sql, args);
        let rows = conn.query(sql, args).map_err(Error::Execution)?;
        Ok(self.decode(rows, true)?.into_iter().next())
    }

    /// Decode an already fetched result set
    pub fn decode(&self, mut rows: Rows, first_only: bool) -> Result<Vec<Record>> {
        let plan: Vec<(Column, ScanKind, String)> = rows
            .columns()
            .iter()
            .map(|col| {
                let kind = ScanKind::from_decl_type(col.decl_type.as_deref());
                (col.clone(), kind, self.key_for(&col.name))
            })
            .collect();

        let mut result = Vec::new();
        for raw_row in rows.by_ref() {
            let mut record = Record::with_capacity(plan.len());
            for ((column, kind, key), raw) in plan.iter().zip(raw_row) {
                if let Some(value) = kind.scan(column, raw)? {
                    record.insert(key.clone(), value);
                }
            }
            result.push(record);
            if first_only {
                break;
            }
        }
        Ok(result)
    }

    fn key_for(&self, column: &str) -> String {
        self.keys
            .and_then(|keys| keys.get(column))
            .filter(|key| !key.is_empty())
            .cloned()
            .unwrap_or_else(|| self.naming.key(column))
    }
}
