//! Built-in rules

use std::sync::Arc;
use regex::Regex;

use crate::error::{to_schema_error, Error, Result, Violation};
use crate::models::Value;
use crate::mutation::{Context, Operation};
use crate::schema::Table;

use super::Rule;

/// The value must not already exist in the table
///
/// On insert, counts rows whose column equals the value. On update, the
/// record's own row is excluded by primary key, so saving a row with its
/// current value passes. `Null` never collides, as with a SQL UNIQUE
/// constraint. Outside a mutation there is nothing to count.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unique;

impl Rule for Unique {
    fn validate(&self, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn validate_in(&self, cx: &Context<'_>, value: &Value) -> Result<()> {
        let field = match cx.field {
            Some(field) if !value.is_null() => field,
            _ => return Ok(()),
        };

        let count = match cx.op {
            Operation::Update => cx.table.count_record(cx.conn, field, &cx.record, true, None)?,
            _ => cx.table.count_value(cx.conn, &field.name, value, None)?,
        };

        if count > 0 {
            Err(Violation::unique().into())
        } else {
            Ok(())
        }
    }
}

/// The value must exist in a column of another table
///
/// Used for foreign-key style checks. `Null` passes; combine with
/// [`Required`] when the reference is mandatory.
#[derive(Debug, Clone)]
pub struct In {
    table: Arc<Table>,
    column: String,
}

impl In {
    /// Require values to appear in `column` of `table`
    pub fn new(table: Arc<Table>, column: impl Into<String>) -> Self {
        In {
            table,
            column: column.into(),
        }
    }
}

impl Rule for In {
    fn validate(&self, _value: &Value) -> Result<()> {
        Ok(())
    }

    fn validate_in(&self, cx: &Context<'_>, value: &Value) -> Result<()> {
        if value.is_null() {
            return Ok(());
        }

        if self.table.count_value(cx.conn, &self.column, value, None)? == 0 {
            Err(Violation::in_table().into())
        } else {
            Ok(())
        }
    }
}

/// The value must not be `Null` or blank text
#[derive(Debug, Clone, Copy, Default)]
pub struct Required;

impl Rule for Required {
    fn validate(&self, value: &Value) -> Result<()> {
        let blank = match value {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            Value::Bytes(b) => b.is_empty(),
            _ => false,
        };

        if blank {
            Err(Violation::new("required", "cannot be blank").into())
        } else {
            Ok(())
        }
    }
}

/// Text length in characters must be within bounds
///
/// A `max` of 0 means no upper bound. Non-text values pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Length {
    min: usize,
    max: usize,
}

impl Length {
    /// Create a length rule
    pub fn new(min: usize, max: usize) -> Self {
        Length { min, max }
    }
}

impl Rule for Length {
    fn validate(&self, value: &Value) -> Result<()> {
        let len = match value {
            Value::Text(s) => s.chars().count(),
            _ => return Ok(()),
        };

        if len < self.min || (self.max > 0 && len > self.max) {
            let message = if self.max == 0 {
                format!("the length must be no less than {}", self.min)
            } else if self.min == 0 {
                format!("the length must be no more than {}", self.max)
            } else {
                format!("the length must be between {} and {}", self.min, self.max)
            };
            return Err(Violation::new("length", message).into());
        }

        Ok(())
    }
}

/// Text must match a regular expression
///
/// Non-text values pass.
#[derive(Debug, Clone)]
pub struct Matches {
    regex: Regex,
    message: String,
}

impl Matches {
    /// Compile `pattern`
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Matches {
            regex: Regex::new(pattern).map_err(to_schema_error)?,
            message: "must be in a valid format".to_string(),
        })
    }

    /// Replace the failure message
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

impl Rule for Matches {
    fn validate(&self, value: &Value) -> Result<()> {
        match value {
            Value::Text(s) if !self.regex.is_match(s) => {
                Err(Error::Invalid(Violation::new("match", self.message.clone())))
            }
            _ => Ok(()),
        }
    }
}
