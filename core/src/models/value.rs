//! Column values
//!
//! This module provides the dynamically typed value stored in records and
//! bound to statement placeholders.

use std::fmt::{Debug, Formatter, Result as FmtResult};
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};

/// Value of a single column
#[derive(Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,

    /// Boolean
    Bool(bool),

    /// Integer (64-bit)
    Int(i64),

    /// Floating point (64-bit)
    Float(f64),

    /// Text string
    Text(String),

    /// Binary data
    Bytes(Vec<u8>),

    /// Timestamp (UTC)
    Timestamp(DateTime<Utc>),
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Text(v) => {
                if v.chars().count() > 40 {
                    let head: String = v.chars().take(40).collect();
                    write!(f, "Text({:?}...)", head)
                } else {
                    write!(f, "Text({:?})", v)
                }
            }
            Value::Bytes(v) => {
                if v.len() > 16 {
                    write!(f, "Bytes({} bytes)", v.len())
                } else {
                    write!(f, "Bytes({})", hex::encode(v))
                }
            }
            Value::Timestamp(v) => write!(f, "Timestamp({})", v.to_rfc3339()),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                // Special handling for NaN
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            _ => false,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl Value {
    /// Whether the value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the text, if this is a text value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }

    /// The integer, if this is an integer value
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The float, if this is a numeric value
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            Value::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The boolean, if this is a boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nan_equality() {
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_ne!(Value::Float(1.0), Value::Int(1));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(Value::from(7), Value::Int(7));
        assert_eq!(Value::from("a"), Value::Text("a".to_string()));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
        assert_eq!(Value::Int(3).as_f64(), Some(3.0));
    }

    #[test]
    fn test_serializes_as_plain_json() {
        let json = serde_json::to_string(&vec![
            Value::Int(1),
            Value::Text("x".to_string()),
            Value::Null,
            Value::Bool(false),
        ])
        .unwrap();
        assert_eq!(json, r#"[1,"x",null,false]"#);
    }

    #[test]
    fn test_debug_is_compact() {
        assert_eq!(format!("{:?}", Value::Bytes(vec![0x0a, 0xff])), "Bytes(0aff)");
        assert_eq!(format!("{:?}", Value::Bytes(vec![0; 32])), "Bytes(32 bytes)");
        assert_eq!(format!("{:?}", Value::Text("hi".to_string())), "Text(\"hi\")");
    }
}
