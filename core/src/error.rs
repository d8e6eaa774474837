//! Error types for the core crate
//!
//! This module provides a consolidated error type for the engine. Each
//! variant corresponds to one failure class: schema definition problems,
//! missing primary key values, rule violations, driver failures and
//! pre-flight guards.

use std::fmt;
use std::io;
use thiserror::Error;

use crate::db::DbError;

/// Error reported by a single validation rule
///
/// The engine wraps a violation into [`Error::Validation`] once it knows
/// which field was being validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Short machine-readable code, e.g. `"unique"`
    pub code: String,

    /// Human-readable message
    pub message: String,
}

impl Violation {
    /// Create a new violation
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Violation {
            code: code.into(),
            message: message.into(),
        }
    }

    /// The value already exists in the table
    pub fn unique() -> Self {
        Violation::new("unique", "already exists")
    }

    /// The value does not exist in the referenced table
    pub fn in_table() -> Self {
        Violation::new("in", "does not exist")
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for Violation {}

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid table or field definition
    #[error("Schema error: {0}")]
    Schema(String),

    /// A primary key value is missing
    #[error("{0}")]
    Key(String),

    /// A rule rejected a field value
    #[error("{field}: {violation}")]
    Validation {
        /// Title of the field that failed
        field: String,

        /// The rule's own error
        violation: Violation,
    },

    /// A rule rejected a value outside of any field
    #[error("{0}")]
    Invalid(Violation),

    /// Statement execution failed in the driver
    #[error(transparent)]
    Execution(DbError),

    /// The statement would be empty or meaningless
    #[error("{0}")]
    Preflight(String),

    /// A column value could not be decoded
    #[error("Scan error on column {column}: {reason}")]
    Scan {
        /// Physical column name
        column: String,

        /// What went wrong
        reason: String,
    },

    /// A delete guard refused the operation
    #[error("{0}")]
    Rejected(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Status code in the HTTP convention: 400 when the caller supplied
    /// bad input, 500 otherwise
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Key(_)
            | Error::Validation { .. }
            | Error::Invalid(_)
            | Error::Preflight(_)
            | Error::Rejected(_) => 400,
            _ => 500,
        }
    }

    /// Whether this error came from a validation rule
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::Validation { .. } | Error::Invalid(_))
    }

    /// The rule violation carried by this error, if any
    pub fn violation(&self) -> Option<&Violation> {
        match self {
            Error::Validation { violation, .. } | Error::Invalid(violation) => Some(violation),
            _ => None,
        }
    }
}

impl From<Violation> for Error {
    fn from(violation: Violation) -> Self {
        Error::Invalid(violation)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Execution(Box::new(err))
    }
}

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, Error>;

/// Convert a string error to a Config error
pub fn to_config_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Config(err.to_string())
}

/// Convert a string error to a Schema error
pub fn to_schema_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Schema(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        match err {
            Error::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }

        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Json(_) => {}
            _ => panic!("Expected Json variant"),
        }

        let err: Error = Violation::unique().into();
        assert!(err.is_validation());
        assert_eq!(err.violation().unwrap().code, "unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::Validation {
            field: "Email".to_string(),
            violation: Violation::unique(),
        };
        assert_eq!(err.to_string(), "Email: already exists");

        let err = Error::Schema("table name cannot be empty".to_string());
        assert_eq!(err.to_string(), "Schema error: table name cannot be empty");

        let err = to_config_error("bad level");
        assert_eq!(err.to_string(), "Configuration error: bad level");
    }

    #[test]
    fn test_execution_error_is_transparent() {
        let driver: DbError = "no such table: users".into();
        let err = Error::Execution(driver);
        assert_eq!(err.to_string(), "no such table: users");
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::Key("missing".into()).status_code(), 400);
        assert_eq!(Error::Preflight("empty".into()).status_code(), 400);
        assert_eq!(Error::Rejected("in use".into()).status_code(), 400);
        assert_eq!(to_schema_error("blank").status_code(), 500);
    }
}
