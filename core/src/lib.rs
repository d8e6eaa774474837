//! # Tablemap Core
//!
//! Schema-driven SQL mutations and NULL-safe row mapping.
//! This crate turns declarative table and field descriptions into
//! parameterized INSERT, UPDATE and DELETE statements, validates records
//! against rules that may consult the database, and decodes result sets
//! into records where SQL NULL columns are simply absent.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod db;
pub mod decode;
pub mod error;
pub mod models;
pub mod mutation;
pub mod schema;
pub mod sql;
pub mod utils;
pub mod validation;

/// Re-export common types for ease of use
pub use config::{EngineConfig, NamingConfig};
pub use db::{Connection, ExecResult, PLACEHOLDER};
pub use decode::RowDecoder;
pub use error::{Error, Violation};
pub use models::{Record, Value};
pub use mutation::{Context, Operation, Outcome};
pub use schema::{Field, Filter, Table, ValueSource};
pub use sql::{Query, Selector};
pub use validation::{In, Length, Matches, Required, Rule, Unique};

/// Result type for the core crate
pub type Result<T> = std::result::Result<T, Error>;

/// Version of the core crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
