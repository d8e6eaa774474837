//! Table and field schema
//!
//! This module provides the declarative description of a table: its
//! [`Field`]s, the [`Layout`] derived from them when the table is opened,
//! and the primary-key and count helpers the mutation engine and the
//! database-backed rules build on.

mod field;
mod filter;
mod table;

pub use field::{current_timestamp, Field, ValueSource};
pub use filter::Filter;
pub use table::{Layout, Table};
