//! SELECT building and multi-table queries

pub mod query;
pub mod select;

pub use query::Query;
pub use select::Selector;
