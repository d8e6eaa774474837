//! Data models for records
//!
//! This module provides the value type and the record mapping that flow
//! between callers, the mutation engine and the row decoder.

mod value;

pub use value::Value;

use std::collections::HashMap;

/// One row keyed by external key
///
/// Keys are not guaranteed to cover every field of a table.
pub type Record = HashMap<String, Value>;

/// Build a [`Record`] from `key => value` pairs
///
/// ```
/// use tablemap_core::record;
///
/// let rec = record! { "id" => 1, "email" => "a@x.com" };
/// assert_eq!(rec.len(), 2);
/// ```
#[macro_export]
macro_rules! record {
    () => {
        $crate::models::Record::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::models::Record::new();
        $(
            record.insert(::std::string::String::from($key), $crate::models::Value::from($value));
        )+
        record
    }};
}
