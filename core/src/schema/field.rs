//! Field descriptors
//!
//! A [`Field`] describes one table column: its physical name, the key it is
//! exposed under, role flags, value sources for inserts and updates, and the
//! validation rules applied to it.

use std::fmt;
use std::sync::Arc;
use chrono::{DateTime, Utc};

use crate::models::Value;
use crate::utils::Naming;
use crate::validation::Rule;

/// Where a default or on-update value comes from
///
/// Providers are invoked on every mutation and their results are never
/// cached, so time-dependent values stay current.
#[derive(Clone)]
pub enum ValueSource {
    /// A fixed value
    Literal(Value),

    /// A function producing the value when it is needed
    Provider(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ValueSource {
    /// Wrap a value-producing function
    pub fn provider<F>(f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        ValueSource::Provider(Arc::new(f))
    }

    /// A provider returning the current UTC time
    pub fn now() -> Self {
        ValueSource::provider(current_timestamp)
    }

    /// Produce the value
    pub fn resolve(&self) -> Value {
        match self {
            ValueSource::Literal(value) => value.clone(),
            ValueSource::Provider(f) => f(),
        }
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ValueSource::Provider(_) => f.write_str("Provider(..)"),
        }
    }
}

macro_rules! literal_from {
    ($($t:ty),+) => {
        $(
            impl From<$t> for ValueSource {
                fn from(value: $t) -> Self {
                    ValueSource::Literal(Value::from(value))
                }
            }
        )+
    };
}

literal_from!(Value, bool, i32, i64, f64, &str, String, DateTime<Utc>);

/// The current UTC time as a value
pub fn current_timestamp() -> Value {
    Value::Timestamp(Utc::now())
}

/// Definition of a column in a table schema
#[derive(Clone, Default)]
pub struct Field {
    /// Physical column name
    pub name: String,

    /// External key; derived from `name` when unset
    pub key: Option<String>,

    /// Display title used in error messages; derived from `name` when unset
    pub title: Option<String>,

    /// Whether the column is part of the primary key
    pub primary_key: bool,

    /// Whether the database assigns the column's value
    pub auto_increment: bool,

    /// Whether callers may not set the column directly
    pub read_only: bool,

    /// Value used on insert when the record has none
    pub default: Option<ValueSource>,

    /// Value used on update when the record has none, or always when read-only
    pub on_update: Option<ValueSource>,

    /// Rules run in order; the first failure wins
    pub validations: Vec<Arc<dyn Rule>>,
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("title", &self.title)
            .field("primary_key", &self.primary_key)
            .field("auto_increment", &self.auto_increment)
            .field("read_only", &self.read_only)
            .field("default", &self.default)
            .field("on_update", &self.on_update)
            .field("validations", &self.validations.len())
            .finish()
    }
}

impl Field {
    /// Create a field for a physical column name
    pub fn new(name: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the external key
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set the display title
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Mark the field as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Mark the field as assigned by the database
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Mark the field as not directly writable
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Set the insert default
    pub fn default_value(mut self, source: impl Into<ValueSource>) -> Self {
        self.default = Some(source.into());
        self
    }

    /// Set the insert default to a value-producing function
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = Some(ValueSource::provider(f));
        self
    }

    /// Set the on-update value
    pub fn on_update(mut self, source: impl Into<ValueSource>) -> Self {
        self.on_update = Some(source.into());
        self
    }

    /// Set the on-update value to a value-producing function
    pub fn on_update_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.on_update = Some(ValueSource::provider(f));
        self
    }

    /// Append a validation rule
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.validations.push(Arc::new(rule));
        self
    }

    /// The external key, derived with `naming` when unset
    pub fn key_with(&self, naming: &Naming) -> String {
        match &self.key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => naming.key(&self.name),
        }
    }

    /// The display title, derived with `naming` when unset
    pub fn title_with(&self, naming: &Naming) -> String {
        match &self.title {
            Some(title) if !title.is_empty() => title.clone(),
            _ => naming.title(&self.name),
        }
    }

    /// Resolve the insert default; `Null` when none is configured
    pub fn resolve_default(&self) -> Value {
        self.default.as_ref().map_or(Value::Null, ValueSource::resolve)
    }

    /// Resolve the on-update value; `Null` when none is configured
    pub fn resolve_on_update(&self) -> Value {
        self.on_update.as_ref().map_or(Value::Null, ValueSource::resolve)
    }
}
