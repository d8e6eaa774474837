//! Table schema
//!
//! A [`Table`] is a physical table name plus its ordered fields. The column
//! list, key map and primary key positions are derived once, on first use,
//! and dropped again by [`Table::close`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use log::debug;

use crate::config::EngineConfig;
use crate::db::{Connection, RawValue, PLACEHOLDER};
use crate::decode::RowDecoder;
use crate::error::{Error, Result};
use crate::models::{Record, Value};
use crate::mutation::{Action, Context, Outcome};
use crate::sql::Selector;
use crate::utils::{Derived, Naming};

use super::{Field, Filter};

/// State derived from the field list when a table is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Physical column names in field order
    pub columns: Vec<String>,

    /// Comma-separated select list; `*` when there are no fields
    pub column_list: String,

    /// External keys in field order
    pub keys: Vec<String>,

    /// Display titles in field order
    pub titles: Vec<String>,

    /// External key by physical column name
    pub keys_by_column: HashMap<String, String>,

    /// Positions of primary key fields
    pub primary_key: Vec<usize>,

    /// Position of the first auto-increment field
    pub auto_increment: Option<usize>,
}

impl Layout {
    fn derive(name: &str, fields: &[Field], naming: &Naming) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::Schema("table name cannot be empty".to_string()));
        }

        let mut layout = Layout {
            columns: Vec::with_capacity(fields.len()),
            column_list: String::new(),
            keys: Vec::with_capacity(fields.len()),
            titles: Vec::with_capacity(fields.len()),
            keys_by_column: HashMap::with_capacity(fields.len()),
            primary_key: Vec::new(),
            auto_increment: None,
        };

        for (i, field) in fields.iter().enumerate() {
            if field.name.trim().is_empty() {
                return Err(Error::Schema(format!(
                    "table {}: field {} has an empty name",
                    name, i
                )));
            }

            let key = field.key_with(naming);
            layout.columns.push(field.name.clone());
            layout.keys_by_column.insert(field.name.clone(), key.clone());
            layout.keys.push(key);
            layout.titles.push(field.title_with(naming));

            if field.primary_key {
                layout.primary_key.push(i);
            }
            if field.auto_increment && layout.auto_increment.is_none() {
                layout.auto_increment = Some(i);
            }
        }

        layout.column_list = if layout.columns.is_empty() {
            "*".to_string()
        } else {
            layout.columns.join(", ")
        };

        Ok(layout)
    }
}

/// Schema of a database table
pub struct Table {
    /// Physical table name
    pub name: String,

    /// Replaces the default insert when set
    pub on_insert: Option<Action>,

    /// Replaces the default update when set
    pub on_update: Option<Action>,

    /// Replaces the default delete when set
    pub on_delete: Option<Action>,

    fields: Vec<Field>,
    naming: Naming,
    layout: Derived<Layout>,
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .field("on_insert", &self.on_insert.is_some())
            .field("on_update", &self.on_update.is_some())
            .field("on_delete", &self.on_delete.is_some())
            .field("open", &self.is_open())
            .finish()
    }
}

impl Table {
    /// Create a table with the default naming convention
    pub fn new(name: impl Into<String>, fields: Vec<Field>) -> Self {
        Table {
            name: name.into(),
            fields,
            on_insert: None,
            on_update: None,
            on_delete: None,
            naming: Naming::default(),
            layout: Derived::new(),
        }
    }

    /// Use a specific naming convention
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self.layout.reset();
        self
    }

    /// Use the naming convention of an engine configuration
    pub fn with_config(self, config: &EngineConfig) -> Self {
        self.with_naming(config.naming())
    }

    /// Replace the field list
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.fields = fields;
        self.layout.reset();
        self
    }

    /// Append a field; the layout is re-derived on next use
    pub fn push_field(&mut self, field: Field) {
        self.fields.push(field);
        self.layout.reset();
    }

    /// Fields in column order
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Run `hook` instead of the default insert
    pub fn with_insert_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_insert = Some(Arc::new(hook));
        self
    }

    /// Run `hook` instead of the default update
    pub fn with_update_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_update = Some(Arc::new(hook));
        self
    }

    /// Run `hook` instead of the default delete
    pub fn with_delete_hook<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(Context<'a>) -> Result<Outcome<'a>> + Send + Sync + 'static,
    {
        self.on_delete = Some(Arc::new(hook));
        self
    }

    /// The naming convention used for keys and titles
    pub fn naming(&self) -> &Naming {
        &self.naming
    }

    /// Validate the definition and derive the layout
    ///
    /// Repeated calls return the same layout until [`Table::close`].
    pub fn open(&self) -> Result<Arc<Layout>> {
        self.layout
            .get_or_try_init(|| Layout::derive(&self.name, &self.fields, &self.naming))
    }

    /// Drop the derived layout so the next call re-derives it
    pub fn close(&self) {
        self.layout.reset();
    }

    /// Whether the layout has been derived
    pub fn is_open(&self) -> bool {
        self.layout.is_set()
    }

    /// Look up a field by physical column name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// External key of a field of this table
    pub fn key_of(&self, field: &Field) -> String {
        field.key_with(&self.naming)
    }

    /// Display title of a field of this table
    pub fn title_of(&self, field: &Field) -> String {
        field.title_with(&self.naming)
    }

    /// Select rows, decoded with this table's keys
    ///
    /// The selector's column list and FROM default to this table's.
    pub fn select(&self, conn: &dyn Connection, selector: &Selector, args: &[Value]) -> Result<Vec<Record>> {
        let layout = self.open()?;
        let sql = self.base_selector(&layout).merge(selector).sql();
        RowDecoder::new(&self.naming)
            .with_keys(&layout.keys_by_column)
            .fetch_all(conn, &sql, args)
    }

    /// Select the first matching row
    pub fn select_one(&self, conn: &dyn Connection, selector: &Selector, args: &[Value]) -> Result<Option<Record>> {
        let layout = self.open()?;
        let sql = self.base_selector(&layout).merge(selector).sql();
        RowDecoder::new(&self.naming)
            .with_keys(&layout.keys_by_column)
            .fetch_one(conn, &sql, args)
    }

    fn base_selector(&self, layout: &Layout) -> Selector {
        Selector::new().columns(layout.column_list.clone()).from(self.name.clone())
    }

    /// Condition addressing the record's row by primary key
    pub fn where_primary_key(&self, record: &Record) -> Result<Filter> {
        let layout = self.open()?;
        if layout.primary_key.is_empty() {
            return Err(Error::Schema(format!(
                "table {}: no primary key defined",
                self.name
            )));
        }

        let mut conditions = Vec::with_capacity(layout.primary_key.len());
        let mut args = Vec::with_capacity(layout.primary_key.len());
        for &i in &layout.primary_key {
            let key = &layout.keys[i];
            match record.get(key) {
                Some(value) if !value.is_null() => {
                    conditions.push(format!("{} = {}", layout.columns[i], PLACEHOLDER));
                    args.push(value.clone());
                }
                _ => {
                    return Err(Error::Key(format!(
                        "primary key {} is required in record",
                        key
                    )))
                }
            }
        }

        Ok(Filter::new(conditions.join(" AND "), args))
    }

    /// Condition excluding the record's row by primary key
    ///
    /// Only the row matching every key column is left out, so rows sharing
    /// part of a composite key still count.
    pub fn exclude_primary_key(&self, record: &Record) -> Result<Filter> {
        let own = self.where_primary_key(record)?;
        Ok(Filter::new(format!("NOT ({})", own.clause), own.args))
    }

    /// Count rows, optionally restricted by a filter
    pub fn count(&self, conn: &dyn Connection, filter: Option<&Filter>) -> Result<i64> {
        self.open()?;

        let mut sql = format!("SELECT COUNT(*) FROM {}", self.name);
        let args: &[Value] = match filter {
            Some(filter) if !filter.is_empty() => {
                sql.push_str(" WHERE ");
                sql.push_str(&filter.clause);
                &filter.args
            }
            _ => &[],
        };

        debug!("count: {} {:?}", sql, args);
        let mut rows = conn.query(&sql, args).map_err(Error::Execution)?;
        match rows.next().and_then(|row| row.into_iter().next()) {
            Some(RawValue::Integer(n)) => Ok(n),
            Some(RawValue::Real(n)) => Ok(n as i64),
            other => Err(Error::Scan {
                column: "COUNT(*)".to_string(),
                reason: format!("expected an integer, got {:?}", other),
            }),
        }
    }

    /// Count rows whose `column` equals `value`
    ///
    /// `Null` matches with IS NULL. Text is compared trimmed on both sides.
    /// `extra` is AND-ed after the value condition.
    pub fn count_value(
        &self,
        conn: &dyn Connection,
        column: &str,
        value: &Value,
        extra: Option<Filter>,
    ) -> Result<i64> {
        let filter = match value {
            Value::Null => Filter::new(format!("{} IS NULL", column), vec![]),
            Value::Text(s) => Filter::new(
                format!("TRIM({}) = {}", column, PLACEHOLDER),
                vec![Value::Text(s.trim().to_string())],
            ),
            other => Filter::new(format!("{} = {}", column, PLACEHOLDER), vec![other.clone()]),
        };

        let filter = match extra {
            Some(extra) => filter.and(extra),
            None => filter,
        };
        self.count(conn, Some(&filter))
    }

    /// Count rows sharing the record's value for `field`
    ///
    /// With `exclude_self`, the record's own row is left out by primary key.
    pub fn count_record(
        &self,
        conn: &dyn Connection,
        field: &Field,
        record: &Record,
        exclude_self: bool,
        extra: Option<Filter>,
    ) -> Result<i64> {
        let value = record.get(&self.key_of(field)).cloned().unwrap_or_default();

        let extra = if exclude_self {
            let own = self.exclude_primary_key(record)?;
            Some(match extra {
                Some(extra) => own.and(extra),
                None => own,
            })
        } else {
            extra
        };

        self.count_value(conn, &field.name, &value, extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NamingConfig;
    use crate::db::{Column, ExecResult, MockConnection, Rows};
    use crate::record;
    use proptest::prelude::*;

    fn users() -> Table {
        Table::new(
            "users",
            vec![
                Field::new("id").primary_key().auto_increment(),
                Field::new("email"),
                Field::new("display_name"),
            ],
        )
    }

    fn count_rows(n: i64) -> Rows {
        Rows::new(vec![Column::new("COUNT(*)", None)], vec![vec![RawValue::Integer(n)]])
    }

    #[test]
    fn test_open_derives_layout() {
        let table = users();
        assert!(!table.is_open());

        let layout = table.open().unwrap();
        assert!(table.is_open());
        assert_eq!(layout.columns, vec!["id", "email", "display_name"]);
        assert_eq!(layout.column_list, "id, email, display_name");
        assert_eq!(layout.keys, vec!["id", "email", "displayName"]);
        assert_eq!(layout.titles, vec!["ID", "Email", "Display Name"]);
        assert_eq!(layout.keys_by_column["display_name"], "displayName");
        assert_eq!(layout.primary_key, vec![0]);
        assert_eq!(layout.auto_increment, Some(0));

        assert!(Arc::ptr_eq(&layout, &table.open().unwrap()));
    }

    #[test]
    fn test_open_rejects_blank_names() {
        let table = Table::new("  ", vec![Field::new("id")]);
        match table.open() {
            Err(Error::Schema(msg)) => assert_eq!(msg, "table name cannot be empty"),
            other => panic!("Expected schema error, got {:?}", other),
        }

        let table = Table::new("t", vec![Field::new("id"), Field::new("")]);
        match table.open() {
            Err(Error::Schema(msg)) => assert!(msg.contains("field 1")),
            other => panic!("Expected schema error, got {:?}", other),
        }
        assert!(!table.is_open());
    }

    #[test]
    fn test_close_allows_redefinition() {
        let mut table = users();
        table.open().unwrap();
        table.close();
        assert!(!table.is_open());

        table.push_field(Field::new("created_on"));
        assert_eq!(table.open().unwrap().columns.len(), 4);
    }

    #[test]
    fn test_push_field_rederives_open_layout() {
        let mut table = users();
        assert_eq!(table.open().unwrap().columns.len(), 3);

        table.push_field(Field::new("created_on"));
        assert!(!table.is_open());
        let layout = table.open().unwrap();
        assert_eq!(layout.columns.len(), 4);
        assert_eq!(layout.keys[3], "createdOn");

        let table = table.with_fields(vec![Field::new("id").primary_key()]);
        assert_eq!(table.open().unwrap().columns, vec!["id"]);
    }

    #[test]
    fn test_empty_table_selects_star() {
        let table = Table::new("things", vec![]);
        assert_eq!(table.open().unwrap().column_list, "*");
    }

    #[test]
    fn test_naming_from_config() {
        let mut config = EngineConfig::default();
        config.naming = NamingConfig {
            enabled: false,
            uppercase_words: vec![],
        };
        let table = users().with_config(&config);
        assert_eq!(table.open().unwrap().keys[2], "display_name");
    }

    #[test]
    fn test_where_primary_key() {
        let table = Table::new(
            "memberships",
            vec![
                Field::new("org_id").primary_key(),
                Field::new("role"),
                Field::new("user_id").primary_key(),
            ],
        );

        let filter = table
            .where_primary_key(&record! { "orgID" => 3, "userID" => 9 })
            .unwrap();
        assert_eq!(filter.clause, "org_id = ? AND user_id = ?");
        assert_eq!(filter.args, vec![Value::Int(3), Value::Int(9)]);

        let filter = table
            .exclude_primary_key(&record! { "orgID" => 3, "userID" => 9 })
            .unwrap();
        assert_eq!(filter.clause, "NOT (org_id = ? AND user_id = ?)");
        assert_eq!(filter.args, vec![Value::Int(3), Value::Int(9)]);
    }

    #[test]
    fn test_where_primary_key_errors() {
        let table = users();
        match table.where_primary_key(&record! { "email" => "a@x.com" }) {
            Err(Error::Key(msg)) => assert_eq!(msg, "primary key id is required in record"),
            other => panic!("Expected key error, got {:?}", other),
        }

        let table = Table::new("log", vec![Field::new("line")]);
        match table.where_primary_key(&record! { "line" => "x" }) {
            Err(Error::Schema(_)) => {}
            other => panic!("Expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_count_value_trims_text() {
        let mut conn = MockConnection::new();
        conn.expect_query()
            .withf(|sql, args| {
                sql == "SELECT COUNT(*) FROM users WHERE (TRIM(email) = ?) AND (id <> ?)"
                    && args == [Value::from("a@x.com"), Value::Int(1)]
            })
            .times(1)
            .returning(|_, _| Ok(count_rows(2)));
        conn.expect_exec().never().returning(|_, _| Ok(ExecResult::default()));

        let table = users();
        let extra = Filter::new("id <> ?", vec![Value::Int(1)]);
        let n = table
            .count_value(&conn, "email", &Value::from("  a@x.com "), Some(extra))
            .unwrap();
        assert_eq!(n, 2);
    }

    #[test]
    fn test_count_value_null() {
        let mut conn = MockConnection::new();
        conn.expect_query()
            .withf(|sql, args| sql == "SELECT COUNT(*) FROM users WHERE email IS NULL" && args.is_empty())
            .returning(|_, _| Ok(count_rows(0)));

        assert_eq!(users().count_value(&conn, "email", &Value::Null, None).unwrap(), 0);
    }

    #[test]
    fn test_count_record_excludes_self() {
        let mut conn = MockConnection::new();
        conn.expect_query()
            .withf(|sql, args| {
                sql == "SELECT COUNT(*) FROM users WHERE (TRIM(email) = ?) AND (NOT (id = ?))"
                    && args == [Value::from("b@x.com"), Value::Int(1)]
            })
            .returning(|_, _| Ok(count_rows(0)));

        let table = users();
        let email = table.field("email").unwrap();
        let record = record! { "id" => 1, "email" => "b@x.com" };
        assert_eq!(table.count_record(&conn, email, &record, true, None).unwrap(), 0);
    }

    #[test]
    fn test_count_and_select_against_sqlite() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE users (id INT PRIMARY KEY, email VARCHAR(100), display_name TEXT);
             INSERT INTO users VALUES (1, 'a@x.com', NULL), (2, ' b@x.com', 'Bee');",
        )
        .unwrap();

        let table = users();
        assert_eq!(table.count(&conn, None).unwrap(), 2);
        assert_eq!(
            table.count_value(&conn, "email", &Value::from("b@x.com"), None).unwrap(),
            1
        );

        let rows = table
            .select(&conn, &Selector::new().order_by("id"), &[])
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].contains_key("displayName"));
        assert_eq!(rows[1].get("displayName"), Some(&Value::from("Bee")));

        let row = table
            .select_one(&conn, &Selector::new().filter("id = ?"), &[Value::Int(2)])
            .unwrap()
            .unwrap();
        assert_eq!(row.get("id"), Some(&Value::Int(2)));
    }

    proptest! {
        #[test]
        fn prop_primary_key_clause_follows_schema_order(
            flags in prop::collection::vec(any::<bool>(), 1..8),
            base in 0i64..1000,
        ) {
            prop_assume!(flags.iter().any(|&pk| pk));

            let fields: Vec<Field> = flags
                .iter()
                .enumerate()
                .map(|(i, &pk)| {
                    let field = Field::new(format!("col_{}", i));
                    if pk { field.primary_key() } else { field }
                })
                .collect();
            let table = Table::new("t", fields);

            let mut record = Record::new();
            for i in 0..flags.len() {
                record.insert(format!("col{}", i), Value::Int(base + i as i64));
            }

            let filter = table.where_primary_key(&record).unwrap();
            let expected: Vec<String> = flags
                .iter()
                .enumerate()
                .filter(|(_, pk)| **pk)
                .map(|(i, _)| format!("col_{} = ?", i))
                .collect();
            let expected_args: Vec<Value> = flags
                .iter()
                .enumerate()
                .filter(|(_, pk)| **pk)
                .map(|(i, _)| Value::Int(base + i as i64))
                .collect();

            prop_assert_eq!(filter.clause, expected.join(" AND "));
            prop_assert_eq!(filter.args, expected_args);
        }
    }
}
