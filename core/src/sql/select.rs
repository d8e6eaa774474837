//! SELECT statement builder
//!
//! Mutation statements are synthesized by the mutation engine itself; this
//! builder only renders SELECTs.

use std::fmt;

/// Parts of a SELECT statement
///
/// Empty parts are left out when rendering. An empty column list renders
/// as `*`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    /// Select list, e.g. `id, email`
    pub columns: String,

    /// Table or sub-select after FROM
    pub from: String,

    /// Join clauses, rendered in order
    pub joins: Vec<String>,

    /// WHERE condition without the keyword
    pub filter: String,

    /// ORDER BY list without the keyword
    pub order_by: String,

    /// Row limit
    pub limit: Option<u64>,

    /// Rows to skip
    pub offset: Option<u64>,
}

impl Selector {
    /// Create an empty selector
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the select list
    pub fn columns(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    /// Set the FROM source
    pub fn from(mut self, from: impl Into<String>) -> Self {
        self.from = from.into();
        self
    }

    /// Append a join clause, e.g. `LEFT JOIN roles ON roles.id = users.role_id`
    pub fn join(mut self, join: impl Into<String>) -> Self {
        self.joins.push(join.into());
        self
    }

    /// Replace the WHERE condition
    pub fn filter(mut self, condition: impl Into<String>) -> Self {
        self.filter = condition.into();
        self
    }

    /// AND another condition onto the WHERE clause
    pub fn where_and(mut self, condition: impl AsRef<str>) -> Self {
        self.filter = and_clauses(&self.filter, condition.as_ref());
        self
    }

    /// Set the ORDER BY list
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = order_by.into();
        self
    }

    /// Set the row limit
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set the number of rows to skip
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Combine with another selector
    ///
    /// Parts set in `other` replace ours, except WHERE conditions, which are
    /// AND-ed, and joins, which are appended.
    pub fn merge(&self, other: &Selector) -> Selector {
        let pick = |ours: &String, theirs: &String| {
            if theirs.is_empty() {
                ours.clone()
            } else {
                theirs.clone()
            }
        };

        Selector {
            columns: pick(&self.columns, &other.columns),
            from: pick(&self.from, &other.from),
            joins: self.joins.iter().chain(&other.joins).cloned().collect(),
            filter: and_clauses(&self.filter, &other.filter),
            order_by: pick(&self.order_by, &other.order_by),
            limit: other.limit.or(self.limit),
            offset: other.offset.or(self.offset),
        }
    }

    /// Render the statement
    pub fn sql(&self) -> String {
        let mut sql = String::from("SELECT ");
        if self.columns.trim().is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&self.columns);
        }

        if !self.from.is_empty() {
            sql.push_str(" FROM ");
            sql.push_str(&self.from);
        }
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }
        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter);
        }
        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by);
        }
        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {}", offset));
        }
        sql
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql())
    }
}

/// Join two conditions with AND, parenthesizing each; either may be empty
pub(crate) fn and_clauses(left: &str, right: &str) -> String {
    match (left.trim().is_empty(), right.trim().is_empty()) {
        (true, true) => String::new(),
        (false, true) => left.to_string(),
        (true, false) => right.to_string(),
        (false, false) => format!("({}) AND ({})", left, right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_full() {
        let sql = Selector::new()
            .columns("u.id, r.name")
            .from("users u")
            .join("LEFT JOIN roles r ON r.id = u.role_id")
            .filter("u.active = ?")
            .order_by("u.id DESC")
            .limit(10)
            .offset(20)
            .sql();

        assert_eq!(
            sql,
            "SELECT u.id, r.name FROM users u LEFT JOIN roles r ON r.id = u.role_id \
             WHERE u.active = ? ORDER BY u.id DESC LIMIT 10 OFFSET 20"
        );
    }

    #[test]
    fn test_render_minimal() {
        assert_eq!(Selector::new().from("users").sql(), "SELECT * FROM users");
    }

    #[test]
    fn test_where_and() {
        let selector = Selector::new().where_and("a = ?");
        assert_eq!(selector.filter, "a = ?");

        let selector = selector.where_and("b = ?");
        assert_eq!(selector.filter, "(a = ?) AND (b = ?)");
    }

    #[test]
    fn test_merge() {
        let base = Selector::new()
            .columns("id, email")
            .from("users")
            .filter("deleted = 0")
            .order_by("id");
        let caller = Selector::new().filter("email = ?").order_by("email").limit(1);

        let merged = base.merge(&caller);
        assert_eq!(merged.columns, "id, email");
        assert_eq!(merged.from, "users");
        assert_eq!(merged.filter, "(deleted = 0) AND (email = ?)");
        assert_eq!(merged.order_by, "email");
        assert_eq!(merged.limit, Some(1));
        assert_eq!(merged.offset, None);
        assert_eq!(
            merged.to_string(),
            "SELECT id, email FROM users WHERE (deleted = 0) AND (email = ?) ORDER BY email LIMIT 1"
        );
    }
}
