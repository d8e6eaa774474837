//! WHERE conditions with their arguments

use crate::models::Value;
use crate::sql::select::and_clauses;

/// A WHERE condition plus the values for its placeholders, in order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    /// Condition without the WHERE keyword
    pub clause: String,

    /// Positional arguments
    pub args: Vec<Value>,
}

impl Filter {
    /// Create a filter
    pub fn new(clause: impl Into<String>, args: Vec<Value>) -> Self {
        Filter {
            clause: clause.into(),
            args,
        }
    }

    /// Whether the filter has no condition
    pub fn is_empty(&self) -> bool {
        self.clause.trim().is_empty()
    }

    /// AND another filter onto this one; arguments keep clause order
    pub fn and(mut self, other: Filter) -> Filter {
        self.clause = and_clauses(&self.clause, &other.clause);
        self.args.extend(other.args);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_and() {
        let filter = Filter::new("TRIM(email) = ?", vec![Value::from("a@x.com")])
            .and(Filter::new("id <> ?", vec![Value::Int(1)]));

        assert_eq!(filter.clause, "(TRIM(email) = ?) AND (id <> ?)");
        assert_eq!(filter.args, vec![Value::from("a@x.com"), Value::Int(1)]);
    }

    #[test]
    fn test_and_with_empty() {
        let filter = Filter::new("a IS NULL", vec![]).and(Filter::default());
        assert_eq!(filter.clause, "a IS NULL");
        assert!(Filter::default().is_empty());
    }
}
