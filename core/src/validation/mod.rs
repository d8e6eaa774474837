//! Validation rules
//!
//! A [`Rule`] checks one field value. Rules that need the database (for
//! uniqueness or existence checks) implement [`Rule::validate_in`], which
//! receives the mutation [`Context`]; plain value rules only implement
//! [`Rule::validate`].
//!
//! Rules report failures as [`Error::Invalid`]. The mutation engine turns
//! that into [`Error::Validation`] carrying the field title, so the message
//! reads `"<title>: <rule message>"`.

pub mod guard;
mod rules;

pub use rules::{In, Length, Matches, Required, Unique};

use std::fmt;
use std::sync::Arc;
use log::{trace, warn};

use crate::error::{Error, Result, Violation};
use crate::models::Value;
use crate::mutation::Context;

/// A check applied to a field value
pub trait Rule: Send + Sync {
    /// Check a value on its own
    fn validate(&self, value: &Value) -> Result<()>;

    /// Check a value during a mutation
    ///
    /// Defaults to [`Rule::validate`]; rules that query the database
    /// override this.
    fn validate_in(&self, cx: &Context<'_>, value: &Value) -> Result<()> {
        let _ = cx;
        self.validate(value)
    }
}

/// A rule backed by a closure
pub struct FnRule<F> {
    f: F,
}

impl<F> fmt::Debug for FnRule<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FnRule(..)")
    }
}

impl<F> Rule for FnRule<F>
where
    F: Fn(&Value) -> std::result::Result<(), Violation> + Send + Sync,
{
    fn validate(&self, value: &Value) -> Result<()> {
        (self.f)(value).map_err(Error::Invalid)
    }
}

/// Turn a closure into a rule
pub fn rule_fn<F>(f: F) -> FnRule<F>
where
    F: Fn(&Value) -> std::result::Result<(), Violation> + Send + Sync,
{
    FnRule { f }
}

/// Run rules against a value outside of any mutation
///
/// Stops at the first failure.
pub fn validate_value(value: &Value, rules: &[Arc<dyn Rule>]) -> Result<()> {
    rules.iter().try_for_each(|rule| rule.validate(value))
}

/// Run the current field's rules during a mutation
///
/// Stops at the first failure. A rule's [`Violation`] is reported under
/// `title`; any other error, such as a failed count query, passes through
/// unchanged.
pub fn check_field(cx: &Context<'_>, title: &str, value: &Value) -> Result<()> {
    let field = match cx.field {
        Some(field) => field,
        None => return Ok(()),
    };

    for (i, rule) in field.validations.iter().enumerate() {
        trace!(
            "{} {}.{}: rule {} on {:?}",
            cx.op, cx.table.name, field.name, i, value
        );

        match rule.validate_in(cx, value) {
            Ok(()) => {}
            Err(Error::Invalid(violation)) => {
                warn!(
                    "{} on {} rejected: {}: {}",
                    cx.op, cx.table.name, title, violation
                );
                return Err(Error::Validation {
                    field: title.to_string(),
                    violation,
                });
            }
            Err(err) => return Err(err),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{ExecResult, MockConnection};
    use crate::mutation::Operation;
    use crate::record;
    use crate::schema::{Field, Table};

    fn no_x() -> Arc<dyn Rule> {
        Arc::new(rule_fn(|value| match value.as_str() {
            Some(s) if s.contains('x') => Err(Violation::new("no_x", "must not contain x")),
            _ => Ok(()),
        }))
    }

    #[test]
    fn test_validate_value_short_circuits() {
        let rules: Vec<Arc<dyn Rule>> = vec![Arc::new(Required), no_x()];

        assert!(validate_value(&Value::from("abc"), &rules).is_ok());

        match validate_value(&Value::Null, &rules) {
            Err(Error::Invalid(v)) => assert_eq!(v.code, "required"),
            other => panic!("Expected required violation, got {:?}", other),
        }

        match validate_value(&Value::from("xyz"), &rules) {
            Err(Error::Invalid(v)) => assert_eq!(v.message, "must not contain x"),
            other => panic!("Expected no_x violation, got {:?}", other),
        }
    }

    #[test]
    fn test_check_field_attaches_title() {
        let mut conn = MockConnection::new();
        conn.expect_exec().never().returning(|_, _| Ok(ExecResult::default()));

        let table = Table::new(
            "notes",
            vec![Field::new("body_text").rule(Required).rule(rule_fn(|_| {
                Err(Violation::new("never", "unreachable"))
            }))],
        );
        let mut cx = Context::new(Operation::Insert, &conn, &table, record! {});
        cx.field = table.fields().first();

        let err = check_field(&cx, "Body Text", &Value::from("  ")).unwrap_err();
        assert_eq!(err.to_string(), "Body Text: cannot be blank");
        assert_eq!(err.violation().map(|v| v.code.as_str()), Some("required"));
    }

    #[test]
    fn test_check_field_without_field_is_noop() {
        let conn = MockConnection::new();
        let table = Table::new("notes", vec![]);
        let cx = Context::new(Operation::Update, &conn, &table, record! {});
        assert!(check_field(&cx, "Anything", &Value::Null).is_ok());
    }
}
