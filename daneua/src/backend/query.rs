//! Read filters
//!
//! A `Query` is the small filter language every backend understands:
//! column comparisons, null checks, one explicit order and a limit.
//! The same query also filters change-feed rows on the client.

use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Op {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Neq => "!=",
            Op::Gt => ">",
            Op::Gte => ">=",
            Op::Lt => "<",
            Op::Lte => "<=",
        }
    }

    fn accepts(&self, ordering: Ordering) -> bool {
        match self {
            Op::Eq => ordering == Ordering::Equal,
            Op::Neq => ordering != Ordering::Equal,
            Op::Gt => ordering == Ordering::Greater,
            Op::Gte => ordering != Ordering::Less,
            Op::Lt => ordering == Ordering::Less,
            Op::Lte => ordering != Ordering::Greater,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare { field: String, op: Op, value: Value },
    IsNull(String),
    NotNull(String),
}

impl Filter {
    pub fn field(&self) -> &str {
        match self {
            Filter::Compare { field, .. } | Filter::IsNull(field) | Filter::NotNull(field) => field,
        }
    }

    /// Evaluate against a JSON row. Missing fields count as null; values of
    /// different JSON types never compare.
    pub fn matches(&self, row: &Value) -> bool {
        let actual = row.get(self.field()).unwrap_or(&Value::Null);
        match self {
            Filter::IsNull(_) => actual.is_null(),
            Filter::NotNull(_) => !actual.is_null(),
            Filter::Compare { op, value, .. } => {
                compare(actual, value).is_some_and(|ordering| op.accepts(ordering))
            }
        }
    }
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub field: String,
    pub ascending: bool,
}

/// Filter, order and limit for a read
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u32>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    fn compare(mut self, field: &str, op: Op, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Compare {
            field: field.to_string(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn eq(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Eq, value)
    }

    pub fn neq(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Neq, value)
    }

    pub fn gt(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Gt, value)
    }

    pub fn gte(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Gte, value)
    }

    pub fn lt(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Lt, value)
    }

    pub fn lte(self, field: &str, value: impl Into<Value>) -> Self {
        self.compare(field, Op::Lte, value)
    }

    pub fn is_null(mut self, field: &str) -> Self {
        self.filters.push(Filter::IsNull(field.to_string()));
        self
    }

    pub fn not_null(mut self, field: &str) -> Self {
        self.filters.push(Filter::NotNull(field.to_string()));
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order = Some(Order {
            field: field.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether a row passes every filter. Order and limit are ignored.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters.iter().all(|f| f.matches(row))
    }

    /// Every field the query references, for validation by backends that
    /// splice field names into their own query language.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.filters
            .iter()
            .map(Filter::field)
            .chain(self.order.iter().map(|o| o.field.as_str()))
    }
}

/// Field names are plain identifiers
pub fn is_valid_field(field: &str) -> bool {
    !field.is_empty()
        && field.len() <= 64
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_matches_equality_and_ranges() {
        let row = json!({
            "to_user": "dane",
            "read": false,
            "view_count": 3,
            "due_date": "2026-10-15"
        });

        assert!(Query::new().eq("to_user", "dane").matches(&row));
        assert!(!Query::new().eq("to_user", "shah").matches(&row));
        assert!(Query::new().eq("read", false).matches(&row));
        assert!(Query::new().gte("view_count", 3).lt("view_count", 4).matches(&row));
        assert!(Query::new().lte("due_date", "2026-10-15").matches(&row));
        assert!(!Query::new().gt("due_date", "2026-10-15").matches(&row));
    }

    #[test]
    fn test_missing_fields_are_null() {
        let row = json!({"title": "x", "unlock_date": null});

        assert!(Query::new().is_null("unlock_date").matches(&row));
        assert!(Query::new().is_null("category").matches(&row));
        assert!(!Query::new().not_null("category").matches(&row));
        assert!(!Query::new().eq("category", "music").matches(&row));
        assert!(!Query::new().neq("category", "music").matches(&row));
    }

    #[test]
    fn test_mismatched_types_never_compare() {
        let row = json!({"position": "3"});
        assert!(!Query::new().eq("position", 3).matches(&row));
    }

    #[test]
    fn test_field_validation() {
        assert!(is_valid_field("goal_id"));
        assert!(!is_valid_field("goal_id'); DROP"));
        assert!(!is_valid_field(""));
    }

    #[test]
    fn test_fields_include_order() {
        let query = Query::new().eq("a", 1).order_by("b", true);
        let fields: Vec<&str> = query.fields().collect();
        assert_eq!(fields, vec!["a", "b"]);
    }
}
