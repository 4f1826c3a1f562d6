//! Condition strings accepted by `where_`.
//!
//! A condition is exactly `<field> <op> <value>`: a field name without
//! whitespace, an operator, and a literal that runs to the end of the
//! string. The whole string must match; anything else is rejected.
//!
//! ```text
//! age > 10
//! name * son        // name contains "son"
//! dept = Sales
//! ```

use std::{cmp::Ordering, str::FromStr, sync::LazyLock};

use regex::Regex;

use crate::{
    error::{QueryError, Result},
    value::{Record, Value, text},
};

static CONDITION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+([<>=!*]{1,2})\s+(.+)$").expect("condition pattern is valid")
});

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Less than (`<`)
    LessThan,
    /// Greater than (`>`)
    GreaterThan,
    /// Less than or equal (`<=`)
    LessEqual,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Equal (`=` or `==`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,
    /// Substring containment on the field's text (`*`)
    Contains,
}

impl CompareOp {
    fn from_symbol(symbol: &str) -> Option<Self> {
        Some(match symbol {
            "<" => CompareOp::LessThan,
            ">" => CompareOp::GreaterThan,
            "<=" => CompareOp::LessEqual,
            ">=" => CompareOp::GreaterEqual,
            "=" | "==" => CompareOp::Equal,
            "!=" => CompareOp::NotEqual,
            "*" => CompareOp::Contains,
            _ => return None,
        })
    }

    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::LessThan => ordering == Ordering::Less,
            CompareOp::GreaterThan => ordering == Ordering::Greater,
            CompareOp::LessEqual => ordering != Ordering::Greater,
            CompareOp::GreaterEqual => ordering != Ordering::Less,
            CompareOp::Equal => ordering == Ordering::Equal,
            CompareOp::NotEqual => ordering != Ordering::Equal,
            CompareOp::Contains => false,
        }
    }
}

/// A parsed `<field> <op> <value>` condition.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub op: CompareOp,
    pub literal: String,
}

impl Condition {
    /// Parse a condition string.
    ///
    /// # Examples
    ///
    /// ```
    /// use sieve_query::condition::{CompareOp, Condition};
    ///
    /// let cond = Condition::parse("age >= 21").unwrap();
    /// assert_eq!(cond.field, "age");
    /// assert_eq!(cond.op, CompareOp::GreaterEqual);
    /// assert_eq!(cond.literal, "21");
    ///
    /// assert!(Condition::parse("age >> 21").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || QueryError::InvalidCondition {
            condition: input.to_string(),
        };

        let caps = CONDITION.captures(input).ok_or_else(invalid)?;
        let op = CompareOp::from_symbol(&caps[2]).ok_or_else(invalid)?;

        Ok(Condition {
            field: caps[1].to_string(),
            op,
            literal: caps[3].trim_end().to_string(),
        })
    }

    /// Evaluate the condition against one record.
    ///
    /// A numeric field compares numerically with a numeric literal; every
    /// other pairing compares text. A missing or null field only satisfies
    /// `!=`.
    pub fn matches(&self, record: &Record) -> bool {
        let value = match record.get(&self.field) {
            None | Some(Value::Null) => return self.op == CompareOp::NotEqual,
            Some(v) => v,
        };

        if self.op == CompareOp::Contains {
            return text(value).contains(&self.literal);
        }

        let ordering = match (value, self.literal.parse::<f64>()) {
            (Value::Number(n), Ok(literal)) => n.as_f64().and_then(|x| x.partial_cmp(&literal)),
            _ => Some(text(value).as_str().cmp(self.literal.as_str())),
        };

        match ordering {
            Some(ordering) => self.op.holds(ordering),
            None => self.op == CompareOp::NotEqual,
        }
    }
}

impl FromStr for Condition {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Condition::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_parse_every_operator() {
        let cases = [
            ("a < 1", CompareOp::LessThan),
            ("a > 1", CompareOp::GreaterThan),
            ("a <= 1", CompareOp::LessEqual),
            ("a >= 1", CompareOp::GreaterEqual),
            ("a = 1", CompareOp::Equal),
            ("a == 1", CompareOp::Equal),
            ("a != 1", CompareOp::NotEqual),
            ("a * 1", CompareOp::Contains),
        ];
        for (input, op) in cases {
            assert_eq!(Condition::parse(input).unwrap().op, op, "{input}");
        }
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in ["age >> 10", "age>10", "age", "", "age =! 3", "age > "] {
            let err = Condition::parse(input).unwrap_err();
            assert!(matches!(err, QueryError::InvalidCondition { .. }), "{input}");
        }
    }

    #[test]
    fn test_literal_keeps_inner_spaces() {
        let cond = Condition::parse("name = Ada Lovelace").unwrap();
        assert_eq!(cond.literal, "Ada Lovelace");
        assert!(cond.matches(&record(json!({"name": "Ada Lovelace"}))));
    }

    #[test]
    fn test_numeric_field_compares_as_number() {
        let cond = Condition::parse("age > 9").unwrap();
        assert!(cond.matches(&record(json!({"age": 10}))));
        assert!(!cond.matches(&record(json!({"age": 9}))));
    }

    #[test]
    fn test_string_field_compares_as_text() {
        // "10" < "9" as text
        let cond = Condition::parse("code < 9").unwrap();
        assert!(cond.matches(&record(json!({"code": "10"}))));
    }

    #[test]
    fn test_contains_and_missing_fields() {
        let cond = Condition::parse("name * ar").unwrap();
        assert!(cond.matches(&record(json!({"name": "Mark"}))));
        assert!(!cond.matches(&record(json!({"name": "Bob"}))));
        assert!(!cond.matches(&record(json!({}))));

        let not_equal = Condition::parse("name != Bob").unwrap();
        assert!(not_equal.matches(&record(json!({}))));
    }
}
