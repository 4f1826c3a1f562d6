use std::cmp::Ordering;

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
pub use serde_json::{Map, Value};

/// A single loosely-structured record.
///
/// Key order is insertion order, so a field can also be addressed by its
/// zero-based position in the record's own key sequence.
///
/// # Examples
///
/// ```
/// use sieve_query::value::{key_at, Record};
/// use serde_json::json;
///
/// let mut record = Record::new();
/// record.insert("name".to_string(), json!("Ada"));
/// record.insert("age".to_string(), json!(36));
///
/// assert_eq!(key_at(&record, 1), Some("age"));
/// assert_eq!(key_at(&record, 2), None);
/// ```
pub type Record = Map<String, Value>;

/// An ordered sequence of records; every operator reads and produces one.
pub type Collection = Vec<Record>;

/// Returns a human-readable type name for a value
pub fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Textual form of a value, used for string comparisons and containment.
///
/// Strings are returned without quotes; containers fall back to their
/// compact JSON text.
pub fn text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// Read a value as a number.
///
/// Numbers convert directly and strings are accepted when their trimmed
/// text parses as a float. Everything else is not numeric.
pub fn as_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        _ => None,
    }
}

/// Loose equality: numeric-looking values compare as numbers, nulls only
/// equal nulls, containers compare structurally, the rest by text.
pub fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        (Value::Array(_), _) | (_, Value::Array(_)) | (Value::Object(_), _) | (_, Value::Object(_)) => {
            a == b
        }
        _ => match (as_number(a), as_number(b)) {
            (Some(x), Some(y)) => x == y,
            _ => text(a) == text(b),
        },
    }
}

/// Total ordering over mixed values.
///
/// Nulls sort first, then numeric-looking values by number, then
/// everything else by text.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            _ if as_number(v).is_some() => 1,
            _ => 2,
        }
    }

    rank(a).cmp(&rank(b)).then_with(|| match (as_number(a), as_number(b)) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        _ => text(a).cmp(&text(b)),
    })
}

/// Project a record onto `fields`, reading a missing field as `0`.
///
/// The result keeps the order of `fields`, which makes it usable as a
/// grouping or sort key.
pub fn condense<S: AsRef<str>>(record: &Record, fields: &[S]) -> Record {
    let mut out = Record::new();
    for field in fields {
        let field = field.as_ref();
        let value = record.get(field).cloned().unwrap_or_else(|| Value::from(0));
        out.insert(field.to_string(), value);
    }
    out
}

/// Key name found at `position` in the record's own key order.
pub fn key_at(record: &Record, position: usize) -> Option<&str> {
    record.keys().nth(position).map(String::as_str)
}

/// Loose equality over two condensed records with the same key set.
pub fn keys_match(a: &Record, b: &Record) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, v)| b.get(k).is_some_and(|other| loose_eq(v, other)))
}

/// Read a value as an exact decimal for accumulation.
pub fn to_decimal(v: &Value) -> Option<Decimal> {
    match v {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else {
                n.as_f64().and_then(Decimal::from_f64)
            }
        }
        Value::String(_) => as_number(v).and_then(Decimal::from_f64),
        _ => None,
    }
}

/// Convert a float total into a JSON number, keeping whole results that
/// fit an integer as integers. Non-finite totals become null.
pub fn from_float(x: f64) -> Value {
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;
    if x.fract() == 0.0 && x.abs() <= MAX_EXACT {
        return Value::from(x as i64);
    }
    serde_json::Number::from_f64(x).map(Value::Number).unwrap_or(Value::Null)
}

/// Convert an accumulated decimal back into a JSON number, keeping whole
/// results as integers.
pub fn from_decimal(d: Decimal) -> Value {
    let d = d.normalize();
    if d.is_integer()
        && let Some(i) = d.to_i64()
    {
        return Value::from(i);
    }
    d.to_f64()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
