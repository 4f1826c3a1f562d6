//! Grouped aggregation.
//!
//! Records are partitioned by the combination of their grouping-key values
//! (a missing key reads as `0`), in order of first appearance. Each group
//! keeps one running accumulator per requested value field, and emits one
//! record holding the grouping fields followed by the aggregated fields.
//! With no grouping keys the whole input forms a single group.

use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::value::{
    Collection, Record, Value, as_number, compare, condense, from_decimal, from_float, keys_match, to_decimal,
};

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    /// Running total of numeric values, starting at 0
    Sum,
    /// Mean of numeric values over the rows of the group
    Avg,
    /// Smallest value, seeded from the first observed value
    Min,
    /// Largest value, seeded from the first observed value
    Max,
    /// Number of rows in the group
    Count,
}

/// Grouping keys, value fields, and the function applied to them.
#[derive(Debug, Clone)]
pub struct AggregateSpec {
    pub keys: Vec<String>,
    pub fields: Vec<String>,
    pub func: AggregateFn,
}

/// Running numeric total: exact while it fits a decimal, a float past that.
#[derive(Debug, Clone, Copy)]
enum Total {
    Exact(Decimal),
    Float(f64),
}

impl Total {
    fn add(&mut self, value: &Value) {
        let Some(x) = as_number(value).filter(|x| x.is_finite()) else {
            return;
        };
        *self = match *self {
            Total::Exact(total) => match to_decimal(value).and_then(|d| total.checked_add(d)) {
                Some(sum) => Total::Exact(sum),
                None => Total::Float(total.to_f64().unwrap_or_default() + x),
            },
            Total::Float(total) => Total::Float(total + x),
        };
    }

    fn value(self) -> Value {
        match self {
            Total::Exact(total) => from_decimal(total),
            Total::Float(total) => from_float(total),
        }
    }

    fn mean(self, count: u64) -> Value {
        match self {
            Total::Exact(total) => from_decimal(total / Decimal::from(count)),
            Total::Float(total) => from_float(total / count as f64),
        }
    }
}

#[derive(Debug, Clone)]
enum Accumulator {
    Sum(Total),
    Avg { count: u64, sum: Total },
    Count(u64),
    Extremum(Option<Value>),
}

impl Accumulator {
    fn new(func: AggregateFn) -> Self {
        match func {
            AggregateFn::Sum => Accumulator::Sum(Total::Exact(Decimal::ZERO)),
            AggregateFn::Avg => Accumulator::Avg {
                count: 0,
                sum: Total::Exact(Decimal::ZERO),
            },
            AggregateFn::Count => Accumulator::Count(0),
            AggregateFn::Min | AggregateFn::Max => Accumulator::Extremum(None),
        }
    }

    fn update(&mut self, func: AggregateFn, value: &Value) {
        match self {
            Accumulator::Sum(total) => total.add(value),
            Accumulator::Avg { count, sum } => {
                *count += 1;
                sum.add(value);
            }
            Accumulator::Count(n) => *n += 1,
            Accumulator::Extremum(current) => {
                if value.is_null() {
                    return;
                }
                let replace = match current {
                    None => true,
                    Some(best) => {
                        let ord = compare(value, best);
                        match func {
                            AggregateFn::Min => ord.is_lt(),
                            _ => ord.is_gt(),
                        }
                    }
                };
                if replace {
                    *current = Some(value.clone());
                }
            }
        }
    }

    fn finish(&self) -> Value {
        match self {
            Accumulator::Sum(total) => total.value(),
            Accumulator::Avg { count: 0, .. } => Value::from(0),
            Accumulator::Avg { count, sum } => sum.mean(*count),
            Accumulator::Count(n) => Value::from(*n),
            Accumulator::Extremum(best) => best.clone().unwrap_or(Value::Null),
        }
    }
}

impl AggregateSpec {
    pub fn new(keys: Vec<String>, fields: Vec<String>, func: AggregateFn) -> Self {
        AggregateSpec { keys, fields, func }
    }

    /// Run the aggregation over `records`.
    pub fn apply(&self, records: &[Record]) -> Collection {
        let mut groups: Vec<(Record, Vec<Accumulator>)> = Vec::new();

        for record in records {
            let key = condense(record, &self.keys);
            let index = match groups.iter().position(|(k, _)| keys_match(k, &key)) {
                Some(index) => index,
                None => {
                    let accs = self.fields.iter().map(|_| Accumulator::new(self.func)).collect();
                    groups.push((key, accs));
                    groups.len() - 1
                }
            };

            let values = condense(record, &self.fields);
            let (_, accs) = &mut groups[index];
            for (field, acc) in self.fields.iter().zip(accs.iter_mut()) {
                if let Some(value) = values.get(field) {
                    acc.update(self.func, value);
                }
            }
        }

        groups
            .into_iter()
            .map(|(mut row, accs)| {
                for (field, acc) in self.fields.iter().zip(&accs) {
                    row.insert(field.clone(), acc.finish());
                }
                row
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn records(value: Value) -> Collection {
        value
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().cloned().unwrap())
            .collect()
    }

    fn run(func: AggregateFn, keys: &[&str], fields: &[&str], input: Value) -> Value {
        let spec = AggregateSpec::new(
            keys.iter().map(|s| s.to_string()).collect(),
            fields.iter().map(|s| s.to_string()).collect(),
            func,
        );
        Value::Array(spec.apply(&records(input)).into_iter().map(Value::Object).collect())
    }

    #[test]
    fn test_max_of_all_negative_values() {
        let out = run(AggregateFn::Max, &[], &["t"], json!([{"t": -4}, {"t": -2}, {"t": -9}]));
        assert_eq!(out, json!([{"t": -2}]));
    }

    #[test]
    fn test_min_keeps_zero() {
        let out = run(AggregateFn::Min, &[], &["t"], json!([{"t": 0}, {"t": 5}, {"t": 3}]));
        assert_eq!(out, json!([{"t": 0}]));
    }

    #[test]
    fn test_avg_counts_rows_without_numbers() {
        let out = run(AggregateFn::Avg, &["k"], &["v"], json!([
            {"k": "a", "v": 4},
            {"k": "a", "v": "n/a"},
        ]));
        assert_eq!(out, json!([{"k": "a", "v": 2}]));
    }

    #[test]
    fn test_sum_past_decimal_range_switches_to_float() {
        let out = run(AggregateFn::Sum, &[], &["v"], json!([{"v": 7e28}, {"v": 7e28}]));
        let total = out[0]["v"].as_f64().unwrap();
        assert!((total - 1.4e29).abs() / 1.4e29 < 1e-12, "{total}");
    }

    #[test]
    fn test_sum_keeps_values_too_large_for_decimal() {
        let out = run(AggregateFn::Sum, &[], &["v"], json!([{"v": 1e30}, {"v": 1}]));
        assert_eq!(out, json!([{"v": 1e30}]));
    }

    #[test]
    fn test_empty_input_yields_no_groups() {
        let out = run(AggregateFn::Count, &["k"], &["v"], json!([]));
        assert_eq!(out, json!([]));
    }
}
