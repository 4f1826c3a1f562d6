// Ordering engine: simple and multi-key ordering

use serde_json::{Value, json};
use sieve_query::{Collection, OrderSpec, Query, SortDirection};

fn records(value: Value) -> Collection {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn staff() -> Collection {
    records(json!([
        {"name": "Ada", "dept": "ops", "age": 36},
        {"name": "Bob", "dept": "eng", "age": 9},
        {"name": "Cyd", "dept": "ops", "age": 52},
        {"name": "Dee", "dept": "eng", "age": 27},
        {"name": "Eve", "dept": "eng", "age": 10},
    ]))
}

fn names(query: &Query) -> Vec<&str> {
    query
        .result()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect()
}

// ============================================================================
// Simple ordering
// ============================================================================

#[test]
fn test_order_by_single_field() {
    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by(["name"]);
    assert_eq!(names(&query), ["Ada", "Bob", "Cyd", "Dee", "Eve"]);

    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by(["dept", "name"]);
    assert_eq!(names(&query), ["Bob", "Dee", "Eve", "Ada", "Cyd"]);
}

#[test]
fn test_order_by_compares_serialized_keys() {
    // numbers sort by their text in the simple form
    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by(["age"]);
    assert_eq!(names(&query), ["Eve", "Dee", "Ada", "Cyd", "Bob"]);
}

#[test]
fn test_order_by_without_fields_is_noop() {
    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by(Vec::<String>::new());
    assert_eq!(names(&query), ["Ada", "Bob", "Cyd", "Dee", "Eve"]);
}

// ============================================================================
// Complex ordering
// ============================================================================

#[test]
fn test_order_by_specs_priority_chain() {
    let mut query = Query::new();
    query
        .from(vec![staff()])
        .unwrap()
        .order_by_specs(vec![OrderSpec::asc("dept"), OrderSpec::desc("age")]);
    assert_eq!(names(&query), ["Dee", "Eve", "Bob", "Cyd", "Ada"]);
}

#[test]
fn test_order_by_specs_numeric_values() {
    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by_specs(vec![OrderSpec::asc("age")]);
    assert_eq!(names(&query), ["Bob", "Eve", "Dee", "Ada", "Cyd"]);
}

#[test]
fn test_order_by_specs_numeric_strings() {
    let input = records(json!([{"v": "10"}, {"v": "9"}, {"v": "100"}]));
    let mut query = Query::new();
    query.from(vec![input]).unwrap().order_by_specs(vec![OrderSpec::desc("v")]);
    let values: Vec<&str> = query.result().iter().map(|r| r["v"].as_str().unwrap()).collect();
    assert_eq!(values, ["100", "10", "9"]);
}

#[test]
fn test_order_by_specs_by_position() {
    let mut query = Query::new();
    query
        .from(vec![staff()])
        .unwrap()
        .order_by_specs(vec![OrderSpec::asc(1usize), OrderSpec::asc(2usize)]);
    assert_eq!(names(&query), ["Bob", "Eve", "Dee", "Ada", "Cyd"]);
}

#[test]
fn test_order_by_specs_default_direction_is_ascending() {
    let spec = OrderSpec {
        field: Some("name".into()),
        ..OrderSpec::default()
    };
    assert_eq!(spec.sort, SortDirection::Asc);

    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by_specs(vec![spec]);
    assert_eq!(names(&query), ["Ada", "Bob", "Cyd", "Dee", "Eve"]);
}

#[test]
fn test_order_by_specs_is_stable_for_ties() {
    let mut query = Query::new();
    query.from(vec![staff()]).unwrap().order_by_specs(vec![OrderSpec::desc("dept")]);
    assert_eq!(names(&query), ["Ada", "Cyd", "Bob", "Dee", "Eve"]);
}

#[test]
fn test_order_by_specs_missing_values_sort_first() {
    let input = records(json!([{"v": 2}, {"w": 1}, {"v": 1}]));
    let mut query = Query::new();
    query.from(vec![input]).unwrap().order_by_specs(vec![OrderSpec::asc("v")]);
    assert_eq!(query.result()[0].get("w"), Some(&json!(1)));
    assert_eq!(query.result()[1]["v"], json!(1));
}

#[test]
fn test_order_by_whole_record() {
    let input = records(json!([{"v": "b"}, {"v": "c"}, {"v": "a"}]));
    let mut query = Query::new();
    query
        .from(vec![input])
        .unwrap()
        .order_by_specs(vec![OrderSpec::record(SortDirection::Desc)]);
    let values: Vec<&str> = query.result().iter().map(|r| r["v"].as_str().unwrap()).collect();
    assert_eq!(values, ["c", "b", "a"]);
}
