// Set operations: concat and union

use serde_json::{Value, json};
use sieve_query::{Collection, Query};

fn records(value: Value) -> Collection {
    value
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_object().cloned().unwrap())
        .collect()
}

fn to_json(collection: Collection) -> Value {
    Value::Array(collection.into_iter().map(Value::Object).collect())
}

// ============================================================================
// concat
// ============================================================================

#[test]
fn test_concat_appends_in_order() {
    let mut query = Query::new();
    query
        .from(vec![records(json!([{"n": 1}]))])
        .unwrap()
        .concat(vec![records(json!([{"n": 2}, {"n": 3}])), records(json!([{"m": 4}]))]);
    assert_eq!(to_json(query.into_result()), json!([{"n": 1}, {"n": 2}, {"n": 3}, {"m": 4}]));
}

#[test]
fn test_concat_onto_empty_pipeline() {
    let mut query = Query::new();
    query.concat(vec![records(json!([{"n": 1}]))]);
    assert_eq!(to_json(query.into_result()), json!([{"n": 1}]));
}

// ============================================================================
// union
// ============================================================================

#[test]
fn test_union_collapses_duplicates_with_count() {
    let mut query = Query::new();
    query
        .from(vec![records(json!([{"a": 1, "b": 1}, {"a": 2, "b": 2}]))])
        .unwrap()
        .union(records(json!([{"a": 1, "b": 1}, {"a": 3, "b": 3}])));

    assert_eq!(to_json(query.into_result()), json!([
        {"a": 1, "b": 1, "count": 2},
        {"a": 2, "b": 2, "count": 1},
        {"a": 3, "b": 3, "count": 1},
    ]));
}

#[test]
fn test_union_groups_by_appended_schema() {
    let mut query = Query::new();
    query
        .from(vec![records(json!([
            {"a": 1, "extra": "x"},
            {"a": 1, "extra": "y"},
        ]))])
        .unwrap()
        .union(records(json!([{"a": 1}])));

    assert_eq!(query.grouping_keys(), ["a"]);
    assert_eq!(to_json(query.into_result()), json!([{"a": 1, "count": 3}]));
}

#[test]
fn test_union_schema_persists_for_later_aggregates() {
    let mut query = Query::new();
    query
        .from(vec![records(json!([{"k": "a", "v": 1}]))])
        .unwrap()
        .union(records(json!([{"k": "b", "v": 2}, {"k": "a", "v": 1}])))
        .sum(["count"]);

    assert_eq!(to_json(query.into_result()), json!([
        {"k": "a", "v": 1, "count": 2},
        {"k": "b", "v": 2, "count": 1},
    ]));
}

#[test]
fn test_union_with_empty_collection_is_noop() {
    let input = records(json!([{"a": 1}, {"a": 1}]));
    let mut query = Query::new();
    query.from(vec![input.clone()]).unwrap().union(Collection::new());
    assert_eq!(query.result(), input.as_slice());
    assert!(query.grouping_keys().is_empty());
}
