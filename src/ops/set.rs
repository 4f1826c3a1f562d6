use crate::{
    ops::aggregate::{AggregateFn, AggregateSpec},
    value::{Collection, Record},
};

/// Field attached by `union` holding the number of occurrences of a row.
pub const UNION_COUNT_FIELD: &str = "count";

/// Append each collection verbatim, in order.
pub fn concat(mut records: Collection, others: impl IntoIterator<Item = Collection>) -> Collection {
    for other in others {
        records.extend(other);
    }
    records
}

/// Schema used by `union` to collapse rows: the keys of the first record
/// of the appended collection.
pub fn union_schema(appended: &[Record]) -> Vec<String> {
    appended
        .first()
        .map(|r| r.keys().cloned().collect())
        .unwrap_or_default()
}

/// Append `appended`, then collapse rows equal on its schema and count
/// each one's occurrences.
///
/// Returns the collapsed rows along with the schema, which becomes the
/// pipeline's grouping keys.
pub fn union(records: Collection, appended: Collection) -> (Collection, Vec<String>) {
    let schema = union_schema(&appended);
    let combined = concat(records, [appended]);
    let spec = AggregateSpec::new(schema.clone(), vec![UNION_COUNT_FIELD.to_string()], AggregateFn::Count);
    (spec.apply(&combined), schema)
}
