use std::cmp::Ordering;

use crate::{
    selector::{OrderSpec, SortDirection},
    value::{Record, Value, compare, condense},
};

/// Sort ascending by the JSON text of the named fields, taken together as
/// one key.
pub fn order_by_fields<S: AsRef<str>>(records: &mut [Record], fields: &[S]) {
    records.sort_by_cached_key(|record| serde_json::to_string(&condense(record, fields)).unwrap_or_default());
}

/// Sort by a priority chain of keys: each spec only breaks ties left by
/// all the specs before it.
pub fn order_by_specs(records: &mut [Record], specs: &[OrderSpec]) {
    if specs.is_empty() {
        return;
    }
    records.sort_by(|a, b| {
        specs
            .iter()
            .map(|spec| compare_by(spec, a, b))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    });
}

fn compare_by(spec: &OrderSpec, a: &Record, b: &Record) -> Ordering {
    let ord = match &spec.field {
        Some(selector) => {
            let left = selector.value_in(a).unwrap_or(Value::Null);
            let right = selector.value_in(b).unwrap_or(Value::Null);
            compare(&left, &right)
        }
        None => whole(a).cmp(&whole(b)),
    };

    match spec.sort {
        SortDirection::Asc => ord,
        SortDirection::Desc => ord.reverse(),
    }
}

fn whole(record: &Record) -> String {
    serde_json::to_string(record).unwrap_or_default()
}
