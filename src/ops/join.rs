use crate::{
    selector::JoinComparer,
    value::{Collection, Record, Value, condense, loose_eq},
};

/// How unmatched left records are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// Unmatched left records are dropped
    Inner,
    /// Unmatched left records are kept with right-side fields blanked
    Left,
}

/// Join `left` against each of `rights` in turn, feeding each output into
/// the next join.
pub fn join(left: Collection, rights: &[Collection], kind: JoinKind, comparer: &JoinComparer) -> Collection {
    rights
        .iter()
        .fold(left, |current, right| join_one(&current, right, kind, comparer))
}

fn join_one(left: &[Record], right: &[Record], kind: JoinKind, comparer: &JoinComparer) -> Collection {
    let mut out = Vec::new();

    for l in left {
        let matches = matching(l, right, comparer);

        if !matches.is_empty() {
            out.extend(matches.into_iter().map(|r| merge(r, l)));
        } else if kind == JoinKind::Left {
            out.push(blank_extend(l, right.first()));
        }
    }

    out
}

fn matching<'r>(left: &Record, right: &'r [Record], comparer: &JoinComparer) -> Vec<&'r Record> {
    match comparer {
        JoinComparer::Predicate(f) => right.iter().filter(|r| f(left, r)).collect(),
        JoinComparer::Fields(fields) if fields.is_empty() => Vec::new(),
        JoinComparer::Fields(fields) => {
            let key = condense(left, fields);
            right
                .iter()
                .filter(|r| {
                    key.iter()
                        .all(|(field, want)| r.get(field).is_some_and(|have| loose_eq(want, have)))
                })
                .collect()
        }
    }
}

/// Right fields first, then left fields; left wins on shared names.
pub fn merge(right: &Record, left: &Record) -> Record {
    let mut out = right.clone();
    for (key, value) in left {
        out.insert(key.clone(), value.clone());
    }
    out
}

/// Left record followed by the right-only fields of `schema`, blanked.
fn blank_extend(left: &Record, schema: Option<&Record>) -> Record {
    let mut out = left.clone();
    if let Some(schema) = schema {
        for key in schema.keys() {
            if !out.contains_key(key) {
                out.insert(key.clone(), Value::String(String::new()));
            }
        }
    }
    out
}
