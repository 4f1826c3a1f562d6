use crate::{
    condition::Condition,
    value::{Collection, Record, condense, keys_match},
};

/// Keep the records for which `predicate` holds.
pub fn filter<F>(records: Collection, predicate: F) -> Collection
where
    F: Fn(&Record) -> bool,
{
    records.into_iter().filter(|r| predicate(r)).collect()
}

/// Keep the records satisfying every condition, stopping at the first
/// failing one per record.
pub fn where_all(records: Collection, conditions: &[Condition]) -> Collection {
    filter(records, |r| conditions.iter().all(|c| c.matches(r)))
}

/// Keep the first record of each distinct combination of `fields`.
pub fn distinct<S: AsRef<str>>(records: &[Record], fields: &[S]) -> Collection {
    let mut seen: Vec<Record> = Vec::new();
    let mut out = Vec::new();

    for record in records {
        let key = condense(record, fields);
        if seen.iter().any(|k| keys_match(k, &key)) {
            continue;
        }
        seen.push(key);
        out.push(record.clone());
    }

    out
}

/// Number of rows addressed by `amount` against a result of `len` rows.
///
/// Values strictly between -1 and 1 (other than 0) are fractions of `len`;
/// anything else is a row count. Both truncate toward zero and keep their
/// sign.
pub fn row_count(amount: f64, len: usize) -> i64 {
    let rows = if amount != 0.0 && amount.abs() < 1.0 {
        len as f64 * amount
    } else {
        amount
    };
    if rows.is_nan() { 0 } else { rows.trunc() as i64 }
}

/// Leading rows for a positive `amount`, trailing rows for a negative one.
pub fn top(mut records: Collection, amount: f64) -> Collection {
    let len = records.len();
    let rows = row_count(amount, len);
    let take = (rows.unsigned_abs() as usize).min(len);

    if rows >= 0 {
        records.truncate(take);
        records
    } else {
        records.split_off(len - take)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_count_fractions_truncate() {
        assert_eq!(row_count(0.4, 5), 2);
        assert_eq!(row_count(0.5, 5), 2);
        assert_eq!(row_count(-0.5, 5), -2);
        assert_eq!(row_count(3.0, 5), 3);
        assert_eq!(row_count(1.0, 5), 1);
        assert_eq!(row_count(f64::NAN, 5), 0);
    }
}
