use crate::{
    selector::{FieldDescriptor, Projection},
    value::{Collection, Record, Value},
};

/// Number records in place from 1 under `label`.
///
/// An existing field of that name keeps its position and is overwritten.
pub fn assign_identity(records: &mut [Record], label: &str) {
    for (index, record) in records.iter_mut().enumerate() {
        record.insert(label.to_string(), Value::from(index as u64 + 1));
    }
}

/// Apply a projection to every record.
pub fn project(records: &[Record], projection: &Projection) -> Collection {
    match projection {
        Projection::All => records.to_vec(),
        Projection::Transform(f) => records.iter().map(|r| f(r)).collect(),
        Projection::Names(names) => records
            .iter()
            .map(|record| {
                let mut out = Record::new();
                for name in names {
                    out.insert(name.clone(), sourced(record, record.get(name).cloned()));
                }
                out
            })
            .collect(),
        Projection::Fields(descriptors) => records
            .iter()
            .map(|record| project_descriptors(record, descriptors))
            .collect(),
    }
}

fn project_descriptors(record: &Record, descriptors: &[FieldDescriptor]) -> Record {
    let mut out = Record::new();
    for descriptor in descriptors {
        let value = match &descriptor.value {
            Some(value) => value.evaluate(record),
            None => sourced(record, descriptor.field.value_in(record)),
        };
        out.insert(descriptor.label(), value);
    }
    out
}

/// A source field absent from the record projects the whole record.
fn sourced(record: &Record, value: Option<Value>) -> Value {
    value.unwrap_or_else(|| Value::Object(record.clone()))
}
