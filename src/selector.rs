//! Typed arguments for the field-addressing operators.
//!
//! Each operator that accepts "a field" takes a [`FieldSelector`], so the
//! shape of an argument is fixed at the call site instead of being sniffed
//! at runtime.

use std::{fmt, sync::Arc};

use crate::value::{Record, Value, key_at};

/// Function computing a value from a record.
pub type ComputeFn = Arc<dyn Fn(&Record) -> Value>;

/// How a field is located inside a record.
#[derive(Clone)]
pub enum FieldSelector {
    /// Field by key name
    ///
    /// # Examples
    /// - `FieldSelector::from("dept")` → `ByName("dept")`
    ByName(String),

    /// Field by zero-based position in the record's own key order
    ///
    /// Resolved per record, so records with different key orders may
    /// yield different fields for the same position.
    ByPosition(usize),

    /// Value computed from the whole record
    Computed(ComputeFn),
}

impl FieldSelector {
    pub fn computed(f: impl Fn(&Record) -> Value + 'static) -> Self {
        FieldSelector::Computed(Arc::new(f))
    }

    /// Name of the key this selector points at in `record`, if any.
    pub fn resolve_key<'a>(&'a self, record: &'a Record) -> Option<&'a str> {
        match self {
            FieldSelector::ByName(name) => Some(name.as_str()),
            FieldSelector::ByPosition(pos) => key_at(record, *pos),
            FieldSelector::Computed(_) => None,
        }
    }

    /// Value selected from `record`; `None` when the field is absent.
    pub fn value_in(&self, record: &Record) -> Option<Value> {
        match self {
            FieldSelector::Computed(f) => Some(f(record)),
            _ => self
                .resolve_key(record)
                .and_then(|key| record.get(key))
                .cloned(),
        }
    }

    /// Default destination name when projecting through this selector.
    fn default_label(&self) -> String {
        match self {
            FieldSelector::ByName(name) => name.clone(),
            FieldSelector::ByPosition(pos) => pos.to_string(),
            FieldSelector::Computed(_) => "value".to_string(),
        }
    }
}

impl fmt::Debug for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldSelector::ByName(name) => f.debug_tuple("ByName").field(name).finish(),
            FieldSelector::ByPosition(pos) => f.debug_tuple("ByPosition").field(pos).finish(),
            FieldSelector::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl From<&str> for FieldSelector {
    fn from(name: &str) -> Self {
        FieldSelector::ByName(name.to_string())
    }
}

impl From<String> for FieldSelector {
    fn from(name: String) -> Self {
        FieldSelector::ByName(name)
    }
}

impl From<usize> for FieldSelector {
    fn from(position: usize) -> Self {
        FieldSelector::ByPosition(position)
    }
}

/// Override for the projected value of a [`FieldDescriptor`].
#[derive(Clone)]
pub enum FieldValue {
    Literal(Value),
    Computed(ComputeFn),
}

impl FieldValue {
    pub fn evaluate(&self, record: &Record) -> Value {
        match self {
            FieldValue::Literal(v) => v.clone(),
            FieldValue::Computed(f) => f(record),
        }
    }
}

impl fmt::Debug for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Literal(v) => f.debug_tuple("Literal").field(v).finish(),
            FieldValue::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// One output column of a descriptor-shaped `select`.
///
/// `field` locates the source value, `text` renames the destination
/// (defaulting to the field name or position), and `value` replaces the
/// sourced value altogether.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    pub field: FieldSelector,
    pub text: Option<String>,
    pub value: Option<FieldValue>,
}

impl FieldDescriptor {
    pub fn new(field: impl Into<FieldSelector>) -> Self {
        FieldDescriptor {
            field: field.into(),
            text: None,
            value: None,
        }
    }

    /// Rename the destination field.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Emit a fixed value instead of the sourced one.
    pub fn literal(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(FieldValue::Literal(value.into()));
        self
    }

    /// Emit a value computed from the record instead of the sourced one.
    pub fn compute(mut self, f: impl Fn(&Record) -> Value + 'static) -> Self {
        self.value = Some(FieldValue::Computed(Arc::new(f)));
        self
    }

    pub fn label(&self) -> String {
        self.text.clone().unwrap_or_else(|| self.field.default_label())
    }
}

/// Call shapes of `select`.
pub enum Projection {
    /// Return the current result as-is
    All,
    /// Copy each named field under its own name
    Names(Vec<String>),
    /// Build each output record from descriptors
    Fields(Vec<FieldDescriptor>),
    /// Replace each record with the transform's output
    Transform(Box<dyn Fn(&Record) -> Record>),
}

impl Projection {
    pub fn names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Projection::Names(names.into_iter().map(Into::into).collect())
    }

    pub fn fields(descriptors: impl IntoIterator<Item = FieldDescriptor>) -> Self {
        Projection::Fields(descriptors.into_iter().collect())
    }

    pub fn transform(f: impl Fn(&Record) -> Record + 'static) -> Self {
        Projection::Transform(Box::new(f))
    }
}

/// Match rule consumed by `on`.
pub enum JoinComparer {
    /// Equi-join on fields present under the same name on both sides
    Fields(Vec<String>),
    /// Arbitrary match over (left, right)
    Predicate(Box<dyn Fn(&Record, &Record) -> bool>),
}

impl JoinComparer {
    pub fn fields<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        JoinComparer::Fields(fields.into_iter().map(Into::into).collect())
    }

    pub fn predicate(f: impl Fn(&Record, &Record) -> bool + 'static) -> Self {
        JoinComparer::Predicate(Box::new(f))
    }
}

/// Sort direction for one key of a complex `order_by_specs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One key of a complex ordering.
///
/// With no field the whole record is the sort key.
#[derive(Debug, Clone, Default)]
pub struct OrderSpec {
    pub field: Option<FieldSelector>,
    pub sort: SortDirection,
}

impl OrderSpec {
    pub fn asc(field: impl Into<FieldSelector>) -> Self {
        OrderSpec {
            field: Some(field.into()),
            sort: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<FieldSelector>) -> Self {
        OrderSpec {
            field: Some(field.into()),
            sort: SortDirection::Desc,
        }
    }

    /// Order by the whole record.
    pub fn record(sort: SortDirection) -> Self {
        OrderSpec { field: None, sort }
    }
}
