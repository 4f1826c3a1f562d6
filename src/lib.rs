pub mod condition;
pub mod error;
pub mod ops;
pub mod options;
pub mod query;
pub mod selector;
pub mod source;
pub mod value;

pub use condition::{CompareOp, Condition};
pub use error::{QueryError, ResolveError, Result};
pub use ops::aggregate::{AggregateFn, AggregateSpec};
pub use ops::join::JoinKind;
pub use options::QueryOptions;
pub use query::{PendingJoin, Query};
pub use selector::{FieldDescriptor, FieldSelector, FieldValue, JoinComparer, OrderSpec, Projection, SortDirection};
pub use source::{FileResolver, Source, SourceResolver};
pub use value::{Collection, Record, Value};
