use serde::{Deserialize, Serialize};

/// Label used for the identity column when none is given.
pub const DEFAULT_IDENTITY_LABEL: &str = "ID";

/// Construction options for a [`Query`](crate::Query).
///
/// Deserializes from the camelCase form, with every field optional:
///
/// ```
/// use sieve_query::QueryOptions;
///
/// let options: QueryOptions = serde_json::from_str(r#"{"includeIdentity": true}"#).unwrap();
/// assert!(options.include_identity);
/// assert_eq!(options.identity_label, "ID");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QueryOptions {
    /// Number the records before the first `select` of a pipeline
    pub include_identity: bool,

    /// Field name used by the automatic identity column
    pub identity_label: String,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions {
            include_identity: false,
            identity_label: DEFAULT_IDENTITY_LABEL.to_string(),
        }
    }
}

impl QueryOptions {
    pub fn with_identity(mut self) -> Self {
        self.include_identity = true;
        self
    }
}
