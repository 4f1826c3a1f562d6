use thiserror::Error;

/// Canonical result for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can abort a query chain.
///
/// Most operators degrade silently on empty or absent input; only a
/// malformed condition string and a failed source resolution surface here.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A `where_` condition did not match `<field> <op> <value>`
    #[error("invalid condition: '{condition}' (expected '<field> <op> <value>')")]
    InvalidCondition { condition: String },

    /// A string source could not be turned into records
    #[error("could not resolve source '{uri}': {source}")]
    Source {
        uri: String,
        #[source]
        source: ResolveError,
    },
}

/// Failures reported by a [`SourceResolver`](crate::source::SourceResolver).
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no source resolver configured")]
    Unconfigured,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}
