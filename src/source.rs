//! Inputs accepted by `from` and the resolver seam for string sources.
//!
//! A string source is handed to an injected [`SourceResolver`], which
//! returns a JSON payload. The payload is normalized into a collection:
//! an array keeps its object elements, a single object becomes a one-record
//! collection.

use std::{fs, path::Path};

use futures::future::{self, LocalBoxFuture};
use tracing::{trace, warn};

use crate::{
    error::ResolveError,
    value::{Collection, Record, Value, type_name},
};

/// One argument to `from`.
#[derive(Debug, Clone)]
pub enum Source {
    /// Records supplied directly
    Records(Collection),
    /// A location handed to the configured resolver
    Uri(String),
}

impl Source {
    /// Empty collections and blank URIs are skipped by `from`.
    pub fn is_empty(&self) -> bool {
        match self {
            Source::Records(records) => records.is_empty(),
            Source::Uri(uri) => uri.is_empty(),
        }
    }
}

impl From<Collection> for Source {
    fn from(records: Collection) -> Self {
        Source::Records(records)
    }
}

impl From<&str> for Source {
    fn from(uri: &str) -> Self {
        Source::Uri(uri.to_string())
    }
}

impl From<String> for Source {
    fn from(uri: String) -> Self {
        Source::Uri(uri)
    }
}

/// Fetches the JSON payload behind a URI.
///
/// Implementations provide the blocking call; the asynchronous path
/// defaults to completing the blocking call immediately and can be
/// overridden by resolvers with real non-blocking transport.
pub trait SourceResolver {
    fn resolve(&self, uri: &str) -> Result<Value, ResolveError>;

    fn resolve_async<'a>(&'a self, uri: &'a str) -> LocalBoxFuture<'a, Result<Value, ResolveError>> {
        Box::pin(future::ready(self.resolve(uri)))
    }
}

/// Resolver reading JSON documents from the local filesystem.
///
/// Accepts plain paths and `file://` URIs, optionally relative to a base
/// directory.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    base: Option<std::path::PathBuf>,
}

impl FileResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base(base: impl AsRef<Path>) -> Self {
        FileResolver {
            base: Some(base.as_ref().to_path_buf()),
        }
    }

    fn path_for(&self, uri: &str) -> std::path::PathBuf {
        let raw = uri.strip_prefix("file://").unwrap_or(uri);
        match &self.base {
            Some(base) => base.join(raw),
            None => Path::new(raw).to_path_buf(),
        }
    }
}

impl SourceResolver for FileResolver {
    fn resolve(&self, uri: &str) -> Result<Value, ResolveError> {
        let path = self.path_for(uri);
        trace!(path = %path.display(), "reading JSON source");
        let contents = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// Normalize a resolver payload into a collection.
pub fn into_collection(payload: Value) -> Collection {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| match item {
                Value::Object(record) => Some(record),
                other => {
                    warn!(index, kind = type_name(&other), "skipping non-record element in source payload");
                    None
                }
            })
            .collect(),
        Value::Object(record) => vec![record],
        other => {
            warn!(kind = type_name(&other), "source payload is not a record or a sequence of records");
            Vec::new()
        }
    }
}

/// Concatenate collections in order, skipping the copy when only one is given.
pub fn flatten(mut collections: Vec<Collection>) -> Collection {
    if collections.len() == 1 {
        return collections.pop().unwrap_or_default();
    }
    let total = collections.iter().map(Vec::len).sum();
    let mut out: Vec<Record> = Vec::with_capacity(total);
    for collection in collections {
        out.extend(collection);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_object_payload_becomes_singleton() {
        let records = into_collection(json!({"id": 1}));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("id"), Some(&json!(1)));
    }

    #[test]
    fn test_array_payload_skips_scalars() {
        let records = into_collection(json!([{"id": 1}, 7, {"id": 2}]));
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_scalar_payload_is_empty() {
        assert!(into_collection(json!("nope")).is_empty());
    }

    #[test]
    fn test_file_uri_prefix_is_stripped() {
        let resolver = FileResolver::with_base("/data");
        assert_eq!(resolver.path_for("file://people.json"), Path::new("/data/people.json"));
    }
}
