//! The query pipeline.
//!
//! A [`Query`] owns all state of one logical query: the current result,
//! collections waiting for a join, the grouping keys of the last
//! `group_by`, and whether an identity column has been assigned. Every
//! chainable operation replaces the current result wholesale and hands the
//! pipeline back; `select` is terminal and returns plain records.

use std::{mem, sync::Arc};

use tracing::{debug, trace};

use crate::{
    condition::Condition,
    error::{QueryError, ResolveError, Result},
    ops::{
        aggregate::{AggregateFn, AggregateSpec},
        filter, join,
        join::JoinKind,
        order, project, set,
    },
    options::{DEFAULT_IDENTITY_LABEL, QueryOptions},
    selector::{JoinComparer, OrderSpec, Projection},
    source::{Source, SourceResolver, flatten, into_collection},
    value::{Collection, Record},
};

/// Join waiting for its comparer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingJoin {
    #[default]
    None,
    Inner,
    Left,
    /// Sources of a multi-source `from`; `on` inner-joins the rest onto the first
    From,
}

/// A single query chain.
///
/// # Examples
///
/// ```
/// use sieve_query::{Query, JoinComparer, Projection};
/// use serde_json::json;
///
/// let people: Vec<_> = json!([
///     {"id": 1, "name": "Ada", "dept": "eng", "age": 36},
///     {"id": 2, "name": "Bob", "dept": "ops", "age": 9},
/// ])
/// .as_array().unwrap().iter().map(|v| v.as_object().cloned().unwrap()).collect();
///
/// let names = Query::new()
///     .from(vec![people])
///     .unwrap()
///     .where_(["age > 10"])
///     .unwrap()
///     .select(Projection::names(["name"]));
///
/// assert_eq!(names.len(), 1);
/// assert_eq!(names[0]["name"], json!("Ada"));
/// ```
#[derive(Default)]
pub struct Query {
    options: QueryOptions,
    resolver: Option<Arc<dyn SourceResolver>>,
    pending: Vec<Collection>,
    pending_join: PendingJoin,
    result: Collection,
    grouping: Vec<String>,
    identity_assigned: bool,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: QueryOptions) -> Self {
        Query {
            options,
            ..Self::default()
        }
    }

    /// Attach the resolver used for string sources.
    pub fn with_resolver(mut self, resolver: impl SourceResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    pub fn with_shared_resolver(mut self, resolver: Arc<dyn SourceResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    // ========================================
    // State accessors
    // ========================================

    /// The current result.
    pub fn result(&self) -> &[Record] {
        &self.result
    }

    /// Consume the pipeline, keeping only its current result.
    pub fn into_result(self) -> Collection {
        self.result
    }

    pub fn grouping_keys(&self) -> &[String] {
        &self.grouping
    }

    pub fn pending_join(&self) -> PendingJoin {
        self.pending_join
    }

    pub fn identity_assigned(&self) -> bool {
        self.identity_assigned
    }

    pub fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn apply<F>(&mut self, op: &'static str, f: F) -> &mut Self
    where
        F: FnOnce(Collection) -> Collection,
    {
        let input = mem::take(&mut self.result);
        let rows_in = input.len();
        self.result = f(input);
        debug!(op, rows_in, rows_out = self.result.len(), "applied operator");
        self
    }

    // ========================================
    // Source resolution
    // ========================================

    /// Seed the pipeline from collections and resolver URIs.
    ///
    /// Empty entries are skipped; if nothing remains the pipeline is left
    /// untouched. Otherwise the sources are concatenated in order into the
    /// current result, and pending joins and grouping keys are reset. With
    /// more than one source the collections stay pending, so a following
    /// [`on`](Self::on) replaces the result with their inner join.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Source`] when a URI is given without a
    /// configured resolver, or when the resolver fails. The pipeline is left
    /// untouched in that case.
    pub fn from<I, S>(&mut self, sources: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Source>,
    {
        let mut collections = Vec::new();
        for source in sources.into_iter().map(Into::into) {
            if source.is_empty() {
                continue;
            }
            let records = match source {
                Source::Records(records) => records,
                Source::Uri(uri) => self.resolve(&uri)?,
            };
            collections.push(records);
        }

        if collections.is_empty() {
            debug!(op = "from", "no non-empty sources, pipeline unchanged");
            return Ok(self);
        }

        let sources = collections.len();
        self.reset_sources();
        if sources > 1 {
            self.pending = collections.clone();
            self.pending_join = PendingJoin::From;
        }
        self.result = flatten(collections);
        debug!(op = "from", sources, rows_out = self.result.len(), "seeded pipeline");
        Ok(self)
    }

    /// Seed the pipeline from a single URI without blocking on the resolver.
    ///
    /// Only one source is accepted on this path; chain further sources
    /// with [`concat`](Self::concat) once it completes.
    ///
    /// # Errors
    ///
    /// Same as [`from`](Self::from).
    pub async fn from_async(&mut self, uri: &str) -> Result<&mut Self> {
        if uri.is_empty() {
            return Ok(self);
        }

        let resolver = self.resolver.clone().ok_or_else(|| QueryError::Source {
            uri: uri.to_string(),
            source: ResolveError::Unconfigured,
        })?;

        trace!(uri, "resolving source asynchronously");
        let payload = resolver
            .resolve_async(uri)
            .await
            .map_err(|source| QueryError::Source {
                uri: uri.to_string(),
                source,
            })?;

        self.reset_sources();
        self.result = into_collection(payload);
        debug!(op = "from_async", rows_out = self.result.len(), "seeded pipeline");
        Ok(self)
    }

    /// Like [`from_async`](Self::from_async), then hand the pipeline to
    /// `callback` once the records have arrived.
    pub async fn from_async_with<F>(&mut self, uri: &str, callback: F) -> Result<()>
    where
        F: FnOnce(&mut Self),
    {
        let query = self.from_async(uri).await?;
        callback(query);
        Ok(())
    }

    fn resolve(&self, uri: &str) -> Result<Collection> {
        let resolver = self.resolver.as_ref().ok_or_else(|| QueryError::Source {
            uri: uri.to_string(),
            source: ResolveError::Unconfigured,
        })?;

        trace!(uri, "resolving source");
        let payload = resolver.resolve(uri).map_err(|source| QueryError::Source {
            uri: uri.to_string(),
            source,
        })?;
        Ok(into_collection(payload))
    }

    fn reset_sources(&mut self) {
        self.pending.clear();
        self.pending_join = PendingJoin::None;
        self.grouping.clear();
    }

    // ========================================
    // Joins
    // ========================================

    /// Mark an inner join against `collections`, resolved by [`on`](Self::on).
    pub fn join<I>(&mut self, collections: I) -> &mut Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.mark_join(PendingJoin::Inner, collections)
    }

    /// Mark a left join against `collections`, resolved by [`on`](Self::on).
    pub fn left_join<I>(&mut self, collections: I) -> &mut Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.mark_join(PendingJoin::Left, collections)
    }

    fn mark_join<I>(&mut self, kind: PendingJoin, collections: I) -> &mut Self
    where
        I: IntoIterator<Item = Collection>,
    {
        let collections: Vec<Collection> = collections.into_iter().collect();
        if collections.is_empty() {
            return self;
        }
        self.pending = collections.into_iter().filter(|c| !c.is_empty()).collect();
        self.pending_join = kind;
        self
    }

    /// Resolve the pending join with `comparer`.
    ///
    /// Without a pending join, or with an empty field list, nothing happens.
    /// After a multi-source `from`, the result becomes the inner join of the
    /// first source against the others.
    pub fn on(&mut self, comparer: JoinComparer) -> &mut Self {
        let kind = match self.pending_join {
            PendingJoin::None => return self,
            PendingJoin::Inner | PendingJoin::From => JoinKind::Inner,
            PendingJoin::Left => JoinKind::Left,
        };
        if matches!(&comparer, JoinComparer::Fields(fields) if fields.is_empty()) {
            return self;
        }

        let from_sources = self.pending_join == PendingJoin::From;
        self.pending_join = PendingJoin::None;
        let mut pending = mem::take(&mut self.pending);

        if from_sources {
            if pending.len() < 2 {
                return self;
            }
            let first = pending.remove(0);
            return self.apply("on", |_| join::join(first, &pending, kind, &comparer));
        }

        if pending.is_empty() {
            return self;
        }
        self.apply("on", |current| join::join(current, &pending, kind, &comparer))
    }

    // ========================================
    // Filtering & projection
    // ========================================

    /// Keep the records for which `predicate` returns true.
    pub fn filter<F>(&mut self, predicate: F) -> &mut Self
    where
        F: Fn(&Record) -> bool,
    {
        self.apply("filter", |current| filter::filter(current, predicate))
    }

    /// Keep the records satisfying every `<field> <op> <value>` condition.
    ///
    /// All conditions are parsed before any record is examined, so a
    /// malformed one fails the call even on an empty result.
    pub fn where_<I, S>(&mut self, conditions: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let conditions = conditions
            .into_iter()
            .map(|c| Condition::parse(c.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        if conditions.is_empty() {
            return Ok(self);
        }
        Ok(self.apply("where", |current| filter::where_all(current, &conditions)))
    }

    /// Project the current result. Terminal.
    ///
    /// With `include_identity` set, the first `select` on a non-empty result
    /// numbers the records before projecting.
    pub fn select(&mut self, projection: Projection) -> Collection {
        if self.result.is_empty() {
            return Vec::new();
        }

        if self.options.include_identity && !self.identity_assigned {
            let label = self.options.identity_label.clone();
            self.identity_as(&label);
        }

        let out = project::project(&self.result, &projection);
        debug!(op = "select", rows_out = out.len(), "projected result");
        out
    }

    /// Keep the first record of each distinct combination of `fields`.
    pub fn distinct<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return self;
        }
        self.apply("distinct", |current| filter::distinct(&current, &fields))
    }

    /// Leading rows (or trailing rows, for a negative amount).
    ///
    /// An amount strictly between -1 and 1 is a fraction of the result.
    pub fn top(&mut self, amount: impl Into<f64>) -> &mut Self {
        let amount = amount.into();
        self.apply("top", |current| filter::top(current, amount))
    }

    /// Same as `top` with the amount negated.
    pub fn bottom(&mut self, amount: impl Into<f64>) -> &mut Self {
        let amount = -amount.into();
        self.apply("bottom", |current| filter::top(current, amount))
    }

    /// Number the current result from 1 under `"ID"`.
    pub fn identity(&mut self) -> &mut Self {
        self.identity_as(DEFAULT_IDENTITY_LABEL)
    }

    /// Number the current result from 1 under `label`.
    pub fn identity_as(&mut self, label: &str) -> &mut Self {
        self.identity_assigned = true;
        project::assign_identity(&mut self.result, label);
        debug!(op = "identity", label, rows = self.result.len(), "assigned identity");
        self
    }

    // ========================================
    // Aggregation
    // ========================================

    /// Set the grouping keys used by subsequent aggregates.
    pub fn group_by<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grouping = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn sum<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregateFn::Sum, fields)
    }

    pub fn avg<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregateFn::Avg, fields)
    }

    pub fn min<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregateFn::Min, fields)
    }

    pub fn max<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregateFn::Max, fields)
    }

    pub fn count<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate(AggregateFn::Count, fields)
    }

    fn aggregate<I, S>(&mut self, func: AggregateFn, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = AggregateSpec::new(
            self.grouping.clone(),
            fields.into_iter().map(Into::into).collect(),
            func,
        );
        self.apply("aggregate", |current| spec.apply(&current))
    }

    // ========================================
    // Ordering
    // ========================================

    /// Sort ascending by the named fields taken together as one key.
    pub fn order_by<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return self;
        }
        self.apply("order_by", |mut current| {
            order::order_by_fields(&mut current, &fields);
            current
        })
    }

    /// Sort by a priority chain of keys, each with its own direction.
    pub fn order_by_specs(&mut self, specs: Vec<OrderSpec>) -> &mut Self {
        self.apply("order_by_specs", |mut current| {
            order::order_by_specs(&mut current, &specs);
            current
        })
    }

    // ========================================
    // Set operations
    // ========================================

    /// Append collections verbatim and drop any pending join.
    pub fn concat<I>(&mut self, collections: I) -> &mut Self
    where
        I: IntoIterator<Item = Collection>,
    {
        self.pending.clear();
        self.pending_join = PendingJoin::None;
        self.apply("concat", |current| set::concat(current, collections))
    }

    /// Append `collection`, then collapse rows equal on its schema into one
    /// row each with a `count` of occurrences.
    ///
    /// The schema comes from the first record of `collection`, and becomes
    /// the grouping keys of the pipeline.
    pub fn union(&mut self, collection: Collection) -> &mut Self {
        if collection.is_empty() {
            return self;
        }
        self.pending.clear();
        self.pending_join = PendingJoin::None;

        let mut schema = Vec::new();
        self.apply("union", |current| {
            let (out, keys) = set::union(current, collection);
            schema = keys;
            out
        });
        self.grouping = schema;
        self
    }
}
