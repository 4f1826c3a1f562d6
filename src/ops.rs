//! # Operators
//!
//! Pure functions over collections. Each takes the current result by
//! reference (or by value when it only reorders or truncates) and returns
//! the fully materialized output; the [`Query`](crate::Query) pipeline
//! owns all state and threads results between them.
//!
//! - **[filter]** - predicate and condition filtering, `distinct`, `top`
//! - **[project]** - `select` projections and identity numbering
//! - **[join]** - inner and left joins by fields or predicate
//! - **[aggregate]** - grouped `sum`, `avg`, `min`, `max`, `count`
//! - **[order]** - simple and multi-key ordering
//! - **[set]** - `concat` and `union`

pub mod aggregate;
pub mod filter;
pub mod join;
pub mod order;
pub mod project;
pub mod set;
