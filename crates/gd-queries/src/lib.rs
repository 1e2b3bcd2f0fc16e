//! # gd-queries
//!
//! Request query builder for Go.Data RS.
//!
//! This crate accumulates filter conditions, sort keys, paging bounds and
//! included relations, then serializes them into the Loopback-style `filter`
//! object the REST API understands.
//!
//! ## Structure
//!
//! - `condition` - Single-field predicates and their wire encoding
//! - `filter` - Conditions combined under an AND/OR operator
//! - `sort` - Sort keys and directions
//! - `paginator` - Skip/limit bounds
//! - `relation` - Included relations with their own nested builder
//! - `builder` - The request query builder tying it all together
//!
//! ## Example
//!
//! ```
//! use gd_queries::{RequestQueryBuilder, SortDirection};
//! use serde_json::json;
//!
//! let mut qb = RequestQueryBuilder::new();
//! qb.filter.by_equality("classification", "CONFIRMED", false);
//! qb.include("locations", false);
//! qb.sort_by("lastName", SortDirection::Asc).limit(10);
//!
//! let count = qb.count_query();
//! assert!(count.build_query().get("limit").is_none());
//! assert_eq!(qb.build_query()["where"], json!({ "classification": "CONFIRMED" }));
//! ```

pub mod condition;
pub mod filter;
pub mod sort;
pub mod paginator;
pub mod relation;
pub mod builder;

// Re-exports for convenience
pub use condition::{Condition, DateRange, GeoPoint, RangeValue, TextMatch};
pub use filter::{FilterOperator, RequestFilter};
pub use sort::{RequestSort, SortCriterion, SortDirection};
pub use paginator::RequestPaginator;
pub use relation::RequestRelation;
pub use builder::{MergeConfig, RequestQueryBuilder};
