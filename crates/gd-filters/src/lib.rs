//! # gd-filters
//!
//! Declarative filters for Go.Data RS list screens.
//!
//! A screen declares the [`FilterModel`]s it offers. The user edits
//! [`AppliedFilterModel`] rows in the side panel ([`AppliedFilterSet`]);
//! applying the panel translates every row into calls on a fresh
//! [`gd_queries::RequestQueryBuilder`].
//!
//! ## Structure
//!
//! - `types` - Filter types, comparators and value types
//! - `value` - Values entered for a row
//! - `comparators` - Allowed comparators and defaults per filter type
//! - `model` - Filter declarations and option providers
//! - `applied` - One row and its reset rules
//! - `apply` - Translation of rows into builder calls
//! - `side_filters` - The filter panel, saved filter snapshots

pub mod types;
pub mod value;
pub mod error;
pub mod comparators;
pub mod model;
pub mod applied;
pub mod apply;
pub mod side_filters;

pub use types::{FilterComparator, FilterType, ValueType};
pub use value::FilterValue;
pub use error::{FilterError, FilterResult};
pub use comparators::{ComparatorRule, ComparatorTable};
pub use model::{FilterModel, OptionsProvider, StaticOptions};
pub use applied::AppliedFilterModel;
pub use apply::{apply_filter, apply_filters, ApplyOptions};
pub use side_filters::{AppliedFilterSet, SavedAppliedFilter, SavedFilterData};
