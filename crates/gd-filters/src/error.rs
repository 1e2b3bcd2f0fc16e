//! Filter selection errors
//!
//! These are raised while the user edits filter rows. Translating rows into
//! a query never fails.

use gd_core::{GdError, ValidationErrors};
use thiserror::Error;

use crate::types::{FilterComparator, FilterType, ValueType};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    #[error("No filter selected")]
    NoFilterSelected,

    #[error("Comparator '{comparator}' is not allowed for {filter_type} filters")]
    ComparatorNotAllowed {
        comparator: FilterComparator,
        filter_type: FilterType,
    },

    #[error("Expected a {expected} value, got {actual}")]
    ValueTypeMismatch { expected: ValueType, actual: ValueType },

    #[error("Unknown filter '{0}'")]
    UnknownFilter(String),

    #[error("Filter '{0}' is required and cannot be removed")]
    RequiredFilter(String),

    #[error("No filter row at index {0}")]
    RowOutOfRange(usize),

    #[error("Field '{0}' is not sortable")]
    NotSortable(String),

    #[error("Invalid comparator table: {0}")]
    InvalidTable(String),
}

pub type FilterResult<T> = Result<T, FilterError>;

impl FilterError {
    /// Attribute the error is reported under
    pub fn attribute(&self) -> &'static str {
        match self {
            Self::NoFilterSelected | Self::UnknownFilter(_) | Self::RequiredFilter(_) => "filter",
            Self::ComparatorNotAllowed { .. } => "comparator",
            Self::ValueTypeMismatch { .. } => "value",
            Self::RowOutOfRange(_) => "row",
            Self::NotSortable(_) => "sort",
            Self::InvalidTable(_) => "comparator_table",
        }
    }
}

impl From<FilterError> for GdError {
    fn from(err: FilterError) -> Self {
        match err {
            FilterError::InvalidTable(message) => GdError::Config(message),
            FilterError::UnknownFilter(key) => GdError::NotFound {
                entity: "filter",
                field: "key",
                value: key,
            },
            other => GdError::Validation(ValidationErrors::single(other.attribute(), other.to_string())),
        }
    }
}
