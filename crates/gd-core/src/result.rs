//! Result type aliases

use crate::error::GdError;

/// Standard Result type for Go.Data operations
pub type GdResult<T> = Result<T, GdError>;
