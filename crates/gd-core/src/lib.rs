//! # gd-core
//!
//! Core types and utilities for Go.Data RS.
//!
//! This crate provides the foundational building blocks used across all other crates:
//! - Common error types
//! - Result type aliases
//! - Shared value types (outbreak ids, label/value options)
//! - Paging settings for list screens
//! - Configuration types

pub mod error;
pub mod result;
pub mod types;
pub mod pagination;
pub mod config;

pub use error::*;
pub use result::*;
pub use types::*;
pub use pagination::*;
