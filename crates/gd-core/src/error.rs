//! Core error types for Go.Data RS
//!
//! The query builder itself cannot fail. Errors come from filter selection,
//! configuration loading and the data-service collaborator.

use std::collections::BTreeMap;
use thiserror::Error;

/// Core error type for all Go.Data operations
#[derive(Error, Debug)]
pub enum GdError {
    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Transport error ({status}): {message}")]
    Transport { status: u16, message: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl GdError {
    /// Build a transport error from a status and message
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            GdError::NotFound { .. } => 404,
            GdError::Validation(_) => 422,
            GdError::Transport { status, .. } => *status,
            GdError::Config(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            GdError::NotFound { .. } => "not_found",
            GdError::Validation(_) => "validation_failed",
            GdError::Transport { .. } => "transport_error",
            GdError::Config(_) => "configuration_error",
        }
    }
}

/// Validation errors collection, keyed by field
#[derive(Error, Debug, Default, Clone)]
#[error("Validation errors: {errors:?}")]
pub struct ValidationErrors {
    /// Field-specific errors: field_name -> Vec<error_messages>
    pub errors: BTreeMap<String, Vec<String>>,
    /// Base errors not tied to a specific field
    pub base_errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shorthand for a single field error
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn add_base(&mut self, message: impl Into<String>) {
        self.base_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty() && self.base_errors.is_empty()
    }

    /// Check if there are errors for a specific field
    pub fn has_error(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn merge(&mut self, other: ValidationErrors) {
        for (field, messages) in other.errors {
            self.errors.entry(field).or_default().extend(messages);
        }
        self.base_errors.extend(other.base_errors);
    }

    pub fn full_messages(&self) -> Vec<String> {
        let mut messages = self.base_errors.clone();
        for (field, field_messages) in &self.errors {
            for msg in field_messages {
                messages.push(format!("{} {}", field, msg));
            }
        }
        messages
    }
}
