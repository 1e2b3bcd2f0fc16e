//! Shared value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of the outbreak a list screen is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutbreakId(String);

impl OutbreakId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutbreakId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OutbreakId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OutbreakId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Option entry of a select list (reference data, locations, teams...)
///
/// The value is kept opaque: whatever the backend stores for the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelValuePair {
    pub label: String,
    pub value: serde_json::Value,
}

impl LabelValuePair {
    pub fn new(label: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Count response returned by `filtered-count` style endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountResponse {
    pub count: u64,
}
