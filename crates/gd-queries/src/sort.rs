//! Request Sort Orders
//!
//! Sort orders define how list results are ordered. The first key has the
//! highest priority.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending order (A-Z, 1-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-1, newest first)
    Desc,
}

impl SortDirection {
    /// Keyword used by the backend dialect
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Get the opposite direction
    pub fn reverse(&self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" | "ascending" => Ok(Self::Asc),
            "desc" | "descending" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{}'", other)),
        }
    }
}

/// A single sort criterion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortCriterion {
    /// The field to sort by
    pub field: String,
    /// The sort direction
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortCriterion {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            field: field.into(),
            direction,
        }
    }

    pub fn asc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Asc)
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Desc)
    }

    /// `["field", "ASC"]`
    pub fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::String(self.field.clone()),
            Value::String(self.direction.as_str().to_string()),
        ])
    }
}

/// Ordered collection of sort criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSort {
    criteria: Vec<SortCriterion>,
}

impl RequestSort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a sort key; a field already sorted on keeps its position and
    /// takes the new direction
    pub fn by(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        let field = field.into();
        match self.criteria.iter_mut().find(|c| c.field == field) {
            Some(existing) => existing.direction = direction,
            None => self.criteria.push(SortCriterion::new(field, direction)),
        }
        self
    }

    /// Get all sort criteria
    pub fn criteria(&self) -> &[SortCriterion] {
        &self.criteria
    }

    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }

    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Get the primary (first) sort criterion
    pub fn primary(&self) -> Option<&SortCriterion> {
        self.criteria.first()
    }

    /// Check if sorting by a specific field
    pub fn sorts_by(&self, field: &str) -> bool {
        self.criteria.iter().any(|c| c.field == field)
    }

    /// Remove sort for a specific field
    pub fn remove(&mut self, field: &str) -> &mut Self {
        self.criteria.retain(|c| c.field != field);
        self
    }

    /// Clear all sort criteria
    pub fn clear(&mut self) -> &mut Self {
        self.criteria.clear();
        self
    }

    /// Append the other order's keys that are not sorted on yet
    pub fn merge(&mut self, other: &RequestSort) -> &mut Self {
        for criterion in &other.criteria {
            if !self.sorts_by(&criterion.field) {
                self.criteria.push(criterion.clone());
            }
        }
        self
    }

    /// Serialize into the `order` array; `None` when unsorted
    pub fn to_order(&self) -> Option<Value> {
        if self.criteria.is_empty() {
            return None;
        }
        Some(Value::Array(self.criteria.iter().map(SortCriterion::to_value).collect()))
    }
}
