//! Filter types, comparators and value types

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of input a filter offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    Text,
    Number,
    Select,
    Multiselect,
    RangeNumber,
    RangeAge,
    RangeDate,
    Date,
    Address,
    Location,
    Boolean,
}

impl FilterType {
    pub const ALL: [FilterType; 11] = [
        Self::Text,
        Self::Number,
        Self::Select,
        Self::Multiselect,
        Self::RangeNumber,
        Self::RangeAge,
        Self::RangeDate,
        Self::Date,
        Self::Address,
        Self::Location,
        Self::Boolean,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::RangeNumber => "range-number",
            Self::RangeAge => "range-age",
            Self::RangeDate => "range-date",
            Self::Date => "date",
            Self::Address => "address",
            Self::Location => "location",
            Self::Boolean => "boolean",
        }
    }

    /// Filters whose options come from an option list
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect | Self::Location)
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FilterType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown filter type '{}'", s))
    }
}

/// Operator the user picks for a filter row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterComparator {
    /// Select lists: value in the chosen options
    None,
    TextStartsWith,
    ContainsText,
    Is,
    HasValue,
    DoesNotHaveValue,
    Between,
    Before,
    After,
    AtLeast,
    AtMost,
    /// Whole calendar day
    DayIs,
    /// Address text search
    Contains,
    /// Address within a radius of a point
    Within,
    /// Location or any of its sub-locations
    Location,
}

impl FilterComparator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::TextStartsWith => "text-starts-with",
            Self::ContainsText => "contains-text",
            Self::Is => "is",
            Self::HasValue => "has-value",
            Self::DoesNotHaveValue => "does-not-have-value",
            Self::Between => "between",
            Self::Before => "before",
            Self::After => "after",
            Self::AtLeast => "at-least",
            Self::AtMost => "at-most",
            Self::DayIs => "day-is",
            Self::Contains => "contains",
            Self::Within => "within",
            Self::Location => "location",
        }
    }
}

impl fmt::Display for FilterComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shape of the value a (filter type, comparator) pair works on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueType {
    Text,
    Number,
    NumberRange,
    DateRange,
    Date,
    List,
    Geo,
    Boolean,
    /// Comparator takes no value (has value / does not have value)
    Nothing,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::NumberRange => "number-range",
            Self::DateRange => "date-range",
            Self::Date => "date",
            Self::List => "list",
            Self::Geo => "geo",
            Self::Boolean => "boolean",
            Self::Nothing => "nothing",
        };
        f.write_str(s)
    }
}
