//! Values entered for a filter row

use chrono::NaiveDate;
use gd_queries::{DateRange, GeoPoint, RangeValue};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::types::ValueType;

/// A user-entered filter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum FilterValue {
    Text(String),
    Number(Number),
    NumberRange(RangeValue),
    DateRange(DateRange),
    Date(NaiveDate),
    List(Vec<Value>),
    Geo { point: GeoPoint, radius_km: f64 },
    Boolean(bool),
}

impl FilterValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    pub fn number(number: impl Into<Number>) -> Self {
        Self::Number(number.into())
    }

    /// `None` for NaN or infinite values
    pub fn float(number: f64) -> Option<Self> {
        Number::from_f64(number).map(Self::Number)
    }

    pub fn list<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }

    pub fn geo(point: GeoPoint, radius_km: f64) -> Self {
        Self::Geo { point, radius_km }
    }

    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) => ValueType::Text,
            Self::Number(_) => ValueType::Number,
            Self::NumberRange(_) => ValueType::NumberRange,
            Self::DateRange(_) => ValueType::DateRange,
            Self::Date(_) => ValueType::Date,
            Self::List(_) => ValueType::List,
            Self::Geo { .. } => ValueType::Geo,
            Self::Boolean(_) => ValueType::Boolean,
        }
    }

    /// A value that would not constrain anything (blank text, empty list, open range)
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::NumberRange(range) => range.is_empty(),
            Self::DateRange(range) => range.is_empty(),
            Self::List(values) => values.is_empty(),
            Self::Number(_) | Self::Date(_) | Self::Geo { .. } | Self::Boolean(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_types() {
        assert_eq!(FilterValue::text("smith").value_type(), ValueType::Text);
        assert_eq!(FilterValue::number(3).value_type(), ValueType::Number);
        assert_eq!(
            FilterValue::DateRange(DateRange::until("2024-01-01")).value_type(),
            ValueType::DateRange
        );
        assert_eq!(FilterValue::list(["A", "B"]).value_type(), ValueType::List);
    }

    #[test]
    fn test_blank_values() {
        assert!(FilterValue::text("  ").is_blank());
        assert!(FilterValue::List(vec![]).is_blank());
        assert!(FilterValue::NumberRange(RangeValue::default()).is_blank());
        assert!(!FilterValue::Boolean(false).is_blank());
        assert!(FilterValue::float(f64::NAN).is_none());
    }

    #[test]
    fn test_tagged_serialization() {
        let value = FilterValue::DateRange(DateRange::until("2024-01-01"));
        let json = serde_json::to_value(&value).unwrap();
        assert_eq!(json, json!({ "type": "date-range", "value": { "endDate": "2024-01-01" } }));

        let back: FilterValue = serde_json::from_value(json).unwrap();
        assert_eq!(back, value);

        let date: FilterValue = serde_json::from_value(json!({ "type": "date", "value": "2024-02-29" })).unwrap();
        assert_eq!(date, FilterValue::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()));
    }
}
