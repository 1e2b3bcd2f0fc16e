//! Query Conditions
//!
//! A condition is a single predicate over one field, encoded in the
//! Loopback-style filter dialect the REST API understands.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Mean earth radius used to convert kilometres to radians for `$centerSphere`
pub const EARTH_RADIUS_KM: f64 = 6378.1;

/// Inclusive numeric (or otherwise comparable) bounds
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RangeValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Value>,
}

impl RangeValue {
    pub fn new(from: Option<Value>, to: Option<Value>) -> Self {
        Self { from, to }
    }

    pub fn between(from: impl Into<Value>, to: impl Into<Value>) -> Self {
        Self::new(Some(from.into()), Some(to.into()))
    }

    pub fn at_least(from: impl Into<Value>) -> Self {
        Self::new(Some(from.into()), None)
    }

    pub fn at_most(to: impl Into<Value>) -> Self {
        Self::new(None, Some(to.into()))
    }

    /// Neither bound is set (null bounds count as unset)
    pub fn is_empty(&self) -> bool {
        is_unset(&self.from) && is_unset(&self.to)
    }
}

/// Inclusive timestamp bounds, ISO-8601 strings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
}

impl DateRange {
    pub fn new(start_date: Option<String>, end_date: Option<String>) -> Self {
        Self {
            start_date: start_date.filter(|s| !s.is_empty()),
            end_date: end_date.filter(|s| !s.is_empty()),
        }
    }

    pub fn between(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self::new(Some(start.into()), Some(end.into()))
    }

    pub fn since(start: impl Into<String>) -> Self {
        Self::new(Some(start.into()), None)
    }

    pub fn until(end: impl Into<String>) -> Self {
        Self::new(None, Some(end.into()))
    }

    /// The whole UTC day, from 00:00:00.000 to 23:59:59.999
    pub fn day(date: NaiveDate) -> Self {
        Self::between(start_of_day(date), end_of_day(date))
    }

    pub fn is_empty(&self) -> bool {
        self.start_date.is_none() && self.end_date.is_none()
    }
}

/// `2024-01-01T00:00:00.000Z`
pub fn start_of_day(date: NaiveDate) -> String {
    date.and_time(NaiveTime::MIN)
        .and_utc()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// `2024-01-01T23:59:59.999Z`
pub fn end_of_day(date: NaiveDate) -> String {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end)
        .and_utc()
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// How user text is anchored against the stored value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextMatch {
    #[default]
    StartsWith,
    Contains,
    Exact,
}

/// Point on the map, degrees
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A single predicate over one field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `{field: value}`
    Equality { field: String, value: Value },
    /// `{field: {between: [from, to]}}`, or a one-sided `gte`/`lte`
    Range { field: String, range: RangeValue },
    /// Same shape as `Range`, bounds are timestamps
    DateRange { field: String, range: DateRange },
    /// `{field: {regexp: "/^text/i"}}`
    Text {
        field: String,
        text: String,
        matching: TextMatch,
        case_insensitive: bool,
    },
    /// `{field: {inq: [...]}}`
    SetMembership { field: String, values: Vec<Value> },
    /// `{field: true}`, always emitted at the first level of `where`
    Flag { field: String, value: bool },
    /// `{field: {neq: null}}` or `{field: {eq: null}}`
    Exists { field: String, present: bool },
    /// `{field: {geoWithin: {$centerSphere: [[lng, lat], radians]}}}`
    GeoWithin {
        field: String,
        point: GeoPoint,
        radius_km: f64,
    },
    /// Opaque backend-dialect fragment, passed through untouched
    Raw(Map<String, Value>),
}

impl Condition {
    pub fn equality(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equality {
            field: field.into(),
            value: value.into(),
        }
    }

    /// `None` when neither bound is set
    pub fn range(field: impl Into<String>, range: RangeValue) -> Option<Self> {
        if range.is_empty() {
            return None;
        }
        Some(Self::Range {
            field: field.into(),
            range,
        })
    }

    /// `None` when neither bound is set
    pub fn date_range(field: impl Into<String>, range: DateRange) -> Option<Self> {
        if range.is_empty() {
            return None;
        }
        Some(Self::DateRange {
            field: field.into(),
            range,
        })
    }

    /// `None` for empty text
    pub fn text(
        field: impl Into<String>,
        text: impl Into<String>,
        matching: TextMatch,
        case_insensitive: bool,
    ) -> Option<Self> {
        let text = text.into();
        if text.is_empty() {
            return None;
        }
        Some(Self::Text {
            field: field.into(),
            text,
            matching,
            case_insensitive,
        })
    }

    /// `None` for an empty value list
    pub fn set_membership(field: impl Into<String>, values: Vec<Value>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        Some(Self::SetMembership {
            field: field.into(),
            values,
        })
    }

    pub fn flag(field: impl Into<String>, value: bool) -> Self {
        Self::Flag {
            field: field.into(),
            value,
        }
    }

    pub fn exists(field: impl Into<String>, present: bool) -> Self {
        Self::Exists {
            field: field.into(),
            present,
        }
    }

    pub fn geo_within(field: impl Into<String>, point: GeoPoint, radius_km: f64) -> Self {
        Self::GeoWithin {
            field: field.into(),
            point,
            radius_km,
        }
    }

    /// `None` unless the value is a non-empty JSON object
    pub fn raw(condition: Value) -> Option<Self> {
        match condition {
            Value::Object(map) if !map.is_empty() => Some(Self::Raw(map)),
            _ => None,
        }
    }

    /// Field the condition targets; raw fragments have none
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Equality { field, .. }
            | Self::Range { field, .. }
            | Self::DateRange { field, .. }
            | Self::Text { field, .. }
            | Self::SetMembership { field, .. }
            | Self::Flag { field, .. }
            | Self::Exists { field, .. }
            | Self::GeoWithin { field, .. } => Some(field),
            Self::Raw(_) => None,
        }
    }

    /// Whether the condition mentions `field`, at any depth for raw fragments
    pub fn references(&self, field: &str) -> bool {
        match self {
            Self::Raw(map) => map_references(map, field),
            other => other.field() == Some(field),
        }
    }

    pub fn is_raw(&self) -> bool {
        matches!(self, Self::Raw(_))
    }

    /// Encode into the backend filter dialect
    pub fn to_value(&self) -> Value {
        match self {
            Self::Equality { field, value } => single(field, value.clone()),
            Self::Range { field, range } => single(field, bounds(range.from.clone(), range.to.clone())),
            Self::DateRange { field, range } => single(
                field,
                bounds(
                    range.start_date.clone().map(Value::String),
                    range.end_date.clone().map(Value::String),
                ),
            ),
            Self::Text {
                field,
                text,
                matching,
                case_insensitive,
            } => single(field, json!({ "regexp": text_pattern(text, *matching, *case_insensitive) })),
            Self::SetMembership { field, values } => single(field, json!({ "inq": values })),
            Self::Flag { field, value } => single(field, Value::Bool(*value)),
            Self::Exists { field, present } => {
                if *present {
                    single(field, json!({ "neq": null }))
                } else {
                    single(field, json!({ "eq": null }))
                }
            }
            Self::GeoWithin {
                field,
                point,
                radius_km,
            } => single(
                field,
                json!({
                    "geoWithin": {
                        "$centerSphere": [[point.lng, point.lat], radius_km / EARTH_RADIUS_KM]
                    }
                }),
            ),
            Self::Raw(map) => Value::Object(map.clone()),
        }
    }
}

fn is_unset(bound: &Option<Value>) -> bool {
    matches!(bound, None | Some(Value::Null))
}

fn single(field: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(field.to_string(), value);
    Value::Object(map)
}

fn bounds(from: Option<Value>, to: Option<Value>) -> Value {
    let from = from.filter(|v| !v.is_null());
    let to = to.filter(|v| !v.is_null());
    match (from, to) {
        (Some(from), Some(to)) => json!({ "between": [from, to] }),
        (Some(from), None) => json!({ "gte": from }),
        (None, Some(to)) => json!({ "lte": to }),
        (None, None) => Value::Object(Map::new()),
    }
}

/// Loopback `regexp` literal for user text
pub fn text_pattern(text: &str, matching: TextMatch, case_insensitive: bool) -> String {
    let escaped = regex::escape(text);
    let body = match matching {
        TextMatch::StartsWith => format!("^{}", escaped),
        TextMatch::Contains => escaped,
        TextMatch::Exact => format!("^{}$", escaped),
    };
    let flags = if case_insensitive { "i" } else { "" };
    format!("/{}/{}", body, flags)
}

fn map_references(map: &Map<String, Value>, field: &str) -> bool {
    map.iter()
        .any(|(key, value)| key == field || value_references(value, field))
}

fn value_references(value: &Value, field: &str) -> bool {
    match value {
        Value::Object(map) => map_references(map, field),
        Value::Array(items) => items.iter().any(|item| value_references(item, field)),
        _ => false,
    }
}
