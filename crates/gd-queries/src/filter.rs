//! Request Filter
//!
//! The `where` part of a request: an ordered collection of conditions
//! combined with one boolean operator. Conditions flagged as first-level are
//! emitted as top-level keys of `where` instead of inside the operator array.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::condition::{Condition, DateRange, GeoPoint, RangeValue, TextMatch};

/// Boolean operator combining the conditions of a filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    #[default]
    And,
    Or,
}

impl FilterOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::And => "and",
            Self::Or => "or",
        }
    }
}

impl std::str::FromStr for FilterOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "and" => Ok(Self::And),
            "or" => Ok(Self::Or),
            other => Err(format!("unknown filter operator '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FilterEntry {
    condition: Condition,
    first_level: bool,
}

/// Conditions plus the operator combining them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    operator: FilterOperator,
    entries: Vec<FilterEntry>,
    first_level_mode: bool,
}

impl RequestFilter {
    /// Create a new empty filter combining with AND
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty filter with the given operator
    pub fn with_operator(operator: FilterOperator) -> Self {
        Self {
            operator,
            ..Self::default()
        }
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    /// Change the combination operator; existing conditions are kept as they are
    pub fn set_operator(&mut self, operator: FilterOperator) -> &mut Self {
        self.operator = operator;
        self
    }

    /// Emit every subsequently added condition at the first level of `where`
    pub fn first_level_conditions(&mut self) -> &mut Self {
        self.first_level_mode = true;
        self
    }

    pub fn is_first_level_mode(&self) -> bool {
        self.first_level_mode
    }

    /// Add an already constructed condition
    pub fn add(&mut self, condition: Condition, first_level: bool) -> &mut Self {
        let first_level = first_level || self.first_level_mode || matches!(condition, Condition::Flag { .. });
        self.entries.push(FilterEntry {
            condition,
            first_level,
        });
        self
    }

    fn add_opt(&mut self, condition: Option<Condition>, first_level: bool) -> &mut Self {
        if let Some(condition) = condition {
            self.add(condition, first_level);
        }
        self
    }

    /// `field == value`
    pub fn by_equality(&mut self, field: impl Into<String>, value: impl Into<Value>, first_level: bool) -> &mut Self {
        self.add(Condition::equality(field, value), first_level)
    }

    /// Inclusive bounds; no-op when both bounds are missing
    pub fn by_range(&mut self, field: impl Into<String>, range: RangeValue, first_level: bool) -> &mut Self {
        self.add_opt(Condition::range(field, range), first_level)
    }

    /// `startDate` → `field >= startDate`, `endDate` → `field <= endDate`
    pub fn by_date_range(&mut self, field: impl Into<String>, range: DateRange, first_level: bool) -> &mut Self {
        self.add_opt(Condition::date_range(field, range), first_level)
    }

    /// Text anchored at the start of the value
    pub fn by_text(
        &mut self,
        field: impl Into<String>,
        text: impl Into<String>,
        case_insensitive: bool,
        first_level: bool,
    ) -> &mut Self {
        self.by_text_match(field, text, TextMatch::StartsWith, case_insensitive, first_level)
    }

    /// Text found anywhere in the value
    pub fn by_containing_text(
        &mut self,
        field: impl Into<String>,
        text: impl Into<String>,
        case_insensitive: bool,
        first_level: bool,
    ) -> &mut Self {
        self.by_text_match(field, text, TextMatch::Contains, case_insensitive, first_level)
    }

    pub fn by_text_match(
        &mut self,
        field: impl Into<String>,
        text: impl Into<String>,
        matching: TextMatch,
        case_insensitive: bool,
        first_level: bool,
    ) -> &mut Self {
        self.add_opt(Condition::text(field, text, matching, case_insensitive), first_level)
    }

    /// Set membership.
    ///
    /// An empty `values` list adds nothing unless `empty_value` is given, in
    /// which case the field must equal that sentinel (e.g. `null` to match
    /// records without a value).
    pub fn by_select(
        &mut self,
        field: impl Into<String>,
        values: Vec<Value>,
        first_level: bool,
        empty_value: Option<Value>,
    ) -> &mut Self {
        let field = field.into();
        if values.is_empty() {
            return match empty_value {
                Some(sentinel) => self.by_equality(field, sentinel, first_level),
                None => self,
            };
        }
        self.add_opt(Condition::set_membership(field, values), first_level)
    }

    /// Boolean toggle, emitted at the first level of `where`
    pub fn flag(&mut self, field: impl Into<String>, value: bool) -> &mut Self {
        self.add(Condition::flag(field, value), true)
    }

    /// Field has (or has no) value
    pub fn by_existence(&mut self, field: impl Into<String>, present: bool, first_level: bool) -> &mut Self {
        self.add(Condition::exists(field, present), first_level)
    }

    /// Geo point inside a circle of `radius_km` around `point`
    pub fn by_geo_within(
        &mut self,
        field: impl Into<String>,
        point: GeoPoint,
        radius_km: f64,
        first_level: bool,
    ) -> &mut Self {
        self.add(Condition::geo_within(field, point, radius_km), first_level)
    }

    /// Inject a raw condition object.
    ///
    /// With `replace`, conditions already on the same level (first-level or
    /// nested, per the current mode) are dropped first. Non-object values are
    /// ignored.
    pub fn where_raw(&mut self, condition: Value, replace: bool) -> &mut Self {
        let Some(condition) = Condition::raw(condition) else {
            tracing::warn!("ignoring raw where condition that is not a non-empty object");
            return self;
        };
        if replace {
            let level = self.first_level_mode;
            self.entries.retain(|entry| entry.first_level != level);
        }
        self.add(condition, false)
    }

    /// Delete every condition referencing `field`
    pub fn remove(&mut self, field: &str) -> &mut Self {
        self.entries.retain(|entry| !entry.condition.references(field));
        self
    }

    /// Whether some condition references `field`
    pub fn has_condition_for(&self, field: &str) -> bool {
        self.entries.iter().any(|entry| entry.condition.references(field))
    }

    pub fn conditions(&self) -> impl Iterator<Item = &Condition> {
        self.entries.iter().map(|entry| &entry.condition)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop all conditions; operator and mode are kept
    pub fn clear(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    /// Union another filter's conditions into this one.
    ///
    /// Every merged condition is combined under this filter's operator; the
    /// other filter's operator and first-level mode are discarded. Use
    /// [`RequestFilter::intersect`] when the other filter's conditions must
    /// keep their own operator.
    pub fn merge(&mut self, other: &RequestFilter) -> &mut Self {
        self.push_missing(other.entries.iter().cloned());
        self
    }

    /// Constrain this filter by another: the result matches only what both match.
    ///
    /// Each side keeps its own operator. When both sides have nested
    /// conditions, a side combining with OR is folded into a single
    /// `{"or": [...]}` condition and the two sides are joined with AND.
    /// First-level conditions always constrain the whole `where`, so a side
    /// holding only first-level conditions leaves the other side's operator in
    /// place. This filter's first-level mode is kept.
    pub fn intersect(&mut self, other: &RequestFilter) -> &mut Self {
        if !self.has_nested() {
            self.operator = other.operator;
            self.push_missing(other.entries.iter().cloned());
        } else if !other.has_nested() {
            self.push_missing(other.entries.iter().cloned());
        } else {
            self.entries = self.and_entries();
            self.operator = FilterOperator::And;
            self.push_missing(other.and_entries());
        }
        self
    }

    fn push_missing(&mut self, entries: impl IntoIterator<Item = FilterEntry>) {
        for entry in entries {
            if !self.entries.contains(&entry) {
                self.entries.push(entry);
            }
        }
    }

    fn has_nested(&self) -> bool {
        self.entries.iter().any(|entry| !entry.first_level)
    }

    /// Entries equivalent to this filter when combined with AND
    fn and_entries(&self) -> Vec<FilterEntry> {
        let nested: Vec<Value> = self
            .entries
            .iter()
            .filter(|entry| !entry.first_level)
            .map(|entry| entry.condition.to_value())
            .collect();
        if self.operator == FilterOperator::And || nested.len() < 2 {
            return self.entries.clone();
        }

        let mut group = Map::new();
        group.insert(self.operator.as_str().to_string(), Value::Array(nested));
        let mut entries = vec![FilterEntry {
            condition: Condition::Raw(group),
            first_level: false,
        }];
        entries.extend(self.entries.iter().filter(|entry| entry.first_level).cloned());
        entries
    }

    /// Serialize into the `where` object; `None` when nothing constrains the query
    pub fn to_where(&self) -> Option<Value> {
        let nested: Vec<Value> = self
            .entries
            .iter()
            .filter(|entry| !entry.first_level)
            .map(|entry| entry.condition.to_value())
            .collect();
        let has_first_level = self.entries.iter().any(|entry| entry.first_level);

        let mut root = Map::new();
        match nested.len() {
            0 => {}
            1 if !has_first_level => return nested.into_iter().next(),
            _ => {
                root.insert(self.operator.as_str().to_string(), Value::Array(nested));
            }
        }

        for entry in self.entries.iter().filter(|entry| entry.first_level) {
            if let Value::Object(map) = entry.condition.to_value() {
                for (key, value) in map {
                    merge_key(&mut root, key, value);
                }
            }
        }

        if root.is_empty() {
            None
        } else {
            Some(Value::Object(root))
        }
    }
}

/// Arrays under the same key are concatenated, anything else is overwritten
fn merge_key(root: &mut Map<String, Value>, key: String, value: Value) {
    match (root.get_mut(&key), value) {
        (Some(Value::Array(existing)), Value::Array(items)) => existing.extend(items),
        (_, value) => {
            root.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_filter_has_no_where() {
        let filter = RequestFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.to_where(), None);
    }

    #[test]
    fn test_single_condition_is_unwrapped() {
        let mut filter = RequestFilter::new();
        filter.by_equality("firstName", "Ann", false);
        assert_eq!(filter.to_where(), Some(json!({ "firstName": "Ann" })));
    }

    #[test]
    fn test_conditions_wrapped_in_operator() {
        let mut filter = RequestFilter::with_operator(FilterOperator::Or);
        filter
            .by_equality("firstName", "Ann", false)
            .by_equality("lastName", "Smith", false);
        assert_eq!(
            filter.to_where(),
            Some(json!({ "or": [{ "firstName": "Ann" }, { "lastName": "Smith" }] }))
        );
    }

    #[test]
    fn test_first_level_conditions() {
        let mut filter = RequestFilter::new();
        filter.by_equality("classification", "CONFIRMED", false);
        filter.by_equality("outbreakId", "o-1", true);
        filter.flag("active", true);
        assert_eq!(
            filter.to_where(),
            Some(json!({
                "and": [{ "classification": "CONFIRMED" }],
                "outbreakId": "o-1",
                "active": true
            }))
        );
    }

    #[test]
    fn test_first_level_mode_applies_to_later_conditions() {
        let mut filter = RequestFilter::new();
        filter.by_equality("a", 1, false);
        filter.first_level_conditions();
        filter.by_equality("b", 2, false);
        assert!(filter.is_first_level_mode());
        assert_eq!(filter.to_where(), Some(json!({ "and": [{ "a": 1 }], "b": 2 })));
    }

    #[test]
    fn test_remove_by_field() {
        let mut filter = RequestFilter::new();
        filter
            .by_range("age.years", RangeValue::between(1, 10), false)
            .by_equality("age.years", 5, true)
            .where_raw(json!({ "or": [{ "age.years": 3 }, { "gender": "F" }] }), false)
            .by_equality("gender", "M", false);
        filter.remove("age.years");
        assert_eq!(filter.len(), 1);
        assert!(!filter.has_condition_for("age.years"));
        assert_eq!(filter.to_where(), Some(json!({ "gender": "M" })));
    }

    #[test]
    fn test_empty_range_is_noop() {
        let mut filter = RequestFilter::new();
        filter.by_range("age.years", RangeValue::default(), false);
        filter.by_date_range("dateOfOnset", DateRange::default(), false);
        assert!(filter.is_empty());
    }

    #[test]
    fn test_select_empty_values() {
        let mut filter = RequestFilter::new();
        filter.by_select("riskLevel", vec![], false, None);
        assert!(filter.is_empty());

        filter.by_select("riskLevel", vec![], false, Some(Value::Null));
        assert_eq!(filter.to_where(), Some(json!({ "riskLevel": null })));
    }

    #[test]
    fn test_where_raw_replace() {
        let mut filter = RequestFilter::new();
        filter.by_equality("a", 1, false).by_equality("b", 2, true);
        filter.where_raw(json!({ "c": 3 }), true);
        // nested `a` is replaced, first-level `b` survives
        assert_eq!(filter.to_where(), Some(json!({ "and": [{ "c": 3 }], "b": 2 })));
    }

    #[test]
    fn test_where_raw_without_replace_keeps_duplicates() {
        let mut filter = RequestFilter::new();
        filter.where_raw(json!({ "a": 1 }), false);
        filter.where_raw(json!({ "a": 2 }), false);
        assert_eq!(filter.to_where(), Some(json!({ "and": [{ "a": 1 }, { "a": 2 }] })));
    }

    #[test]
    fn test_merge_unions_conditions() {
        let mut left = RequestFilter::new();
        left.by_equality("x", 1, false);
        let mut right = RequestFilter::with_operator(FilterOperator::Or);
        right.by_equality("y", 2, false).by_equality("x", 1, false);

        left.merge(&right);
        assert_eq!(left.len(), 2);
        assert_eq!(left.to_where(), Some(json!({ "and": [{ "x": 1 }, { "y": 2 }] })));
    }

    #[test]
    fn test_intersect_folds_or_group() {
        let mut base = RequestFilter::new();
        base.where_raw(json!({ "deleted": false }), false);
        let mut side = RequestFilter::with_operator(FilterOperator::Or);
        side.by_equality("lastName", "Lee", false)
            .by_equality("city", "Oslo", false);

        side.intersect(&base);
        assert_eq!(side.operator(), FilterOperator::And);
        assert_eq!(
            side.to_where(),
            Some(json!({ "and": [
                { "or": [{ "lastName": "Lee" }, { "city": "Oslo" }] },
                { "deleted": false }
            ] }))
        );
        assert!(side.has_condition_for("city"));
    }

    #[test]
    fn test_intersect_keeps_or_over_first_level_base() {
        let mut base = RequestFilter::new();
        base.by_equality("outbreakId", "o-1", true);
        let mut side = RequestFilter::with_operator(FilterOperator::Or);
        side.by_equality("a", 1, false).by_equality("b", 2, false);

        base.intersect(&side);
        assert_eq!(
            base.to_where(),
            Some(json!({ "or": [{ "a": 1 }, { "b": 2 }], "outbreakId": "o-1" }))
        );
    }

    #[test]
    fn test_intersect_and_sides_union() {
        let mut left = RequestFilter::new();
        left.by_equality("x", 1, false);
        let mut right = RequestFilter::new();
        right.by_equality("y", 2, false).by_equality("x", 1, false);

        left.intersect(&right);
        assert_eq!(left.to_where(), Some(json!({ "and": [{ "x": 1 }, { "y": 2 }] })));
    }

    #[test]
    fn test_first_level_arrays_concatenate() {
        let mut filter = RequestFilter::new();
        filter.by_equality("a", 1, false).by_equality("b", 2, false);
        filter.add(Condition::raw(json!({ "and": [{ "c": 3 }] })).unwrap(), true);
        assert_eq!(
            filter.to_where(),
            Some(json!({ "and": [{ "a": 1 }, { "b": 2 }, { "c": 3 }] }))
        );
    }

    #[test]
    fn test_operator_parsing() {
        assert_eq!("OR".parse::<FilterOperator>(), Ok(FilterOperator::Or));
        assert!("xor".parse::<FilterOperator>().is_err());
    }
}
