//! Filter translation
//!
//! Turns applied filter rows into request builder calls. Rows are translated
//! in order; a row without a usable value adds nothing. Relationship-scoped
//! rows land in the nested builder of their include path, where conditions
//! always combine with AND whatever the top-level operator is.

use gd_queries::condition::{end_of_day, start_of_day, text_pattern};
use gd_queries::{DateRange, GeoPoint, MergeConfig, RangeValue, RequestQueryBuilder, TextMatch};
use serde_json::{json, Value};

use crate::applied::AppliedFilterModel;
use crate::model::FilterModel;
use crate::types::{FilterComparator, FilterType};
use crate::value::FilterValue;

/// Address properties searched by the address `contains` comparator
pub const ADDRESS_SEARCH_FIELDS: [&str; 3] = ["addressLine1", "city", "postalCode"];

/// Suffix of the geo point property inside an address
pub const GEO_LOCATION_FIELD: &str = "geoLocation";

/// Translation switches for one screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyOptions {
    /// Text comparators ignore case
    pub case_insensitive: bool,
    /// Emit top-level conditions as first-level keys of `where`
    pub first_level: bool,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            case_insensitive: true,
            first_level: false,
        }
    }
}

/// Translate every row into `qb`; returns how many rows added conditions
pub fn apply_filters<'a>(
    qb: &mut RequestQueryBuilder,
    rows: impl IntoIterator<Item = &'a AppliedFilterModel>,
    options: ApplyOptions,
) -> usize {
    rows.into_iter()
        .filter(|row| apply_filter(qb, row, options))
        .count()
}

/// Translate one row; `false` when it contributed nothing
pub fn apply_filter(qb: &mut RequestQueryBuilder, row: &AppliedFilterModel, options: ApplyOptions) -> bool {
    let (Some(filter), Some(comparator)) = (row.filter(), row.comparator()) else {
        return false;
    };
    if !row.is_applicable() {
        tracing::debug!(filter = %filter.key(), "skipping filter without a value");
        return false;
    }

    let first_level = options.first_level && !filter.is_relationship();
    let target = qb.include_path(filter.relationship_path());
    let before = target.filter.len();

    translate(target, filter, comparator, row.value(), options.case_insensitive, first_level);
    if let Some(extra) = filter.extra_conditions() {
        target.merge(extra, MergeConfig::default());
    }

    let added = target.filter.len() > before;
    tracing::debug!(filter = %filter.key(), %comparator, added, "applied filter");
    added
}

fn translate(
    target: &mut RequestQueryBuilder,
    filter: &FilterModel,
    comparator: FilterComparator,
    value: Option<&FilterValue>,
    case_insensitive: bool,
    first_level: bool,
) {
    use FilterComparator as C;

    let field = filter.field_name();
    let conditions = &mut target.filter;

    let value = match (comparator, value) {
        (C::HasValue, _) => {
            conditions.by_existence(field, true, first_level);
            return;
        }
        (C::DoesNotHaveValue, _) => {
            conditions.by_existence(field, false, first_level);
            return;
        }
        (_, Some(value)) => value,
        (_, None) => return,
    };

    match (comparator, value) {
        (C::TextStartsWith, FilterValue::Text(text)) => {
            conditions.by_text(field, text.trim(), case_insensitive, first_level);
        }
        (C::ContainsText, FilterValue::Text(text)) => {
            conditions.by_containing_text(field, text.trim(), case_insensitive, first_level);
        }
        (C::Is, FilterValue::Text(text)) => {
            conditions.by_equality(field, text.trim(), first_level);
        }
        (C::Is, FilterValue::Number(number)) => {
            conditions.by_equality(field, number.clone(), first_level);
        }
        (C::Is, FilterValue::Boolean(flag)) => {
            conditions.by_equality(field, *flag, first_level);
        }
        (C::AtLeast, FilterValue::Number(number)) => {
            conditions.by_range(field, RangeValue::at_least(number.clone()), first_level);
        }
        (C::AtMost, FilterValue::Number(number)) => {
            conditions.by_range(field, RangeValue::at_most(number.clone()), first_level);
        }
        (C::Between | C::AtLeast | C::AtMost, FilterValue::NumberRange(range)) => {
            let mut range = match comparator {
                C::AtLeast => RangeValue::new(range.from.clone(), None),
                C::AtMost => RangeValue::new(None, range.to.clone()),
                _ => range.clone(),
            };
            if filter.filter_type() == FilterType::RangeAge {
                range = whole_years(range);
            }
            conditions.by_range(field, range, first_level);
        }
        (C::Between, FilterValue::DateRange(range)) => {
            conditions.by_date_range(field, range.clone(), first_level);
        }
        (C::Before, FilterValue::DateRange(range)) => {
            let end = range.end_date.clone().or_else(|| range.start_date.clone());
            conditions.by_date_range(field, DateRange::new(None, end), first_level);
        }
        (C::After, FilterValue::DateRange(range)) => {
            let start = range.start_date.clone().or_else(|| range.end_date.clone());
            conditions.by_date_range(field, DateRange::new(start, None), first_level);
        }
        (C::DayIs, FilterValue::Date(day)) => {
            conditions.by_date_range(field, DateRange::day(*day), first_level);
        }
        (C::Before, FilterValue::Date(day)) => {
            conditions.by_date_range(field, DateRange::until(start_of_day(*day)), first_level);
        }
        (C::After, FilterValue::Date(day)) => {
            conditions.by_date_range(field, DateRange::since(end_of_day(*day)), first_level);
        }
        (C::None | C::Location, FilterValue::List(values)) => {
            conditions.by_select(field, values.clone(), first_level, None);
        }
        (C::Contains, FilterValue::Text(text)) => {
            target.merge(&address_search(field, text.trim(), case_insensitive), MergeConfig::filter_only());
        }
        (C::Within, FilterValue::Geo { point, radius_km }) => {
            conditions.by_geo_within(geo_field(field), *point, *radius_km, first_level);
        }
        (comparator, value) => {
            tracing::warn!(
                filter = %filter.key(),
                %comparator,
                value_type = %value.value_type(),
                "no translation for comparator and value, filter ignored"
            );
        }
    }
}

/// Builder matching addresses whose line, city or postal code contains `text`
pub fn address_search(field: &str, text: &str, case_insensitive: bool) -> RequestQueryBuilder {
    let alternatives: Vec<Value> = ADDRESS_SEARCH_FIELDS
        .iter()
        .map(|property| {
            json!({ *property: { "regexp": text_pattern(text, TextMatch::Contains, case_insensitive) } })
        })
        .collect();

    let mut qb = RequestQueryBuilder::new();
    qb.filter
        .where_raw(json!({ field: { "elemMatch": { "or": alternatives } } }), false);
    qb
}

/// Geo point property of an address field
pub fn geo_field(field: &str) -> String {
    format!("{}.{}", field, GEO_LOCATION_FIELD)
}

/// Age filters match whole years: lower bound rounded down, upper bound up
fn whole_years(range: RangeValue) -> RangeValue {
    let round = |bound: Option<Value>, f: fn(f64) -> f64| {
        bound.map(|value| match value.as_f64() {
            Some(years) if years.is_finite() => Value::from(f(years) as i64),
            _ => value,
        })
    };
    RangeValue::new(round(range.from, f64::floor), round(range.to, f64::ceil))
}

/// Convenience for callers holding a bare point and radius
pub fn geo_value(lat: f64, lng: f64, radius_km: f64) -> FilterValue {
    FilterValue::geo(GeoPoint::new(lat, lng), radius_km)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparators::ComparatorTable;
    use chrono::NaiveDate;
    use std::sync::Arc;

    fn row(filter: FilterModel, comparator: FilterComparator, value: Option<FilterValue>) -> AppliedFilterModel {
        let mut row = AppliedFilterModel::with_filter(Arc::new(ComparatorTable::standard()), filter);
        row.set_comparator(comparator).unwrap();
        if let Some(value) = value {
            row.set_value(value).unwrap();
        }
        row
    }

    fn where_of(rows: &[AppliedFilterModel]) -> Option<Value> {
        let mut qb = RequestQueryBuilder::new();
        apply_filters(&mut qb, rows, ApplyOptions::default());
        qb.build_query().get("where").cloned()
    }

    #[test]
    fn test_text_comparators() {
        let name = || FilterModel::new("lastName", "Last name", FilterType::Text);
        assert_eq!(
            where_of(&[row(name(), FilterComparator::TextStartsWith, Some(FilterValue::text("smi")))]),
            Some(json!({ "lastName": { "regexp": "/^smi/i" } }))
        );
        assert_eq!(
            where_of(&[row(name(), FilterComparator::ContainsText, Some(FilterValue::text("mit")))]),
            Some(json!({ "lastName": { "regexp": "/mit/i" } }))
        );
        assert_eq!(
            where_of(&[row(name(), FilterComparator::Is, Some(FilterValue::text(" Smith ")))]),
            Some(json!({ "lastName": "Smith" }))
        );
    }

    #[test]
    fn test_row_without_value_is_skipped() {
        let empty = row(
            FilterModel::new("lastName", "Last name", FilterType::Text),
            FilterComparator::TextStartsWith,
            None,
        );
        let mut qb = RequestQueryBuilder::new();
        assert!(!apply_filter(&mut qb, &empty, ApplyOptions::default()));
        assert!(qb.is_empty());
    }

    #[test]
    fn test_presence_comparators_need_no_value() {
        let model = || FilterModel::new("dateOfOnset", "Date of onset", FilterType::Date);
        assert_eq!(
            where_of(&[row(model(), FilterComparator::HasValue, None)]),
            Some(json!({ "dateOfOnset": { "neq": null } }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::DoesNotHaveValue, None)]),
            Some(json!({ "dateOfOnset": { "eq": null } }))
        );
    }

    #[test]
    fn test_range_date_before_and_after() {
        let model = || FilterModel::new("dateOfReporting", "Date of reporting", FilterType::RangeDate);
        let value = || Some(FilterValue::DateRange(DateRange::since("2024-01-01")));
        assert_eq!(
            where_of(&[row(model(), FilterComparator::Before, value())]),
            Some(json!({ "dateOfReporting": { "lte": "2024-01-01" } }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::After, value())]),
            Some(json!({ "dateOfReporting": { "gte": "2024-01-01" } }))
        );
        assert_eq!(
            where_of(&[row(
                model(),
                FilterComparator::Between,
                Some(FilterValue::DateRange(DateRange::between("2024-01-01", "2024-02-01")))
            )]),
            Some(json!({ "dateOfReporting": { "between": ["2024-01-01", "2024-02-01"] } }))
        );
    }

    #[test]
    fn test_single_date_comparators() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let model = || FilterModel::new("dateOfOnset", "Date of onset", FilterType::Date);
        assert_eq!(
            where_of(&[row(model(), FilterComparator::DayIs, Some(FilterValue::Date(day)))]),
            Some(json!({
                "dateOfOnset": { "between": ["2024-03-05T00:00:00.000Z", "2024-03-05T23:59:59.999Z"] }
            }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::Before, Some(FilterValue::Date(day)))]),
            Some(json!({ "dateOfOnset": { "lte": "2024-03-05T00:00:00.000Z" } }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::After, Some(FilterValue::Date(day)))]),
            Some(json!({ "dateOfOnset": { "gte": "2024-03-05T23:59:59.999Z" } }))
        );
    }

    #[test]
    fn test_age_range_rounds_to_whole_years() {
        let model = FilterModel::new("age.years", "Age", FilterType::RangeAge);
        let value = FilterValue::NumberRange(RangeValue::between(2.5, 10.2));
        assert_eq!(
            where_of(&[row(model, FilterComparator::Between, Some(value))]),
            Some(json!({ "age.years": { "between": [2, 11] } }))
        );
    }

    #[test]
    fn test_number_range_one_sided_comparators() {
        let model = || FilterModel::new("visits", "Visits", FilterType::RangeNumber);
        let value = || Some(FilterValue::NumberRange(RangeValue::between(3, 8)));
        assert_eq!(
            where_of(&[row(model(), FilterComparator::AtLeast, value())]),
            Some(json!({ "visits": { "gte": 3 } }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::AtMost, value())]),
            Some(json!({ "visits": { "lte": 8 } }))
        );
    }

    #[test]
    fn test_select_and_empty_select() {
        let model = || FilterModel::new("classification", "Classification", FilterType::Multiselect);
        assert_eq!(
            where_of(&[row(model(), FilterComparator::None, Some(FilterValue::list(["CONFIRMED"])))]),
            Some(json!({ "classification": { "inq": ["CONFIRMED"] } }))
        );
        assert_eq!(
            where_of(&[row(model(), FilterComparator::None, Some(FilterValue::List(vec![])))]),
            None
        );
    }

    #[test]
    fn test_address_contains_uses_elem_match() {
        let model = FilterModel::new("addresses", "Address", FilterType::Address);
        let value = FilterValue::text("main");
        assert_eq!(
            where_of(&[row(model, FilterComparator::Contains, Some(value))]),
            Some(json!({
                "addresses": { "elemMatch": { "or": [
                    { "addressLine1": { "regexp": "/main/i" } },
                    { "city": { "regexp": "/main/i" } },
                    { "postalCode": { "regexp": "/main/i" } }
                ] } }
            }))
        );
    }

    #[test]
    fn test_address_within_radius() {
        let model = FilterModel::new("addresses", "Address", FilterType::Address);
        let built = where_of(&[row(model, FilterComparator::Within, Some(geo_value(10.0, 20.0, 6378.1)))]);
        assert_eq!(
            built,
            Some(json!({
                "addresses.geoLocation": { "geoWithin": { "$centerSphere": [[20.0, 10.0], 1.0] } }
            }))
        );
    }

    #[test]
    fn test_relationship_filter_goes_into_include() {
        let model = FilterModel::new("firstName", "First name", FilterType::Text)
            .with_relationship(["contact"], "Contact");
        let mut qb = RequestQueryBuilder::new();
        qb.filter.set_operator(gd_queries::FilterOperator::Or);
        let row = row(model, FilterComparator::Is, Some(FilterValue::text("Ann")));
        let options = ApplyOptions {
            first_level: true,
            ..ApplyOptions::default()
        };
        assert!(apply_filter(&mut qb, &row, options));

        assert_eq!(
            qb.build_query(),
            json!({ "include": [{ "relation": "contact", "scope": { "where": { "firstName": "Ann" } } }] })
        );
    }

    #[test]
    fn test_extra_conditions_are_merged() {
        let mut extra = RequestQueryBuilder::new();
        extra.filter.by_equality("active", true, false);
        let model = FilterModel::new("lastName", "Last name", FilterType::Text).with_extra_conditions(extra);
        assert_eq!(
            where_of(&[row(model, FilterComparator::Is, Some(FilterValue::text("Lee")))]),
            Some(json!({ "and": [{ "lastName": "Lee" }, { "active": true }] }))
        );
    }

    #[test]
    fn test_first_level_option() {
        let model = FilterModel::new("outbreakId", "Outbreak", FilterType::Text);
        let mut qb = RequestQueryBuilder::new();
        qb.filter.by_equality("classification", "CONFIRMED", false);
        let options = ApplyOptions {
            first_level: true,
            ..ApplyOptions::default()
        };
        apply_filter(&mut qb, &row(model, FilterComparator::Is, Some(FilterValue::text("o-1"))), options);
        assert_eq!(
            qb.where_clause(),
            Some(json!({ "and": [{ "classification": "CONFIRMED" }], "outbreakId": "o-1" }))
        );
    }
}
