//! End-to-end filter panel scenarios: declarations, user edits, serialized filter.

use std::sync::Arc;

use gd_filters::{
    AppliedFilterSet, ComparatorTable, FilterComparator, FilterModel, FilterType, FilterValue,
};
use gd_queries::{DateRange, FilterOperator, MergeConfig, RequestQueryBuilder, SortDirection};
use serde_json::json;

fn case_filters() -> Vec<FilterModel> {
    vec![
        FilterModel::new("dateOfReporting", "Date of reporting", FilterType::RangeDate).sortable(),
        FilterModel::new("classification", "Classification", FilterType::Multiselect),
        FilterModel::new("firstName", "First name", FilterType::Text)
            .with_relationship(["contact"], "Contact"),
        FilterModel::new("lastName", "Last name", FilterType::Text).sortable(),
    ]
}

fn panel() -> AppliedFilterSet {
    AppliedFilterSet::new(case_filters(), Arc::new(ComparatorTable::standard()))
}

#[test]
fn test_reporting_date_before_and_classification() {
    let mut set = panel();

    set.select_filter(0, "dateOfReporting").unwrap();
    let row = set.row_mut(0).unwrap();
    row.set_comparator(FilterComparator::Before).unwrap();
    row.set_value(FilterValue::DateRange(DateRange::until("2024-01-01")))
        .unwrap();

    let row = set.add_filter("classification").unwrap();
    assert_eq!(row.comparator(), Some(FilterComparator::None));
    row.set_value(FilterValue::list(["CONFIRMED", "PROBABLE"])).unwrap();

    assert_eq!(
        set.apply().build_query(),
        json!({
            "where": { "and": [
                { "dateOfReporting": { "lte": "2024-01-01" } },
                { "classification": { "inq": ["CONFIRMED", "PROBABLE"] } }
            ] }
        })
    );
}

#[test]
fn test_no_filters_means_no_where() {
    let set = panel();
    assert_eq!(set.operator(), FilterOperator::And);
    let built = set.apply().build_query();
    assert!(built.get("where").is_none());
    assert_eq!(built, json!({}));
}

#[test]
fn test_relationship_filter_is_scoped_to_include() {
    let mut set = panel();
    set.select_filter(0, "contact.firstName").unwrap();
    set.row_mut(0)
        .unwrap()
        .set_value(FilterValue::text("Ann"))
        .unwrap();

    assert_eq!(
        set.apply().build_query(),
        json!({
            "include": [{
                "relation": "contact",
                "scope": { "where": { "firstName": { "regexp": "/^Ann/i" } } }
            }]
        })
    );
}

#[test]
fn test_text_to_range_date_resets_value() {
    let mut set = panel();
    set.select_filter(0, "lastName").unwrap();
    let row = set.row_mut(0).unwrap();
    row.set_comparator(FilterComparator::ContainsText).unwrap();
    row.set_value(FilterValue::text("smith")).unwrap();

    set.select_filter(0, "dateOfReporting").unwrap();
    assert!(set.rows()[0].value().is_none());
    assert!(set.apply().is_empty());
}

#[test]
fn test_before_to_after_keeps_entered_date() {
    let mut set = panel();
    set.select_filter(0, "dateOfReporting").unwrap();
    let row = set.row_mut(0).unwrap();
    row.set_comparator(FilterComparator::Before).unwrap();
    row.set_value(FilterValue::DateRange(DateRange::until("2024-01-01")))
        .unwrap();
    row.set_comparator(FilterComparator::After).unwrap();

    assert_eq!(
        set.apply().where_clause(),
        Some(json!({ "dateOfReporting": { "gte": "2024-01-01" } }))
    );
}

#[test]
fn test_side_filters_merge_with_screen_base_filter() {
    let mut base = RequestQueryBuilder::new();
    base.filter.by_equality("outbreakId", "outbreak-1", true);
    base.include("locations", false);

    let mut set = panel();
    set.set_operator(FilterOperator::Or);
    set.select_filter(0, "lastName").unwrap();
    set.row_mut(0)
        .unwrap()
        .set_value(FilterValue::text("Lee"))
        .unwrap();
    set.add_filter("contact.firstName")
        .unwrap()
        .set_value(FilterValue::text("Ann"))
        .unwrap();
    set.sort_by("lastName", SortDirection::Asc).unwrap();

    let mut qb = set.apply();
    qb.intersect(&base, MergeConfig::default());
    qb.limit(25);

    let count = qb.count_query();
    let built = qb.build_query();
    assert_eq!(
        built,
        json!({
            "where": {
                "or": [{ "lastName": { "regexp": "/^Lee/i" } }],
                "outbreakId": "outbreak-1"
            },
            "order": [["lastName", "ASC"]],
            "limit": 25,
            "include": [
                { "relation": "contact", "scope": { "where": { "firstName": { "regexp": "/^Ann/i" } } } },
                { "relation": "locations" }
            ]
        })
    );
    assert_eq!(count.build_query().get("where"), built.get("where"));
    assert!(count.build_query().get("limit").is_none());
}

#[test]
fn test_or_panel_stays_inside_nested_base_filter() {
    let mut base = RequestQueryBuilder::new();
    base.filter.where_raw(json!({ "deleted": false }), false);

    let mut set = panel();
    set.set_operator(FilterOperator::Or);
    set.select_filter(0, "lastName").unwrap();
    set.row_mut(0)
        .unwrap()
        .set_value(FilterValue::text("Lee"))
        .unwrap();
    set.add_filter("dateOfReporting")
        .unwrap()
        .set_value(FilterValue::DateRange(DateRange::since("2024-01-01")))
        .unwrap();

    let mut qb = set.apply();
    qb.intersect(&base, MergeConfig::default());
    assert_eq!(
        qb.where_clause(),
        Some(json!({ "and": [
            { "or": [
                { "lastName": { "regexp": "/^Lee/i" } },
                { "dateOfReporting": { "gte": "2024-01-01" } }
            ] },
            { "deleted": false }
        ] }))
    );
}
