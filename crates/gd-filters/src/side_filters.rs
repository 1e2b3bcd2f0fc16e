//! Side Filters
//!
//! The filter panel of a list screen: the filter models the screen offers,
//! the rows the user is editing, the operator combining them and the sort
//! keys picked in the panel. `apply` produces a fresh request builder; the
//! panel state can be saved and restored as plain data.

use gd_queries::{FilterOperator, RequestQueryBuilder, RequestSort, SortCriterion, SortDirection};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::applied::AppliedFilterModel;
use crate::apply::{apply_filters, ApplyOptions};
use crate::comparators::ComparatorTable;
use crate::error::{FilterError, FilterResult};
use crate::model::FilterModel;
use crate::types::FilterComparator;
use crate::value::FilterValue;

/// One saved row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAppliedFilter {
    /// Filter key (relationship path and field name)
    pub filter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparator: Option<FilterComparator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<FilterValue>,
}

/// Serializable snapshot of a filter panel
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFilterData {
    #[serde(default)]
    pub applied_filters: Vec<SavedAppliedFilter>,
    #[serde(default)]
    pub operator: FilterOperator,
    #[serde(default)]
    pub sort_by: Vec<SortCriterion>,
}

#[derive(Debug, Clone)]
pub struct AppliedFilterSet {
    available: Vec<FilterModel>,
    rows: Vec<AppliedFilterModel>,
    operator: FilterOperator,
    sort: RequestSort,
    table: Arc<ComparatorTable>,
    options: ApplyOptions,
}

impl AppliedFilterSet {
    /// Panel holding a row per required filter, or a single empty row
    pub fn new(available: Vec<FilterModel>, table: Arc<ComparatorTable>) -> Self {
        let mut set = Self {
            available,
            rows: Vec::new(),
            operator: FilterOperator::default(),
            sort: RequestSort::new(),
            table,
            options: ApplyOptions::default(),
        };
        set.rows = set.initial_rows();
        set
    }

    pub fn with_options(mut self, options: ApplyOptions) -> Self {
        self.options = options;
        self
    }

    pub fn available(&self) -> &[FilterModel] {
        &self.available
    }

    /// Filter model by key
    pub fn find(&self, key: &str) -> Option<&FilterModel> {
        self.available.iter().find(|f| f.key() == key)
    }

    /// Filters offered for sorting
    pub fn sortable(&self) -> impl Iterator<Item = &FilterModel> {
        self.available.iter().filter(|f| f.is_sortable())
    }

    pub fn rows(&self) -> &[AppliedFilterModel] {
        &self.rows
    }

    pub fn row_mut(&mut self, index: usize) -> FilterResult<&mut AppliedFilterModel> {
        self.rows.get_mut(index).ok_or(FilterError::RowOutOfRange(index))
    }

    /// Number of rows that would add a condition
    pub fn applied_count(&self) -> usize {
        self.rows.iter().filter(|row| row.is_applicable()).count()
    }

    /// Append an empty row
    pub fn add_row(&mut self) -> &mut AppliedFilterModel {
        self.rows.push(AppliedFilterModel::new(self.table.clone()));
        let last = self.rows.len() - 1;
        &mut self.rows[last]
    }

    /// Append a row with the filter `key` selected
    pub fn add_filter(&mut self, key: &str) -> FilterResult<&mut AppliedFilterModel> {
        let filter = self.model(key)?;
        self.rows.push(AppliedFilterModel::with_filter(self.table.clone(), filter));
        let last = self.rows.len() - 1;
        Ok(&mut self.rows[last])
    }

    /// Select filter `key` on the row at `index`
    pub fn select_filter(&mut self, index: usize, key: &str) -> FilterResult<()> {
        let filter = self.model(key)?;
        let row = self.row_mut(index)?;
        if let Some(current) = row.filter() {
            if current.is_required() && current.key() != key {
                return Err(FilterError::RequiredFilter(current.key()));
            }
        }
        row.select_filter(filter);
        Ok(())
    }

    /// Remove the row at `index`; rows of required filters stay
    pub fn remove_row(&mut self, index: usize) -> FilterResult<AppliedFilterModel> {
        let row = self.rows.get(index).ok_or(FilterError::RowOutOfRange(index))?;
        if let Some(filter) = row.filter().filter(|f| f.is_required()) {
            return Err(FilterError::RequiredFilter(filter.key()));
        }
        Ok(self.rows.remove(index))
    }

    /// Back to the initial rows, AND and no sort
    pub fn reset(&mut self) {
        tracing::debug!("resetting side filters");
        self.rows = self.initial_rows();
        self.operator = FilterOperator::default();
        self.sort.clear();
    }

    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    pub fn set_operator(&mut self, operator: FilterOperator) -> &mut Self {
        self.operator = operator;
        self
    }

    pub fn sort(&self) -> &RequestSort {
        &self.sort
    }

    /// Sort by a sortable filter
    pub fn sort_by(&mut self, key: &str, direction: SortDirection) -> FilterResult<&mut Self> {
        let filter = self.find(key).ok_or_else(|| FilterError::UnknownFilter(key.to_string()))?;
        if !filter.is_sortable() {
            return Err(FilterError::NotSortable(key.to_string()));
        }
        self.sort.by(key, direction);
        Ok(self)
    }

    pub fn clear_sort(&mut self) -> &mut Self {
        self.sort.clear();
        self
    }

    /// Fresh request builder carrying every applicable row and the sort keys
    pub fn apply(&self) -> RequestQueryBuilder {
        let mut qb = RequestQueryBuilder::new();
        qb.filter.set_operator(self.operator);
        let applied = apply_filters(&mut qb, &self.rows, self.options);
        qb.sort.merge(&self.sort);
        tracing::debug!(
            rows = self.rows.len(),
            applied,
            operator = self.operator.as_str(),
            "applied side filters"
        );
        qb
    }

    /// Snapshot of rows with a filter selected
    pub fn to_saved(&self) -> SavedFilterData {
        SavedFilterData {
            applied_filters: self
                .rows
                .iter()
                .filter_map(|row| {
                    row.filter().map(|filter| SavedAppliedFilter {
                        filter: filter.key(),
                        comparator: row.comparator(),
                        value: row.value().cloned(),
                    })
                })
                .collect(),
            operator: self.operator,
            sort_by: self.sort.criteria().to_vec(),
        }
    }

    /// Replace the panel state with a snapshot.
    ///
    /// Required filters missing from the snapshot get their row back. On
    /// error the panel is left untouched.
    pub fn restore(&mut self, saved: &SavedFilterData) -> FilterResult<()> {
        let mut rows = Vec::with_capacity(saved.applied_filters.len());
        for entry in &saved.applied_filters {
            let mut row = AppliedFilterModel::with_filter(self.table.clone(), self.model(&entry.filter)?);
            if let Some(comparator) = entry.comparator {
                row.set_comparator(comparator)?;
            }
            match &entry.value {
                Some(value) => row.set_value(value.clone())?,
                None => row.clear_value(),
            }
            rows.push(row);
        }

        let missing: Vec<AppliedFilterModel> = self
            .available
            .iter()
            .filter(|f| f.is_required())
            .filter(|f| !saved.applied_filters.iter().any(|entry| entry.filter == f.key()))
            .map(|f| AppliedFilterModel::with_filter(self.table.clone(), f.clone()))
            .collect();
        rows.splice(0..0, missing);
        if rows.is_empty() {
            rows.push(AppliedFilterModel::new(self.table.clone()));
        }

        let mut sort = RequestSort::new();
        for criterion in &saved.sort_by {
            match self.find(&criterion.field) {
                Some(filter) if filter.is_sortable() => {
                    sort.by(criterion.field.clone(), criterion.direction);
                }
                _ => return Err(FilterError::NotSortable(criterion.field.clone())),
            }
        }

        self.rows = rows;
        self.operator = saved.operator;
        self.sort = sort;
        Ok(())
    }

    fn model(&self, key: &str) -> FilterResult<FilterModel> {
        self.find(key)
            .cloned()
            .ok_or_else(|| FilterError::UnknownFilter(key.to_string()))
    }

    fn initial_rows(&self) -> Vec<AppliedFilterModel> {
        let rows: Vec<AppliedFilterModel> = self
            .available
            .iter()
            .filter(|f| f.is_required())
            .map(|f| AppliedFilterModel::with_filter(self.table.clone(), f.clone()))
            .collect();
        if rows.is_empty() {
            vec![AppliedFilterModel::new(self.table.clone())]
        } else {
            rows
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FilterType;
    use gd_queries::DateRange;
    use serde_json::json;

    fn models() -> Vec<FilterModel> {
        vec![
            FilterModel::new("lastName", "Last name", FilterType::Text).sortable(),
            FilterModel::new("classification", "Classification", FilterType::Multiselect),
            FilterModel::new("dateOfReporting", "Date of reporting", FilterType::RangeDate).sortable(),
            FilterModel::new("firstName", "First name", FilterType::Text)
                .with_relationship(["contact"], "Contact")
                .sortable(),
        ]
    }

    fn panel() -> AppliedFilterSet {
        AppliedFilterSet::new(models(), Arc::new(ComparatorTable::standard()))
    }

    #[test]
    fn test_new_panel_has_one_empty_row() {
        let set = panel();
        assert_eq!(set.rows().len(), 1);
        assert!(set.rows()[0].filter().is_none());
        assert_eq!(set.applied_count(), 0);
        assert_eq!(set.apply().build_query(), json!({}));
    }

    #[test]
    fn test_required_filters_get_rows() {
        let mut available = models();
        available.push(FilterModel::new("outbreakId", "Outbreak", FilterType::Text).required());
        let mut set = AppliedFilterSet::new(available, Arc::new(ComparatorTable::standard()));
        assert_eq!(set.rows().len(), 1);
        assert_eq!(set.rows()[0].filter().unwrap().key(), "outbreakId");

        assert_eq!(set.remove_row(0).unwrap_err(), FilterError::RequiredFilter("outbreakId".into()));
        assert_eq!(
            set.select_filter(0, "lastName").unwrap_err(),
            FilterError::RequiredFilter("outbreakId".into())
        );
    }

    #[test]
    fn test_add_select_remove() {
        let mut set = panel();
        set.select_filter(0, "lastName").unwrap();
        set.add_filter("classification").unwrap();
        assert_eq!(set.rows().len(), 2);

        let removed = set.remove_row(0).unwrap();
        assert_eq!(removed.filter().unwrap().key(), "lastName");
        assert_eq!(set.remove_row(5).unwrap_err(), FilterError::RowOutOfRange(5));
        assert!(matches!(set.add_filter("nope"), Err(FilterError::UnknownFilter(_))));
    }

    #[test]
    fn test_apply_with_or_operator_and_sort() {
        let mut set = panel();
        set.select_filter(0, "lastName").unwrap();
        set.row_mut(0).unwrap().set_value(FilterValue::text("smi")).unwrap();
        set.add_filter("classification")
            .unwrap()
            .set_value(FilterValue::list(["CONFIRMED"]))
            .unwrap();
        set.set_operator(FilterOperator::Or);
        set.sort_by("dateOfReporting", SortDirection::Desc).unwrap();

        assert_eq!(
            set.apply().build_query(),
            json!({
                "where": { "or": [
                    { "lastName": { "regexp": "/^smi/i" } },
                    { "classification": { "inq": ["CONFIRMED"] } }
                ] },
                "order": [["dateOfReporting", "DESC"]]
            })
        );
    }

    #[test]
    fn test_sort_requires_sortable_filter() {
        let mut set = panel();
        assert_eq!(
            set.sort_by("classification", SortDirection::Asc).unwrap_err(),
            FilterError::NotSortable("classification".into())
        );
        assert!(matches!(
            set.sort_by("unknown", SortDirection::Asc),
            Err(FilterError::UnknownFilter(_))
        ));
        set.sort_by("contact.firstName", SortDirection::Asc).unwrap();
        assert!(set.sort().sorts_by("contact.firstName"));
        set.clear_sort();
        assert!(set.sort().is_empty());
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut set = panel();
        set.select_filter(0, "lastName").unwrap();
        set.add_filter("classification").unwrap();
        set.set_operator(FilterOperator::Or);
        set.sort_by("lastName", SortDirection::Asc).unwrap();

        set.reset();
        assert_eq!(set.rows().len(), 1);
        assert!(set.rows()[0].filter().is_none());
        assert_eq!(set.operator(), FilterOperator::And);
        assert!(set.sort().is_empty());
    }

    #[test]
    fn test_save_and_restore() {
        let mut set = panel();
        set.select_filter(0, "dateOfReporting").unwrap();
        let row = set.row_mut(0).unwrap();
        row.set_comparator(FilterComparator::Before).unwrap();
        row.set_value(FilterValue::DateRange(DateRange::until("2024-01-01"))).unwrap();
        set.add_row();
        set.sort_by("lastName", SortDirection::Desc).unwrap();

        let saved = set.to_saved();
        assert_eq!(saved.applied_filters.len(), 1);

        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(
            json,
            json!({
                "appliedFilters": [{
                    "filter": "dateOfReporting",
                    "comparator": "before",
                    "value": { "type": "date-range", "value": { "endDate": "2024-01-01" } }
                }],
                "operator": "and",
                "sortBy": [{ "field": "lastName", "direction": "desc" }]
            })
        );

        let mut restored = panel();
        restored.restore(&serde_json::from_value(json).unwrap()).unwrap();
        assert_eq!(restored.apply().build_query(), set.apply().build_query());
    }

    #[test]
    fn test_restore_unknown_filter_leaves_panel() {
        let mut set = panel();
        set.select_filter(0, "lastName").unwrap();
        let saved = SavedFilterData {
            applied_filters: vec![SavedAppliedFilter {
                filter: "missing".into(),
                comparator: None,
                value: None,
            }],
            ..SavedFilterData::default()
        };
        assert_eq!(set.restore(&saved), Err(FilterError::UnknownFilter("missing".into())));
        assert_eq!(set.rows()[0].filter().unwrap().key(), "lastName");
    }

    #[test]
    fn test_restore_rejects_bad_comparator() {
        let mut set = panel();
        let saved = SavedFilterData {
            applied_filters: vec![SavedAppliedFilter {
                filter: "lastName".into(),
                comparator: Some(FilterComparator::Within),
                value: None,
            }],
            ..SavedFilterData::default()
        };
        assert!(matches!(
            set.restore(&saved),
            Err(FilterError::ComparatorNotAllowed { .. })
        ));
    }
}
