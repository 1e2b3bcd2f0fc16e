//! Applied Filters
//!
//! One filter row as the user edits it: the chosen filter model, comparator
//! and value. Whenever the filter or comparator changes to a combination
//! working on a different value type, the value is cleared so a stale value
//! never reaches the query.

use std::sync::Arc;

use crate::comparators::ComparatorTable;
use crate::error::{FilterError, FilterResult};
use crate::model::FilterModel;
use crate::types::{FilterComparator, ValueType};
use crate::value::FilterValue;

#[derive(Debug, Clone)]
pub struct AppliedFilterModel {
    filter: Option<FilterModel>,
    comparator: Option<FilterComparator>,
    value: Option<FilterValue>,
    table: Arc<ComparatorTable>,
}

impl AppliedFilterModel {
    /// Row with no filter selected yet
    pub fn new(table: Arc<ComparatorTable>) -> Self {
        Self {
            filter: None,
            comparator: None,
            value: None,
            table,
        }
    }

    /// Row with `filter` selected
    pub fn with_filter(table: Arc<ComparatorTable>, filter: FilterModel) -> Self {
        let mut applied = Self::new(table);
        applied.select_filter(filter);
        applied
    }

    pub fn filter(&self) -> Option<&FilterModel> {
        self.filter.as_ref()
    }

    pub fn comparator(&self) -> Option<FilterComparator> {
        self.comparator
    }

    pub fn value(&self) -> Option<&FilterValue> {
        self.value.as_ref()
    }

    /// Value type of the current filter/comparator combination
    pub fn value_type(&self) -> Option<ValueType> {
        let filter = self.filter.as_ref()?;
        self.table.value_type(filter.filter_type(), self.comparator?)
    }

    /// Comparators the user may pick for the selected filter
    pub fn allowed_comparators(&self) -> Vec<FilterComparator> {
        self.filter
            .as_ref()
            .map(|f| self.table.comparators_for(f.filter_type()))
            .unwrap_or_default()
    }

    /// Select a filter; the comparator falls back to the type's default
    pub fn select_filter(&mut self, filter: FilterModel) {
        let previous = self.value_type();
        self.comparator = self.table.default_comparator(filter.filter_type());
        self.filter = Some(filter);
        self.reset_if_changed(previous);

        if self.value.is_none() {
            let default = self.filter.as_ref().and_then(|f| f.default_value()).cloned();
            if let Some(default) = default {
                if Some(default.value_type()) == self.value_type() {
                    self.value = Some(default);
                }
            }
        }
    }

    /// Pick another comparator of the selected filter
    pub fn set_comparator(&mut self, comparator: FilterComparator) -> FilterResult<()> {
        let filter_type = self
            .filter
            .as_ref()
            .map(|f| f.filter_type())
            .ok_or(FilterError::NoFilterSelected)?;
        if !self.table.is_allowed(filter_type, comparator) {
            tracing::warn!(%comparator, %filter_type, "rejected comparator outside the comparator table");
            return Err(FilterError::ComparatorNotAllowed {
                comparator,
                filter_type,
            });
        }

        let previous = self.value_type();
        self.comparator = Some(comparator);
        self.reset_if_changed(previous);
        Ok(())
    }

    /// Store a value matching the current value type
    pub fn set_value(&mut self, value: FilterValue) -> FilterResult<()> {
        let expected = self.value_type().ok_or(FilterError::NoFilterSelected)?;
        let actual = value.value_type();
        if expected != actual {
            return Err(FilterError::ValueTypeMismatch { expected, actual });
        }
        self.value = Some(value);
        Ok(())
    }

    pub fn clear_value(&mut self) {
        self.value = None;
    }

    /// The row would add a condition when applied
    pub fn is_applicable(&self) -> bool {
        match self.value_type() {
            Some(ValueType::Nothing) => true,
            Some(_) => self.value.as_ref().is_some_and(|v| !v.is_blank()),
            None => false,
        }
    }

    fn reset_if_changed(&mut self, previous: Option<ValueType>) {
        if previous != self.value_type() {
            self.value = None;
        }
    }
}
