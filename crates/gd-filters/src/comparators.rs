//! Comparator tables
//!
//! Which comparators each filter type offers, which one is preselected, and
//! the value type every (filter type, comparator) pair works on. The tables
//! are plain data so a deployment can load its own from YAML or JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::{FilterError, FilterResult};
use crate::types::{FilterComparator, FilterType, ValueType};

/// One allowed comparator of a filter type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparatorRule {
    pub filter_type: FilterType,
    pub comparator: FilterComparator,
    pub value_type: ValueType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparatorTable {
    defaults: BTreeMap<FilterType, FilterComparator>,
    rules: Vec<ComparatorRule>,
}

impl Default for ComparatorTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl ComparatorTable {
    /// Empty table, to be filled with `rule` and `set_default`
    pub fn empty() -> Self {
        Self {
            defaults: BTreeMap::new(),
            rules: Vec::new(),
        }
    }

    /// The comparators list screens offer out of the box
    pub fn standard() -> Self {
        use FilterComparator as C;
        use FilterType as T;
        use ValueType as V;

        let mut table = Self::empty();
        let presence = |table: &mut Self, filter_type| {
            table
                .rule(filter_type, C::HasValue, V::Nothing)
                .rule(filter_type, C::DoesNotHaveValue, V::Nothing);
        };

        table
            .rule(T::Text, C::TextStartsWith, V::Text)
            .rule(T::Text, C::Is, V::Text)
            .rule(T::Text, C::ContainsText, V::Text);
        presence(&mut table, T::Text);

        table
            .rule(T::Number, C::Is, V::Number)
            .rule(T::Number, C::AtLeast, V::Number)
            .rule(T::Number, C::AtMost, V::Number);
        presence(&mut table, T::Number);

        for select in [T::Select, T::Multiselect] {
            table.rule(select, C::None, V::List);
            presence(&mut table, select);
        }

        for range in [T::RangeNumber, T::RangeAge] {
            table
                .rule(range, C::Between, V::NumberRange)
                .rule(range, C::AtLeast, V::NumberRange)
                .rule(range, C::AtMost, V::NumberRange);
            presence(&mut table, range);
        }

        table
            .rule(T::RangeDate, C::Between, V::DateRange)
            .rule(T::RangeDate, C::Before, V::DateRange)
            .rule(T::RangeDate, C::After, V::DateRange);
        presence(&mut table, T::RangeDate);

        table
            .rule(T::Date, C::DayIs, V::Date)
            .rule(T::Date, C::Before, V::Date)
            .rule(T::Date, C::After, V::Date);
        presence(&mut table, T::Date);

        table
            .rule(T::Address, C::Contains, V::Text)
            .rule(T::Address, C::Within, V::Geo);
        presence(&mut table, T::Address);

        table.rule(T::Location, C::Location, V::List);
        presence(&mut table, T::Location);

        table.rule(T::Boolean, C::Is, V::Boolean);

        for (filter_type, comparator) in [
            (T::Text, C::TextStartsWith),
            (T::Number, C::Is),
            (T::Select, C::None),
            (T::Multiselect, C::None),
            (T::RangeNumber, C::Between),
            (T::RangeAge, C::Between),
            (T::RangeDate, C::Between),
            (T::Date, C::DayIs),
            (T::Address, C::Contains),
            (T::Location, C::Location),
            (T::Boolean, C::Is),
        ] {
            table.defaults.insert(filter_type, comparator);
        }

        table
    }

    /// Add or replace the rule for a (filter type, comparator) pair
    pub fn rule(&mut self, filter_type: FilterType, comparator: FilterComparator, value_type: ValueType) -> &mut Self {
        match self
            .rules
            .iter_mut()
            .find(|r| r.filter_type == filter_type && r.comparator == comparator)
        {
            Some(existing) => existing.value_type = value_type,
            None => self.rules.push(ComparatorRule {
                filter_type,
                comparator,
                value_type,
            }),
        }
        self
    }

    /// Override the preselected comparator of a filter type
    pub fn set_default(&mut self, filter_type: FilterType, comparator: FilterComparator) -> FilterResult<&mut Self> {
        if !self.is_allowed(filter_type, comparator) {
            return Err(FilterError::ComparatorNotAllowed {
                comparator,
                filter_type,
            });
        }
        self.defaults.insert(filter_type, comparator);
        Ok(self)
    }

    pub fn default_comparator(&self, filter_type: FilterType) -> Option<FilterComparator> {
        self.defaults.get(&filter_type).copied()
    }

    /// Comparators offered for a filter type, in table order
    pub fn comparators_for(&self, filter_type: FilterType) -> Vec<FilterComparator> {
        self.rules
            .iter()
            .filter(|r| r.filter_type == filter_type)
            .map(|r| r.comparator)
            .collect()
    }

    pub fn value_type(&self, filter_type: FilterType, comparator: FilterComparator) -> Option<ValueType> {
        self.rules
            .iter()
            .find(|r| r.filter_type == filter_type && r.comparator == comparator)
            .map(|r| r.value_type)
    }

    pub fn is_allowed(&self, filter_type: FilterType, comparator: FilterComparator) -> bool {
        self.value_type(filter_type, comparator).is_some()
    }

    pub fn rules(&self) -> &[ComparatorRule] {
        &self.rules
    }

    /// Every default must be one of the type's allowed comparators
    pub fn validate(&self) -> FilterResult<()> {
        for (filter_type, comparator) in &self.defaults {
            if !self.is_allowed(*filter_type, *comparator) {
                return Err(FilterError::InvalidTable(format!(
                    "default comparator '{}' of {} filters has no rule",
                    comparator, filter_type
                )));
            }
        }
        Ok(())
    }

    pub fn from_yaml_str(source: &str) -> FilterResult<Self> {
        let table: Self =
            serde_yaml::from_str(source).map_err(|e| FilterError::InvalidTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    pub fn from_json_str(source: &str) -> FilterResult<Self> {
        let table: Self =
            serde_json::from_str(source).map_err(|e| FilterError::InvalidTable(e.to_string()))?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table file; `.json` files are parsed as JSON, anything else as YAML
    pub fn load(path: impl AsRef<Path>) -> FilterResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| FilterError::InvalidTable(format!("{}: {}", path.display(), e)))?;
        tracing::debug!(path = %path.display(), "loading comparator table");
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }
}
