//! Filter Models
//!
//! A filter model declares one filter a list screen offers. Screens build
//! their models once at start-up; they are read-only afterwards.

use async_trait::async_trait;
use gd_core::{GdResult, LabelValuePair};
use gd_queries::RequestQueryBuilder;
use std::fmt;
use std::sync::Arc;

use crate::types::FilterType;
use crate::value::FilterValue;

/// Source of the options of a select-like filter (reference data, locations, teams)
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    async fn options(&self) -> GdResult<Vec<LabelValuePair>>;
}

/// Options known up front
#[derive(Debug, Clone, Default)]
pub struct StaticOptions(Vec<LabelValuePair>);

impl StaticOptions {
    pub fn new(options: Vec<LabelValuePair>) -> Self {
        Self(options)
    }
}

#[async_trait]
impl OptionsProvider for StaticOptions {
    async fn options(&self) -> GdResult<Vec<LabelValuePair>> {
        Ok(self.0.clone())
    }
}

/// Declaration of one selectable filter
#[derive(Clone)]
pub struct FilterModel {
    field_name: String,
    field_label: String,
    filter_type: FilterType,
    options: Option<Arc<dyn OptionsProvider>>,
    relationship_path: Vec<String>,
    relationship_label: Option<String>,
    sortable: bool,
    required: bool,
    default_value: Option<FilterValue>,
    extra_conditions: Option<RequestQueryBuilder>,
}

impl FilterModel {
    pub fn new(field_name: impl Into<String>, field_label: impl Into<String>, filter_type: FilterType) -> Self {
        Self {
            field_name: field_name.into(),
            field_label: field_label.into(),
            filter_type,
            options: None,
            relationship_path: Vec::new(),
            relationship_label: None,
            sortable: false,
            required: false,
            default_value: None,
            extra_conditions: None,
        }
    }

    /// Options for select, multiselect and location filters
    pub fn with_options(mut self, options: Arc<dyn OptionsProvider>) -> Self {
        self.options = Some(options);
        self
    }

    /// Scope the condition inside the included relation(s) along `path`
    pub fn with_relationship<S: Into<String>>(
        mut self,
        path: impl IntoIterator<Item = S>,
        label: impl Into<String>,
    ) -> Self {
        self.relationship_path = path.into_iter().map(Into::into).collect();
        self.relationship_label = Some(label.into());
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Always present on the screen; the user cannot remove it
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: FilterValue) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Conditions merged into the target builder whenever this filter is applied
    pub fn with_extra_conditions(mut self, conditions: RequestQueryBuilder) -> Self {
        self.extra_conditions = Some(conditions);
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    pub fn field_label(&self) -> &str {
        &self.field_label
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn relationship_path(&self) -> &[String] {
        &self.relationship_path
    }

    pub fn relationship_label(&self) -> Option<&str> {
        self.relationship_label.as_deref()
    }

    pub fn is_relationship(&self) -> bool {
        !self.relationship_path.is_empty()
    }

    pub fn is_sortable(&self) -> bool {
        self.sortable
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn default_value(&self) -> Option<&FilterValue> {
        self.default_value.as_ref()
    }

    pub fn extra_conditions(&self) -> Option<&RequestQueryBuilder> {
        self.extra_conditions.as_ref()
    }

    /// Unique key on a screen: relationship path and field, dot separated
    pub fn key(&self) -> String {
        if self.relationship_path.is_empty() {
            self.field_name.clone()
        } else {
            format!("{}.{}", self.relationship_path.join("."), self.field_name)
        }
    }

    /// Fetch the options; filters without a provider have none
    pub async fn load_options(&self) -> GdResult<Vec<LabelValuePair>> {
        match &self.options {
            Some(provider) => provider.options().await,
            None => Ok(Vec::new()),
        }
    }
}

impl fmt::Debug for FilterModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterModel")
            .field("field_name", &self.field_name)
            .field("filter_type", &self.filter_type)
            .field("relationship_path", &self.relationship_path)
            .field("has_options", &self.options.is_some())
            .field("sortable", &self.sortable)
            .field("required", &self.required)
            .field("default_value", &self.default_value)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_includes_relationship() {
        let plain = FilterModel::new("firstName", "First name", FilterType::Text);
        assert_eq!(plain.key(), "firstName");
        assert!(!plain.is_relationship());

        let scoped = FilterModel::new("firstName", "First name", FilterType::Text)
            .with_relationship(["contact"], "Contact");
        assert_eq!(scoped.key(), "contact.firstName");
        assert_eq!(scoped.relationship_label(), Some("Contact"));
    }

    #[test]
    fn test_builder_flags() {
        let model = FilterModel::new("classification", "Classification", FilterType::Multiselect)
            .sortable()
            .required()
            .with_default(FilterValue::list(["CONFIRMED"]));
        assert!(model.is_sortable());
        assert!(model.is_required());
        assert_eq!(model.default_value(), Some(&FilterValue::list(["CONFIRMED"])));
    }

    #[tokio::test]
    async fn test_load_options() {
        let options = StaticOptions::new(vec![
            LabelValuePair::new("Confirmed", "CONFIRMED"),
            LabelValuePair::new("Probable", "PROBABLE"),
        ]);
        let model = FilterModel::new("classification", "Classification", FilterType::Select)
            .with_options(Arc::new(options));

        let loaded = model.load_options().await.unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[1].label, "Probable");

        let without = FilterModel::new("firstName", "First name", FilterType::Text);
        assert!(without.load_options().await.unwrap().is_empty());
    }
}
