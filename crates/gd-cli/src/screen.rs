//! Screen definition files.
//!
//! A screen file declares the filters a list screen offers, the screen-fixed
//! includes and conditions, and optionally the saved panel state to apply:
//!
//! ```yaml
//! resource: cases
//! firstLevel: false
//! includes: [locations]
//! baseWhere: { deleted: false }
//! filters:
//!   - fieldName: dateOfReporting
//!     fieldLabel: Date of reporting
//!     type: range-date
//!     sortable: true
//! saved:
//!   appliedFilters:
//!     - filter: dateOfReporting
//!       comparator: before
//!       value: { type: date-range, value: { endDate: "2024-01-01" } }
//! ```

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use gd_core::{LabelValuePair, PageSettings, PageState};
use gd_filters::{
    AppliedFilterSet, ApplyOptions, ComparatorTable, FilterModel, FilterType, FilterValue, SavedFilterData,
    StaticOptions,
};
use gd_queries::{MergeConfig, RequestQueryBuilder};
use serde::Deserialize;
use serde_json::Value;

/// One declared filter
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefinition {
    pub field_name: String,
    pub field_label: String,
    #[serde(rename = "type")]
    pub filter_type: FilterType,
    #[serde(default)]
    pub options: Vec<LabelValuePair>,
    #[serde(default)]
    pub relationship_path: Vec<String>,
    pub relationship_label: Option<String>,
    #[serde(default)]
    pub sortable: bool,
    #[serde(default)]
    pub required: bool,
    pub default_value: Option<FilterValue>,
}

impl FilterDefinition {
    pub fn to_model(&self) -> FilterModel {
        let mut model = FilterModel::new(&self.field_name, &self.field_label, self.filter_type);
        if !self.options.is_empty() {
            model = model.with_options(Arc::new(StaticOptions::new(self.options.clone())));
        }
        if !self.relationship_path.is_empty() {
            let label = self
                .relationship_label
                .clone()
                .unwrap_or_else(|| self.relationship_path.join("."));
            model = model.with_relationship(self.relationship_path.iter().cloned(), label);
        }
        if self.sortable {
            model = model.sortable();
        }
        if self.required {
            model = model.required();
        }
        if let Some(value) = &self.default_value {
            model = model.with_default(value.clone());
        }
        model
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDefinition {
    /// REST resource listed by the screen, e.g. `cases`
    #[serde(default)]
    pub resource: Option<String>,
    /// Endpoint expects top-level conditions as first-level `where` keys
    #[serde(default)]
    pub first_level: bool,
    /// Relations the screen always includes
    #[serde(default)]
    pub includes: Vec<String>,
    /// Screen-fixed raw `where` conditions
    #[serde(default)]
    pub base_where: Option<Value>,
    pub filters: Vec<FilterDefinition>,
    #[serde(default)]
    pub saved: SavedFilterData,
    #[serde(default)]
    pub page: Option<PageState>,
}

impl ScreenDefinition {
    pub fn from_yaml_str(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid screen definition")
    }

    pub fn from_json_str(source: &str) -> anyhow::Result<Self> {
        serde_json::from_str(source).context("invalid screen definition")
    }

    /// Read a screen file; `.json` files are parsed as JSON, anything else as YAML
    pub async fn load(path: &Path) -> anyhow::Result<Self> {
        let source = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read screen file '{}'", path.display()))?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&source),
            _ => Self::from_yaml_str(&source),
        }
    }

    pub fn models(&self) -> Vec<FilterModel> {
        self.filters.iter().map(FilterDefinition::to_model).collect()
    }

    /// Builder carrying the screen-fixed includes and conditions
    pub fn base_query(&self) -> RequestQueryBuilder {
        let mut qb = RequestQueryBuilder::new();
        if self.first_level {
            qb.filter.first_level_conditions();
        }
        for relation in &self.includes {
            qb.include(relation, false);
        }
        if let Some(base_where) = &self.base_where {
            qb.filter.where_raw(base_where.clone(), false);
        }
        qb
    }

    /// Restore the saved panel, apply it and constrain it by the screen-fixed parts.
    ///
    /// The screen-fixed conditions always hold, whatever operator the panel
    /// combines its rows with.
    pub fn build_query(
        &self,
        table: Arc<ComparatorTable>,
        case_insensitive: bool,
        pages: &PageSettings,
    ) -> anyhow::Result<RequestQueryBuilder> {
        let options = ApplyOptions {
            case_insensitive,
            first_level: self.first_level,
        };
        let mut panel = AppliedFilterSet::new(self.models(), table).with_options(options);
        panel
            .restore(&self.saved)
            .context("saved filters do not match the screen filters")?;

        let mut qb = panel.apply();
        qb.intersect(&self.base_query(), MergeConfig::default());
        if let Some(page) = self.page {
            qb.paginator
                .set_page(PageState::new(page.page_index, pages.normalize(page.page_size)));
        }
        tracing::debug!(filters = self.filters.len(), rows = panel.rows().len(), "built screen query");
        Ok(qb)
    }
}
