//! Request Query Builder
//!
//! Accumulates filter, sort, paging and include state for one request and
//! serializes it into the backend's `filter` object:
//!
//! ```text
//! { where?, order?, limit?, skip?, include?: [{relation, scope?, required?}], fields?, deleted? }
//! ```

use indexmap::IndexMap;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::filter::RequestFilter;
use crate::paginator::RequestPaginator;
use crate::relation::RequestRelation;
use crate::sort::{RequestSort, SortDirection};

/// Which parts of another builder `merge` brings in. Filters always merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeConfig {
    pub sort: bool,
    pub includes: bool,
    /// Take the other builder's page bounds where it has them
    pub paginator: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            sort: true,
            includes: true,
            paginator: false,
        }
    }
}

impl MergeConfig {
    /// Filters only
    pub fn filter_only() -> Self {
        Self {
            sort: false,
            includes: false,
            paginator: false,
        }
    }

    /// Everything, page bounds included
    pub fn all() -> Self {
        Self {
            sort: true,
            includes: true,
            paginator: true,
        }
    }
}

/// Builder for one backend request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestQueryBuilder {
    pub filter: RequestFilter,
    pub sort: RequestSort,
    pub paginator: RequestPaginator,
    includes: IndexMap<String, RequestRelation>,
    fields: Vec<String>,
    include_deleted: bool,
}

impl RequestQueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nested builder for `relation`, created on first use.
    ///
    /// Passing `required = true` turns the include into an inner join; a
    /// relation once required stays required.
    pub fn include(&mut self, relation: &str, required: bool) -> &mut RequestQueryBuilder {
        let entry = self
            .includes
            .entry(relation.to_string())
            .or_insert_with(|| RequestRelation::new(relation));
        if required {
            entry.set_required(true);
        }
        entry.query_mut()
    }

    /// Walk a relationship path, creating includes as needed
    pub fn include_path<S: AsRef<str>>(&mut self, path: &[S]) -> &mut RequestQueryBuilder {
        let mut builder = self;
        for segment in path {
            builder = builder.include(segment.as_ref(), false);
        }
        builder
    }

    pub fn relation(&self, relation: &str) -> Option<&RequestRelation> {
        self.includes.get(relation)
    }

    pub fn relations(&self) -> impl Iterator<Item = &RequestRelation> {
        self.includes.values()
    }

    pub fn remove_include(&mut self, relation: &str) -> &mut Self {
        self.includes.shift_remove(relation);
        self
    }

    /// Shorthand for `sort.by`
    pub fn sort_by(&mut self, field: impl Into<String>, direction: SortDirection) -> &mut Self {
        self.sort.by(field, direction);
        self
    }

    /// Shorthand for `paginator.limit`
    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.paginator.limit(limit);
        self
    }

    /// Restrict the returned properties
    pub fn fields<S: Into<String>>(&mut self, fields: impl IntoIterator<Item = S>) -> &mut Self {
        for field in fields {
            let field = field.into();
            if !self.fields.contains(&field) {
                self.fields.push(field);
            }
        }
        self
    }

    pub fn selected_fields(&self) -> &[String] {
        &self.fields
    }

    /// Return soft-deleted records as well
    pub fn include_deleted(&mut self) -> &mut Self {
        self.include_deleted = true;
        self
    }

    pub fn is_deleted_included(&self) -> bool {
        self.include_deleted
    }

    /// Nothing would be emitted for this builder
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
            && self.sort.is_empty()
            && self.paginator.is_empty()
            && self.includes.is_empty()
            && self.fields.is_empty()
            && !self.include_deleted
    }

    /// Reset every part
    pub fn clear(&mut self) -> &mut Self {
        self.filter.clear();
        self.sort.clear();
        self.paginator.clear();
        self.includes.clear();
        self.fields.clear();
        self.include_deleted = false;
        self
    }

    /// Deep-union another builder into this one; filters combine as in [`RequestFilter::merge`]
    pub fn merge(&mut self, other: &RequestQueryBuilder, config: MergeConfig) -> &mut Self {
        self.filter.merge(&other.filter);
        self.merge_parts(other, config)
    }

    /// Like `merge`, but the filters combine as in [`RequestFilter::intersect`]
    /// so each builder's operator survives
    pub fn intersect(&mut self, other: &RequestQueryBuilder, config: MergeConfig) -> &mut Self {
        self.filter.intersect(&other.filter);
        self.merge_parts(other, config)
    }

    fn merge_parts(&mut self, other: &RequestQueryBuilder, config: MergeConfig) -> &mut Self {
        if config.sort {
            self.sort.merge(&other.sort);
        }

        if config.includes {
            for (name, relation) in &other.includes {
                match self.includes.get_mut(name) {
                    Some(existing) => existing.merge(relation, config),
                    None => {
                        self.includes.insert(name.clone(), relation.clone());
                    }
                }
            }
        }

        if config.paginator {
            if let Some(limit) = other.paginator.limit_value() {
                self.paginator.limit(limit);
            }
            if let Some(skip) = other.paginator.skip_value() {
                self.paginator.skip(skip);
            }
        }

        self.fields(other.fields.iter().cloned());
        self.include_deleted |= other.include_deleted;
        self
    }

    /// Independent copy for a count request: no paging, no ordering
    pub fn count_query(&self) -> RequestQueryBuilder {
        let mut count = self.clone();
        count.paginator.clear();
        count.sort.clear();
        count
    }

    /// The `where` object alone, for endpoints taking `where=`
    pub fn where_clause(&self) -> Option<Value> {
        self.filter.to_where()
    }

    /// Serialize the whole tree into the backend filter object
    pub fn build_query(&self) -> Value {
        let mut map = Map::new();

        if let Some(where_clause) = self.filter.to_where() {
            map.insert("where".to_string(), where_clause);
        }
        if let Some(order) = self.sort.to_order() {
            map.insert("order".to_string(), order);
        }
        if let Some(limit) = self.paginator.limit_value() {
            map.insert("limit".to_string(), Value::from(limit));
        }
        if let Some(skip) = self.paginator.skip_value() {
            map.insert("skip".to_string(), Value::from(skip));
        }
        if !self.includes.is_empty() {
            map.insert(
                "include".to_string(),
                Value::Array(self.includes.values().map(RequestRelation::to_value).collect()),
            );
        }
        if !self.fields.is_empty() {
            map.insert(
                "fields".to_string(),
                Value::Array(self.fields.iter().cloned().map(Value::String).collect()),
            );
        }
        if self.include_deleted {
            map.insert("deleted".to_string(), Value::Bool(true));
        }

        Value::Object(map)
    }

    /// `filter=<url-encoded json>` for GET requests
    pub fn to_query_param(&self) -> String {
        let query = self.build_query().to_string();
        tracing::debug!(filter = %query, "serialized request filter");
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("filter", &query)
            .finish()
    }
}

impl Serialize for RequestQueryBuilder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.build_query().serialize(serializer)
    }
}
