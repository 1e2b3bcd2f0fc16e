//! Included relations
//!
//! An include asks the backend to eagerly fetch a related collection. Each
//! include owns a nested builder so filters, sort and paging can be scoped
//! to the related records.

use serde_json::{Map, Value};

use crate::builder::RequestQueryBuilder;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestRelation {
    name: String,
    required: bool,
    query: RequestQueryBuilder,
}

impl RequestRelation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent records without a matching related record are dropped
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.required = required;
        self
    }

    pub fn query(&self) -> &RequestQueryBuilder {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut RequestQueryBuilder {
        &mut self.query
    }

    /// Union another include of the same relation into this one
    pub fn merge(&mut self, other: &RequestRelation, config: crate::builder::MergeConfig) {
        self.required |= other.required;
        self.query.merge(&other.query, config);
    }

    /// `{relation, scope?, required?}`
    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert("relation".to_string(), Value::String(self.name.clone()));
        if !self.query.is_empty() {
            map.insert("scope".to_string(), self.query.build_query());
        }
        if self.required {
            map.insert("required".to_string(), Value::Bool(true));
        }
        Value::Object(map)
    }
}
