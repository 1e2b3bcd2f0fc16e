//! Outbreak-scoped REST endpoints of a list resource

use gd_core::{GdError, GdResult, OutbreakId};
use gd_queries::RequestQueryBuilder;
use url::Url;

/// `<base>/outbreaks/<id>/<resource>` plus its count companion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEndpoint {
    base: Url,
    resource: String,
}

impl ListEndpoint {
    pub fn new(base_url: &str, resource: impl Into<String>) -> GdResult<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| GdError::Config(format!("invalid API url '{}': {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(GdError::Config(format!("API url '{}' cannot be a base", base_url)));
        }
        Ok(Self {
            base,
            resource: resource.into(),
        })
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// `GET` url of one page: `.../<resource>?filter=...`
    pub fn list_url(&self, outbreak_id: &OutbreakId, query: &RequestQueryBuilder) -> GdResult<Url> {
        let mut url = self.resource_url(outbreak_id, None)?;
        url.set_query(Some(&query.to_query_param()));
        Ok(url)
    }

    /// `GET` url of the filtered count; paging and order are stripped
    pub fn count_url(&self, outbreak_id: &OutbreakId, query: &RequestQueryBuilder) -> GdResult<Url> {
        let mut url = self.resource_url(outbreak_id, Some("filtered-count"))?;
        url.set_query(Some(&query.count_query().to_query_param()));
        Ok(url)
    }

    /// `GET` url of the plain count, which takes only a `where` object
    pub fn where_count_url(&self, outbreak_id: &OutbreakId, query: &RequestQueryBuilder) -> GdResult<Url> {
        let mut url = self.resource_url(outbreak_id, Some("count"))?;
        if let Some(where_clause) = query.where_clause() {
            url.query_pairs_mut()
                .append_pair("where", &where_clause.to_string());
        }
        Ok(url)
    }

    fn resource_url(&self, outbreak_id: &OutbreakId, suffix: Option<&str>) -> GdResult<Url> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| GdError::Config(format!("API url '{}' cannot be a base", self.base)))?;
            segments
                .pop_if_empty()
                .extend(["outbreaks", outbreak_id.as_str(), self.resource.as_str()]);
            if let Some(suffix) = suffix {
                segments.push(suffix);
            }
        }
        Ok(url)
    }
}
