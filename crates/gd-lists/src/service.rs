//! Data service seam
//!
//! The HTTP transport stays outside this crate. A screen hands its builder to
//! a `ListDataService`; transport failures come back as `GdError::Transport`
//! unchanged and are never retried here.

use async_trait::async_trait;
use gd_core::{CountResponse, GdResult, OutbreakId};
use gd_queries::RequestQueryBuilder;

#[async_trait]
pub trait ListDataService: Send + Sync + 'static {
    /// Record type of the list
    type Item: Clone + Send + Sync + 'static;

    /// One page of records matching `query`
    async fn list(&self, outbreak_id: &OutbreakId, query: &RequestQueryBuilder) -> GdResult<Vec<Self::Item>>;

    /// Number of records matching `query`; callers pass a count query
    async fn count(&self, outbreak_id: &OutbreakId, query: &RequestQueryBuilder) -> GdResult<CountResponse>;
}
