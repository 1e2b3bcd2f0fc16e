//! Request Paginator
//!
//! Page bounds are independent of the filter so the same filter can be
//! reused for a count request.

use gd_core::pagination::PageState;

/// `skip`/`limit` bounds, either may be unset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestPaginator {
    limit: Option<u64>,
    skip: Option<u64>,
}

impl RequestPaginator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(&mut self, limit: u64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(&mut self, skip: u64) -> &mut Self {
        self.skip = Some(skip);
        self
    }

    /// Bounds for a zero-based page
    pub fn set_page(&mut self, page: PageState) -> &mut Self {
        self.limit = Some(page.limit());
        self.skip = Some(page.skip());
        self
    }

    pub fn limit_value(&self) -> Option<u64> {
        self.limit
    }

    pub fn skip_value(&self) -> Option<u64> {
        self.skip
    }

    pub fn is_empty(&self) -> bool {
        self.limit.is_none() && self.skip.is_none()
    }

    /// Remove both bounds
    pub fn clear(&mut self) -> &mut Self {
        self.limit = None;
        self.skip = None;
        self
    }
}
