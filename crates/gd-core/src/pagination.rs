//! Paging state for list screens
//!
//! List screens page with a zero-based page index and a page size; the
//! backend dialect expects `skip`/`limit`.

use serde::{Deserialize, Serialize};

/// Current page of a list screen; the page size is never zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "PageFields")]
pub struct PageState {
    /// Page index (0-indexed)
    pub page_index: u64,
    /// Items per page
    pub page_size: u64,
}

impl PageState {
    pub fn new(page_index: u64, page_size: u64) -> Self {
        Self {
            page_index,
            page_size: page_size.max(1),
        }
    }

    /// First page with the given size
    pub fn first(page_size: u64) -> Self {
        Self::new(0, page_size)
    }

    /// Number of records to skip, saturating for out-of-range pages
    pub fn skip(&self) -> u64 {
        self.page_index.saturating_mul(self.page_size)
    }

    /// Number of records to fetch
    pub fn limit(&self) -> u64 {
        self.page_size
    }

    /// Total number of pages for a record count
    pub fn page_count(&self, total: u64) -> u64 {
        total.div_ceil(self.page_size)
    }

    /// Whether a next page exists for a record count
    pub fn has_next(&self, total: u64) -> bool {
        self.skip().saturating_add(self.page_size) < total
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageFields {
    page_index: u64,
    page_size: u64,
}

impl From<PageFields> for PageState {
    fn from(fields: PageFields) -> Self {
        Self::new(fields.page_index, fields.page_size)
    }
}

/// Page size settings shared by list screens
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSettings {
    pub default_page_size: u64,
    pub page_size_options: Vec<u64>,
}

impl Default for PageSettings {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            page_size_options: vec![10, 25, 50],
        }
    }
}

impl PageSettings {
    /// Snap a requested page size to the closest allowed option
    pub fn normalize(&self, page_size: u64) -> u64 {
        self.page_size_options
            .iter()
            .copied()
            .min_by_key(|option| option.abs_diff(page_size))
            .unwrap_or(self.default_page_size)
    }

    pub fn first_page(&self) -> PageState {
        PageState::first(self.default_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_and_limit() {
        let page = PageState::new(2, 25);
        assert_eq!(page.skip(), 50);
        assert_eq!(page.limit(), 25);
    }

    #[test]
    fn test_page_size_never_zero() {
        let page = PageState::new(0, 0);
        assert_eq!(page.page_size, 1);
    }

    #[test]
    fn test_huge_page_index_saturates() {
        let page = PageState::new(u64::MAX / 10, 50);
        assert_eq!(page.skip(), u64::MAX);
        assert!(!page.has_next(u64::MAX));
    }

    #[test]
    fn test_deserialized_page_size_never_zero() {
        let page: PageState = serde_json::from_str(r#"{"pageIndex": 3, "pageSize": 0}"#).unwrap();
        assert_eq!(page, PageState::new(3, 1));
        assert_eq!(page.page_count(5), 5);
    }

    #[test]
    fn test_page_count() {
        let page = PageState::first(10);
        assert_eq!(page.page_count(0), 0);
        assert_eq!(page.page_count(10), 1);
        assert_eq!(page.page_count(11), 2);
        assert!(page.has_next(11));
        assert!(!page.has_next(10));
    }

    #[test]
    fn test_normalize_page_size() {
        let settings = PageSettings::default();
        assert_eq!(settings.normalize(26), 25);
        assert_eq!(settings.normalize(1000), 50);
        assert_eq!(settings.first_page(), PageState::new(0, 50));
    }
}
