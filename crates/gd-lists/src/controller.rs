//! List Controller
//!
//! Owns the request builder of one list screen. Every change marks the list
//! dirty; a worker task waits until no further change arrives for the
//! debounce window, then fetches the page and (when asked) the record count
//! once for the whole burst. Responses are published on a watch channel.
//!
//! Responses are not sequenced: a slow fetch may publish after a newer one.

use std::sync::Arc;
use std::time::Duration;

use gd_core::config::ListConfig;
use gd_core::{GdResult, OutbreakId, PageSettings, PageState};
use gd_queries::{MergeConfig, RequestQueryBuilder, SortDirection};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::time::{sleep, Instant};

use crate::service::ListDataService;

/// Latest published state of a list
#[derive(Debug, Clone)]
pub struct ListSnapshot<T> {
    pub items: Vec<T>,
    /// Total matching records, once counted
    pub count: Option<u64>,
    pub page: PageState,
    /// Message of the last failed page fetch; cleared by the next page success
    pub list_error: Option<String>,
    /// Message of the last failed count; cleared by the next count success
    pub count_error: Option<String>,
}

impl<T> ListSnapshot<T> {
    fn empty(page: PageState) -> Self {
        Self {
            items: Vec::new(),
            count: None,
            page,
            list_error: None,
            count_error: None,
        }
    }
}

/// Pending work of one coalesced burst
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct RefreshRequest {
    list: bool,
    count: bool,
}

impl RefreshRequest {
    fn merge(&mut self, other: RefreshRequest) {
        self.list |= other.list;
        self.count |= other.count;
    }
}

#[derive(Debug, Clone)]
struct ListState {
    /// Screen-fixed conditions every query carries
    base: RequestQueryBuilder,
    /// Base plus the applied side filters and sort
    query: RequestQueryBuilder,
    page: PageState,
}

impl ListState {
    fn page_query(&self) -> RequestQueryBuilder {
        let mut query = self.query.clone();
        query.paginator.set_page(self.page);
        query
    }
}

struct Inner<S: ListDataService> {
    service: Arc<S>,
    outbreak_id: OutbreakId,
    settings: PageSettings,
    state: Mutex<ListState>,
    snapshot: watch::Sender<ListSnapshot<S::Item>>,
}

pub struct ListController<S: ListDataService> {
    inner: Arc<Inner<S>>,
    refresh_tx: mpsc::UnboundedSender<RefreshRequest>,
}

impl<S: ListDataService> ListController<S> {
    /// Create the controller and spawn its refresh worker.
    ///
    /// Must be called within a Tokio runtime. The worker stops when the
    /// controller is dropped.
    pub fn new(service: Arc<S>, outbreak_id: OutbreakId, base: RequestQueryBuilder, config: &ListConfig) -> Self {
        let settings = config.page_settings();
        let page = settings.first_page();
        let (snapshot, _) = watch::channel(ListSnapshot::empty(page));

        let inner = Arc::new(Inner {
            service,
            outbreak_id,
            settings,
            state: Mutex::new(ListState {
                query: base.clone(),
                base,
                page,
            }),
            snapshot,
        });

        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(Arc::clone(&inner), refresh_rx, config.refresh_debounce()));

        Self { inner, refresh_tx }
    }

    pub fn outbreak_id(&self) -> &OutbreakId {
        &self.inner.outbreak_id
    }

    /// Receiver of every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ListSnapshot<S::Item>> {
        self.inner.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> ListSnapshot<S::Item> {
        self.inner.snapshot.borrow().clone()
    }

    pub async fn page(&self) -> PageState {
        self.inner.state.lock().await.page
    }

    /// The builder of the current page, paging bounds included
    pub async fn query_builder(&self) -> RequestQueryBuilder {
        self.inner.state.lock().await.page_query()
    }

    /// Back to the first page with the default page size
    pub async fn init_paginator(&self) {
        let page = self.inner.settings.first_page();
        self.inner.state.lock().await.page = page;
    }

    /// Go to another page; the size snaps to the allowed options
    pub async fn change_page(&self, page: PageState) {
        let page = PageState::new(page.page_index, self.inner.settings.normalize(page.page_size));
        {
            let mut state = self.inner.state.lock().await;
            let resized = state.page.page_size != page.page_size;
            state.page = if resized { PageState::first(page.page_size) } else { page };
        }
        self.schedule(RefreshRequest {
            list: true,
            count: false,
        });
    }

    /// Replace the side filters with `filters`, back to the first page.
    ///
    /// The screen-fixed conditions always hold; the side filters keep their
    /// own operator.
    pub async fn apply_side_filters(&self, filters: &RequestQueryBuilder) {
        {
            let mut state = self.inner.state.lock().await;
            let mut query = state.base.clone();
            query.intersect(filters, MergeConfig::default());
            query.paginator.clear();
            state.query = query;
        }
        self.needs_refresh_list(true).await;
    }

    /// Order by a single key, replacing any previous order
    pub async fn sort_by(&self, field: &str, direction: SortDirection) {
        {
            let mut state = self.inner.state.lock().await;
            state.query.sort.clear();
            state.query.sort_by(field, direction);
        }
        self.needs_refresh_list(false).await;
    }

    /// Mark the list dirty; page and count are fetched after the debounce window
    pub async fn needs_refresh_list(&self, reset_pagination: bool) {
        if reset_pagination {
            let mut state = self.inner.state.lock().await;
            state.page = PageState::first(state.page.page_size);
        }
        self.schedule(RefreshRequest {
            list: true,
            count: true,
        });
    }

    /// Fetch the current page now
    pub async fn refresh_list(&self) -> GdResult<()> {
        self.inner.refresh_list().await
    }

    /// Fetch the record count now
    pub async fn refresh_list_count(&self) -> GdResult<()> {
        self.inner.refresh_list_count().await
    }

    fn schedule(&self, request: RefreshRequest) {
        if self.refresh_tx.send(request).is_err() {
            tracing::warn!("list refresh worker is gone, refresh dropped");
        }
    }
}

impl<S: ListDataService> Inner<S> {
    async fn refresh_list(&self) -> GdResult<()> {
        let (query, page) = {
            let state = self.state.lock().await;
            (state.page_query(), state.page)
        };
        tracing::debug!(outbreak = %self.outbreak_id, page = page.page_index, "refreshing list");

        let result = self.service.list(&self.outbreak_id, &query).await;
        self.snapshot.send_modify(|snapshot| match &result {
            Ok(items) => {
                snapshot.items = items.clone();
                snapshot.page = page;
                snapshot.list_error = None;
            }
            Err(e) => snapshot.list_error = Some(e.to_string()),
        });
        result.map(|_| ())
    }

    async fn refresh_list_count(&self) -> GdResult<()> {
        let query = self.state.lock().await.query.count_query();
        tracing::debug!(outbreak = %self.outbreak_id, "refreshing list count");

        let result = self.service.count(&self.outbreak_id, &query).await;
        self.snapshot.send_modify(|snapshot| match &result {
            Ok(response) => {
                snapshot.count = Some(response.count);
                snapshot.count_error = None;
            }
            Err(e) => snapshot.count_error = Some(e.to_string()),
        });
        result.map(|_| ())
    }

    async fn execute(&self, request: RefreshRequest) {
        let list = async {
            if request.list {
                if let Err(e) = self.refresh_list().await {
                    tracing::error!(outbreak = %self.outbreak_id, "list refresh failed: {}", e);
                }
            }
        };
        let count = async {
            if request.count {
                if let Err(e) = self.refresh_list_count().await {
                    tracing::error!(outbreak = %self.outbreak_id, "list count refresh failed: {}", e);
                }
            }
        };
        futures::future::join(list, count).await;
    }
}

async fn run_worker<S: ListDataService>(
    inner: Arc<Inner<S>>,
    mut refresh_rx: mpsc::UnboundedReceiver<RefreshRequest>,
    debounce: Duration,
) {
    while let Some(first) = refresh_rx.recv().await {
        let mut pending = first;
        let mut coalesced = 1usize;
        let deadline = sleep(debounce);
        tokio::pin!(deadline);

        let closed = loop {
            tokio::select! {
                _ = &mut deadline => break false,
                next = refresh_rx.recv() => match next {
                    Some(request) => {
                        pending.merge(request);
                        coalesced += 1;
                        deadline.as_mut().reset(Instant::now() + debounce);
                    }
                    None => break true,
                },
            }
        };

        if closed {
            break;
        }
        tracing::debug!(outbreak = %inner.outbreak_id, coalesced, "running coalesced refresh");
        inner.execute(pending).await;
    }
    tracing::debug!(outbreak = %inner.outbreak_id, "list refresh worker stopped");
}
