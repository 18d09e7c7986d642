//! Article list view-model: paging, search, and the last-request-wins
//! reconciliation rule.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use enrich_client::{ApiClient, ListQuery};
use enrich_shared::{Article, total_pages};

// ---------------------------------------------------------------------------
// ListState
// ---------------------------------------------------------------------------

/// Snapshot of the article list screen.
#[derive(Debug, Clone)]
pub struct ListState {
    /// Last successfully fetched page of articles. Retained unchanged when
    /// a later fetch fails (stale-but-available).
    pub articles: Vec<Article>,
    /// Full count matching the active query/filter.
    pub total: u64,
    /// Current 1-indexed page.
    pub page: u32,
    pub page_size: u32,
    /// Active search query; `None` means plain listing.
    pub query: Option<String>,
    /// True from fetch start to settlement.
    pub loading: bool,
    /// User-facing message for the most recent failure, if any.
    pub error: Option<String>,
}

impl ListState {
    fn new(page_size: u32) -> Self {
        Self {
            articles: Vec::new(),
            total: 0,
            page: 1,
            page_size,
            query: None,
            loading: false,
            error: None,
        }
    }

    /// Last valid page for the current result set.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }
}

// ---------------------------------------------------------------------------
// ArticleListModel
// ---------------------------------------------------------------------------

/// Drives repository queries for the article list and reconciles responses
/// with the current page/query.
///
/// Every navigation or query change triggers exactly one fetch. A
/// monotonically increasing sequence number guards against an older
/// response overwriting a newer one (last-requested-wins): superseded
/// fetches are discarded on arrival, never aborted mid-flight.
pub struct ArticleListModel {
    client: ApiClient,
    page_size: u32,
    tx: watch::Sender<ListState>,
    rx: watch::Receiver<ListState>,
    seq: AtomicU64,
}

impl ArticleListModel {
    pub fn new(client: ApiClient, page_size: u32) -> Self {
        let (tx, rx) = watch::channel(ListState::new(page_size));
        Self {
            client,
            page_size,
            tx,
            rx,
            seq: AtomicU64::new(0),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> ListState {
        self.rx.borrow().clone()
    }

    /// Watch the state for changes.
    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.rx.clone()
    }

    /// Re-fetch the current page with the current query.
    pub async fn refresh(&self) {
        let (page, query) = {
            let state = self.rx.borrow();
            (state.page, state.query.clone())
        };
        self.fetch(page, query).await;
    }

    /// Change the search query and fetch page 1. A blank query clears the
    /// search and returns to the plain listing.
    pub async fn set_query(&self, raw: &str) {
        let trimmed = raw.trim();
        let query = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self.fetch(1, query).await;
    }

    /// Jump to a specific page (clamped to >= 1) with the current query.
    pub async fn go_to_page(&self, page: u32) {
        let query = self.rx.borrow().query.clone();
        self.fetch(page.max(1), query).await;
    }

    /// Advance one page. No-op at the last valid page.
    pub async fn next_page(&self) {
        let snap = self.snapshot();
        if !snap.has_next() {
            debug!(page = snap.page, "next_page ignored at last page");
            return;
        }
        self.fetch(snap.page + 1, snap.query).await;
    }

    /// Go back one page. No-op at page 1.
    pub async fn prev_page(&self) {
        let snap = self.snapshot();
        if !snap.has_prev() {
            debug!("prev_page ignored at first page");
            return;
        }
        self.fetch(snap.page - 1, snap.query).await;
    }

    async fn fetch(&self, page: u32, query: Option<String>) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let (prev_page, prev_query) = {
            let state = self.rx.borrow();
            (state.page, state.query.clone())
        };

        self.tx.send_modify(|state| {
            state.loading = true;
            state.error = None;
            state.page = page;
            state.query = query.clone();
        });

        let result = match &query {
            Some(q) => self.client.search_articles(q, page, self.page_size).await,
            None => {
                self.client
                    .list_articles(&ListQuery::for_page(page, self.page_size))
                    .await
            }
        };

        // Last-requested-wins: a newer fetch has started since this one —
        // its settlement owns the state now.
        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(seq, page, "stale list response discarded");
            return;
        }

        match result {
            Ok(listing) => {
                self.tx.send_modify(|state| {
                    state.articles = listing.articles;
                    state.total = listing.total;
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(e) => {
                warn!(page, error = %e, "list fetch failed, keeping previous results");
                self.tx.send_modify(|state| {
                    state.page = prev_page;
                    state.query = prev_query.clone();
                    state.loading = false;
                    state.error = Some(e.to_string());
                });
            }
        }
    }
}
