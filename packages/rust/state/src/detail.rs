//! Article detail view-model: one fetch per id, with a dedicated
//! not-found presentation state.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::{debug, warn};

use enrich_client::ApiClient;
use enrich_shared::{Article, EnrichError};

// ---------------------------------------------------------------------------
// DetailError
// ---------------------------------------------------------------------------

/// Failure kinds for the detail screen.
///
/// `MissingId` and `NotFound` render the same "Article Not Found" view but
/// stay distinguishable for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailError {
    /// No id was supplied; no network call was made.
    MissingId,
    /// The backend does not know this id.
    NotFound,
    /// Any other failure, with a user-facing message.
    Other(String),
}

impl DetailError {
    /// Whether this error renders as the "Article Not Found" view.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::MissingId | Self::NotFound)
    }
}

impl std::fmt::Display for DetailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingId => write!(f, "no article id provided"),
            Self::NotFound => write!(f, "article not found"),
            Self::Other(message) => write!(f, "{message}"),
        }
    }
}

// ---------------------------------------------------------------------------
// DetailState
// ---------------------------------------------------------------------------

/// Snapshot of the article detail screen.
#[derive(Debug, Clone, Default)]
pub struct DetailState {
    pub article: Option<Article>,
    pub loading: bool,
    pub error: Option<DetailError>,
}

// ---------------------------------------------------------------------------
// ArticleDetailModel
// ---------------------------------------------------------------------------

/// Fetches a single article and exposes `{article, loading, error}`.
pub struct ArticleDetailModel {
    client: ApiClient,
    tx: watch::Sender<DetailState>,
    rx: watch::Receiver<DetailState>,
    seq: AtomicU64,
}

impl ArticleDetailModel {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = watch::channel(DetailState::default());
        Self {
            client,
            tx,
            rx,
            seq: AtomicU64::new(0),
        }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> DetailState {
        self.rx.borrow().clone()
    }

    /// Watch the state for changes.
    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.rx.clone()
    }

    /// Discard the held article (called on navigation away).
    pub fn reset(&self) {
        self.seq.fetch_add(1, Ordering::SeqCst);
        self.tx.send_modify(|state| *state = DetailState::default());
    }

    /// Fetch the article with the given id. A missing/blank id resolves to
    /// [`DetailError::MissingId`] immediately — no transport attempt.
    pub async fn load(&self, id: &str) {
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;

        let trimmed = id.trim();
        if trimmed.is_empty() {
            warn!("article detail requested without an id");
            self.tx.send_modify(|state| {
                state.article = None;
                state.loading = false;
                state.error = Some(DetailError::MissingId);
            });
            return;
        }

        self.tx.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.client.get_article(trimmed).await;

        if self.seq.load(Ordering::SeqCst) != seq {
            debug!(article_id = trimmed, "stale detail response discarded");
            return;
        }

        match result {
            Ok(article) => {
                self.tx.send_modify(|state| {
                    state.article = Some(article);
                    state.loading = false;
                    state.error = None;
                });
            }
            Err(EnrichError::NotFound(_)) => {
                self.tx.send_modify(|state| {
                    state.article = None;
                    state.loading = false;
                    state.error = Some(DetailError::NotFound);
                });
            }
            Err(e) => {
                warn!(article_id = trimmed, error = %e, "detail fetch failed");
                self.tx.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(DetailError::Other(e.to_string()));
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn model_for(server: &MockServer) -> ArticleDetailModel {
        let client = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5))
            .expect("build client");
        ArticleDetailModel::new(client)
    }

    #[tokio::test]
    async fn missing_id_resolves_without_network() {
        let server = MockServer::start().await;
        let model = model_for(&server).await;

        model.load("   ").await;

        let state = model.snapshot();
        assert_eq!(state.error, Some(DetailError::MissingId));
        assert!(state.error.expect("error").is_not_found());
        assert!(state.article.is_none());

        let requests = server.received_requests().await.expect("recording on");
        assert!(requests.is_empty(), "no network call should be issued");
    }

    #[tokio::test]
    async fn unknown_id_resolves_to_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/articles/missing-id"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Article not found"})),
            )
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        model.load("missing-id").await;

        let state = model.snapshot();
        assert_eq!(state.error, Some(DetailError::NotFound));
        assert!(state.article.is_none());
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn transport_failure_is_a_distinct_kind() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/articles/a1"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        model.load("a1").await;

        let state = model.snapshot();
        let error = state.error.expect("error set");
        assert!(matches!(error, DetailError::Other(_)));
        assert!(!error.is_not_found());
    }

    #[tokio::test]
    async fn successful_load_holds_the_article() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/articles/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "abc123",
                "title": "Example",
                "body": "Body.",
                "language": "en",
                "source_url": "https://example.com/page",
                "source_type": "page"
            })))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        model.load("abc123").await;

        let state = model.snapshot();
        assert_eq!(state.article.expect("article").id, "abc123");
        assert!(state.error.is_none());

        model.reset();
        assert!(model.snapshot().article.is_none());
    }
}
