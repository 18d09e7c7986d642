//! Typed client for the Enrich backend REST API.
//!
//! [`ApiClient`] carries both halves of the backend contract:
//! - the article repository (list, search, fetch-by-id, delete, health)
//! - the processing orchestrator (sync submit, async submit, task polling)
//!
//! A single configured `reqwest::Client` is built once per [`ApiClient`]
//! and shared by every operation; there is no ambient/global HTTP state.
//! The client itself is stateless — all view state lives in the caller.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};
use url::Url;

use enrich_shared::{
    ApiSettings, Article, ArticleListResponse, EnrichError, Health, ProcessResponse,
    ProcessingTask, Result, TaskAccepted,
};

/// User-Agent string for API requests.
const USER_AGENT: &str = concat!("Enrich/", env!("CARGO_PKG_VERSION"));

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default page size when a caller does not specify one.
pub const DEFAULT_PAGE_SIZE: u32 = 12;

// ---------------------------------------------------------------------------
// ListQuery
// ---------------------------------------------------------------------------

/// Parameters for a paged article listing.
///
/// `language`, `category`, and `status` are optional filters and combine
/// conjunctively when more than one is present.
#[derive(Debug, Clone)]
pub struct ListQuery {
    /// 1-indexed page to fetch.
    pub page: u32,
    pub page_size: u32,
    pub language: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            language: None,
            category: None,
            status: None,
        }
    }
}

impl ListQuery {
    /// An unfiltered query for the given page.
    pub fn for_page(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// URL validation
// ---------------------------------------------------------------------------

/// Pre-flight validation for a user-supplied source URL.
///
/// Rejects empty/whitespace-only input and anything that does not parse as
/// an absolute http(s) URL. Runs before any network I/O.
pub fn validate_source_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(EnrichError::validation("source URL is empty"));
    }

    let url = Url::parse(trimmed)
        .map_err(|e| EnrichError::validation(format!("invalid URL '{trimmed}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(EnrichError::validation(format!(
            "unsupported URL scheme '{other}': expected http or https"
        ))),
    }
}

// ---------------------------------------------------------------------------
// ApiClient
// ---------------------------------------------------------------------------

/// Typed operations against the Enrich backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client from API settings. The base URL must be absolute
    /// http(s); the timeout bounds every request issued by this client.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let base = validate_source_url(&settings.base_url)
            .map_err(|e| EnrichError::config(format!("invalid api.base_url: {e}")))?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(settings.timeout())
            .build()
            .map_err(|e| EnrichError::transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: base.as_str().trim_end_matches('/').to_string(),
        })
    }

    /// Build a client for a base URL with an explicit timeout.
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
        Self::new(&ApiSettings {
            base_url: base_url.to_string(),
            timeout_secs: timeout.as_secs().max(1),
        })
    }

    /// The configured backend base address.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // -- Article repository -------------------------------------------------

    /// List articles, paged and optionally filtered.
    ///
    /// `total` in the response is the full count matching the filter;
    /// requesting a page beyond `ceil(total / page_size)` yields an empty
    /// `articles` sequence with the true `total`, not an error.
    #[instrument(skip_all, fields(page = query.page, page_size = query.page_size))]
    pub async fn list_articles(&self, query: &ListQuery) -> Result<ArticleListResponse> {
        validate_paging(query.page, query.page_size)?;

        let mut request = self.http.get(self.endpoint("/articles")).query(&[
            ("page", query.page.to_string()),
            ("page_size", query.page_size.to_string()),
        ]);
        if let Some(language) = &query.language {
            request = request.query(&[("language", language)]);
        }
        if let Some(category) = &query.category {
            request = request.query(&[("category", category)]);
        }
        if let Some(status) = &query.status {
            request = request.query(&[("status", status)]);
        }

        let response = request.send().await.map_err(request_error)?;
        let response = expect_success(response).await?;
        let listing: ArticleListResponse = read_json(response).await?;

        debug!(
            returned = listing.articles.len(),
            total = listing.total,
            "articles listed"
        );
        Ok(listing)
    }

    /// Full-text search over articles. The query string is passed through
    /// unmodified — enforcing non-emptiness is the caller's responsibility.
    #[instrument(skip_all, fields(page, page_size))]
    pub async fn search_articles(
        &self,
        q: &str,
        page: u32,
        page_size: u32,
    ) -> Result<ArticleListResponse> {
        validate_paging(page, page_size)?;

        let response = self
            .http
            .get(self.endpoint("/articles/search/"))
            .query(&[
                ("q", q.to_string()),
                ("page", page.to_string()),
                ("page_size", page_size.to_string()),
            ])
            .send()
            .await
            .map_err(request_error)?;

        let response = expect_success(response).await?;
        read_json(response).await
    }

    /// Fetch a single article by id. A 404 maps to [`EnrichError::NotFound`]
    /// so the UI can render a domain-specific view.
    #[instrument(skip_all, fields(article_id = %id))]
    pub async fn get_article(&self, id: &str) -> Result<Article> {
        let response = self
            .http
            .get(self.endpoint(&format!("/articles/{id}")))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound(format!("article '{id}'")));
        }
        let response = expect_success(response).await?;
        read_json(response).await
    }

    /// Delete an article by id. A 404 maps to [`EnrichError::NotFound`];
    /// callers treat repeat deletes as success-or-NotFound, never fatal.
    #[instrument(skip_all, fields(article_id = %id))]
    pub async fn delete_article(&self, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/articles/{id}")))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound(format!("article '{id}'")));
        }
        expect_success(response).await?;
        info!(article_id = %id, "article deleted");
        Ok(())
    }

    /// Probe backend health.
    pub async fn health(&self) -> Result<Health> {
        let response = self
            .http
            .get(self.endpoint("/health"))
            .send()
            .await
            .map_err(request_error)?;
        let response = expect_success(response).await?;
        read_json(response).await
    }

    // -- Processing orchestrator --------------------------------------------

    /// Submit a source URL for synchronous processing. Blocks until the
    /// backend finishes or fails; the URL is validated before any network
    /// call is made.
    #[instrument(skip_all, fields(url = %url.trim()))]
    pub async fn process_url(&self, url: &str) -> Result<ProcessResponse> {
        let source = validate_source_url(url)?;

        info!("submitting URL for synchronous processing");
        let response = self
            .http
            .post(self.endpoint("/process/"))
            .json(&serde_json::json!({ "url": source.as_str() }))
            .send()
            .await
            .map_err(request_error)?;

        let response = expect_success(response).await?;
        let outcome: ProcessResponse = read_json(response).await?;
        info!(
            success = outcome.success,
            article_id = outcome.article_id.as_deref().unwrap_or("-"),
            "synchronous processing finished"
        );
        Ok(outcome)
    }

    /// Submit a source URL for asynchronous processing. Returns as soon as
    /// the task is accepted — acceptance does not imply the task has started.
    #[instrument(skip_all, fields(url = %url.trim()))]
    pub async fn process_url_async(&self, url: &str) -> Result<TaskAccepted> {
        let source = validate_source_url(url)?;

        let response = self
            .http
            .post(self.endpoint("/process/async"))
            .json(&serde_json::json!({ "url": source.as_str() }))
            .send()
            .await
            .map_err(request_error)?;

        let response = expect_success(response).await?;
        let accepted: TaskAccepted = read_json(response).await?;
        info!(task_id = %accepted.task_id, "processing task accepted");
        Ok(accepted)
    }

    /// Poll the status of an asynchronous processing task. Safe to call
    /// repeatedly — observation has no side effects, and a terminal task
    /// keeps returning the same state, result, and error.
    #[instrument(skip_all, fields(task_id = %task_id))]
    pub async fn task_status(&self, task_id: &str) -> Result<ProcessingTask> {
        let response = self
            .http
            .get(self.endpoint(&format!("/process/status/{task_id}")))
            .send()
            .await
            .map_err(request_error)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(EnrichError::NotFound(format!("task '{task_id}'")));
        }
        let response = expect_success(response).await?;
        read_json(response).await
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn validate_paging(page: u32, page_size: u32) -> Result<()> {
    if page == 0 {
        return Err(EnrichError::validation("page must be >= 1"));
    }
    if page_size == 0 {
        return Err(EnrichError::validation("page_size must be >= 1"));
    }
    Ok(())
}

/// Map a reqwest send-level failure to a transport error.
fn request_error(e: reqwest::Error) -> EnrichError {
    let message = if e.is_timeout() {
        "request timed out".to_string()
    } else {
        e.to_string()
    };
    EnrichError::Transport {
        status: e.status().map(|s| s.as_u16()),
        message,
    }
}

/// Turn a non-2xx response into a transport error, extracting the backend's
/// `detail` field when the body is the usual JSON error shape.
async fn expect_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail")?.as_str().map(String::from))
        .unwrap_or(body);

    Err(EnrichError::Transport {
        status: Some(status.as_u16()),
        message: format!("HTTP {}: {detail}", status.as_u16()),
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| EnrichError::transport(format!("invalid response body: {e}")))
}
