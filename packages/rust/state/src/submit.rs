//! Submission form state: URL input, async submit, and polling to a
//! terminal outcome.

use tokio::sync::watch;
use tracing::{info, warn};

use enrich_client::ApiClient;

use crate::poll::{PollOutcome, PollPolicy, poll_until_terminal};

// ---------------------------------------------------------------------------
// SubmitState
// ---------------------------------------------------------------------------

/// Snapshot of the submission form.
#[derive(Debug, Clone, Default)]
pub struct SubmitState {
    /// The URL as typed. Kept on failure so the user can retry without
    /// retyping; cleared only on success.
    pub url: String,
    /// True while a submission (including its polling wait) is in flight.
    pub submitting: bool,
    /// Task id of the most recent async submission, once accepted.
    pub task_id: Option<String>,
    /// Success/progress message shown next to the form.
    pub message: Option<String>,
    /// Failure message shown next to the form.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// SubmitModel
// ---------------------------------------------------------------------------

/// Owns the URL-submission form and drives one async submission at a time
/// through to a terminal outcome.
pub struct SubmitModel {
    client: ApiClient,
    tx: watch::Sender<SubmitState>,
    rx: watch::Receiver<SubmitState>,
}

impl SubmitModel {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = watch::channel(SubmitState::default());
        Self { client, tx, rx }
    }

    /// Current state, cloned.
    pub fn snapshot(&self) -> SubmitState {
        self.rx.borrow().clone()
    }

    /// Watch the state for changes.
    pub fn subscribe(&self) -> watch::Receiver<SubmitState> {
        self.rx.clone()
    }

    /// Replace the typed URL.
    pub fn set_url(&self, url: impl Into<String>) {
        let url = url.into();
        self.tx.send_modify(|state| state.url = url);
    }

    /// Append one character to the typed URL.
    pub fn push_char(&self, c: char) {
        self.tx.send_modify(|state| state.url.push(c));
    }

    /// Remove the last character of the typed URL.
    pub fn backspace(&self) {
        self.tx.send_modify(|state| {
            state.url.pop();
        });
    }

    /// Submit the typed URL asynchronously and poll until the task reaches
    /// a terminal state or the policy times out.
    ///
    /// Returns `true` when an article was created — the signal for the
    /// consumer to refresh any active article listing. Validation and
    /// submission failures land in [`SubmitState::error`] with the typed
    /// URL intact.
    pub async fn submit(&self, policy: &PollPolicy) -> bool {
        let url = {
            let state = self.rx.borrow();
            if state.submitting {
                return false;
            }
            state.url.clone()
        };

        self.tx.send_modify(|state| {
            state.submitting = true;
            state.task_id = None;
            state.message = Some("Submitting…".to_string());
            state.error = None;
        });

        let accepted = match self.client.process_url_async(&url).await {
            Ok(accepted) => accepted,
            Err(e) => {
                warn!(error = %e, "submission rejected");
                self.tx.send_modify(|state| {
                    state.submitting = false;
                    state.message = None;
                    state.error = Some(e.to_string());
                });
                return false;
            }
        };

        self.tx.send_modify(|state| {
            state.task_id = Some(accepted.task_id.clone());
            state.message = Some(format!("Processing (task {})…", accepted.task_id));
        });

        match poll_until_terminal(&self.client, &accepted.task_id, policy).await {
            Ok(PollOutcome::Completed(outcome)) if outcome.success => {
                info!(
                    article_id = outcome.article_id.as_deref().unwrap_or("-"),
                    "submission produced an article"
                );
                self.tx.send_modify(|state| {
                    state.url.clear();
                    state.submitting = false;
                    state.message = Some(outcome.message.clone());
                    state.error = None;
                });
                true
            }
            Ok(PollOutcome::Completed(outcome)) => {
                // Terminal, but the pipeline reported no article.
                self.tx.send_modify(|state| {
                    state.submitting = false;
                    state.message = None;
                    state.error = Some(outcome.message.clone());
                });
                false
            }
            Ok(PollOutcome::Failed(error)) => {
                self.tx.send_modify(|state| {
                    state.submitting = false;
                    state.message = None;
                    state.error = Some(error);
                });
                false
            }
            Ok(PollOutcome::TimedOut(task)) => {
                // Not a failure: the backend is still working on it.
                self.tx.send_modify(|state| {
                    state.submitting = false;
                    state.message = Some(format!(
                        "Still processing — check task {} later",
                        task.task_id
                    ));
                });
                false
            }
            Err(e) => {
                warn!(error = %e, "polling failed");
                self.tx.send_modify(|state| {
                    state.submitting = false;
                    state.message = None;
                    state.error = Some(e.to_string());
                });
                false
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

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        }
    }

    async fn model_for(server: &MockServer) -> SubmitModel {
        let client = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5))
            .expect("build client");
        SubmitModel::new(client)
    }

    #[tokio::test]
    async fn successful_submission_clears_the_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/process/async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"task_id": "t-1", "status": "processing"}),
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task_id": "t-1",
                "status": "completed",
                "result": {
                    "success": true,
                    "article_id": "abc123",
                    "message": "Article generated"
                },
                "error": null
            })))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        model.set_url("https://facebook.com/examplepage");

        let created = model.submit(&fast_policy()).await;
        assert!(created, "consumer should refresh the listing");

        let state = model.snapshot();
        assert!(state.url.is_empty(), "form cleared on success");
        assert!(!state.submitting);
        assert_eq!(state.message.as_deref(), Some("Article generated"));
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn successful_submission_shows_up_in_the_next_listing() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/process/async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"task_id": "t-9", "status": "processing"}),
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task_id": "t-9",
                "status": "completed",
                "result": {
                    "success": true,
                    "article_id": "abc123",
                    "message": "Article generated"
                },
                "error": null
            })))
            .mount(&server)
            .await;

        // The backend has persisted the new article by the time the task
        // reports completed.
        Mock::given(method("GET"))
            .and(path("/articles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "articles": [{
                    "id": "abc123",
                    "title": "Example Page",
                    "body": "Body.",
                    "language": "en",
                    "source_url": "https://facebook.com/examplepage",
                    "source_type": "page"
                }],
                "total": 1,
                "page": 1,
                "page_size": 12
            })))
            .mount(&server)
            .await;

        let client = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5))
            .expect("build client");
        let model = SubmitModel::new(client.clone());
        let list = crate::list::ArticleListModel::new(client, 12);

        model.set_url("https://facebook.com/examplepage");
        let created = model.submit(&fast_policy()).await;
        assert!(created);

        // The consumer-triggered refresh picks up the new article.
        list.refresh().await;
        let articles = list.snapshot().articles;
        assert!(articles.iter().any(|a| a.id == "abc123"));
    }

    #[tokio::test]
    async fn validation_failure_keeps_the_typed_url() {
        let server = MockServer::start().await;
        let model = model_for(&server).await;

        model.set_url("not a url");
        let created = model.submit(&fast_policy()).await;
        assert!(!created);

        let state = model.snapshot();
        assert_eq!(state.url, "not a url", "form contents retained");
        assert!(state.error.expect("error shown").contains("invalid URL"));

        let requests = server.received_requests().await.expect("recording on");
        assert!(requests.is_empty(), "validation never reaches the network");
    }

    #[tokio::test]
    async fn failed_task_keeps_the_typed_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/process/async"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"task_id": "t-2", "status": "processing"}),
            ))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "task_id": "t-2",
                "status": "failed",
                "result": null,
                "error": "scrape blocked by source"
            })))
            .mount(&server)
            .await;

        let model = model_for(&server).await;
        model.set_url("https://facebook.com/examplepage");

        let created = model.submit(&fast_policy()).await;
        assert!(!created);

        let state = model.snapshot();
        assert_eq!(state.url, "https://facebook.com/examplepage");
        assert_eq!(state.error.as_deref(), Some("scrape blocked by source"));
    }

    #[tokio::test]
    async fn editing_helpers_mutate_the_url() {
        let server = MockServer::start().await;
        let model = model_for(&server).await;

        model.push_char('h');
        model.push_char('i');
        model.backspace();
        assert_eq!(model.snapshot().url, "h");

        model.set_url("https://example.com");
        assert_eq!(model.snapshot().url, "https://example.com");
    }
}
