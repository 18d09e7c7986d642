//! Task status polling: a blocking helper and a cancellable background
//! poller.
//!
//! Polling only observes — the client never transitions task state, and
//! timing out does not cancel anything on the backend.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use enrich_client::ApiClient;
use enrich_shared::{EnrichError, PollingSettings, ProcessResponse, ProcessingTask, Result};

// ---------------------------------------------------------------------------
// PollPolicy
// ---------------------------------------------------------------------------

/// Runtime polling policy — merged from config or built directly in tests.
#[derive(Debug, Clone)]
pub struct PollPolicy {
    /// Fixed interval between status polls.
    pub interval: Duration,
    /// Give up waiting after this long. The task keeps running backend-side.
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&PollingSettings::default())
    }
}

impl From<&PollingSettings> for PollPolicy {
    fn from(settings: &PollingSettings) -> Self {
        Self {
            interval: settings.interval(),
            timeout: settings.timeout(),
        }
    }
}

// ---------------------------------------------------------------------------
// poll_until_terminal
// ---------------------------------------------------------------------------

/// How a bounded polling wait ended.
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// The task completed; carries its result.
    Completed(ProcessResponse),
    /// The task failed; carries the backend-provided error text.
    Failed(String),
    /// The wait timed out with the task still `processing`. Carries the last
    /// observed task so the caller can keep the id and resume later.
    TimedOut(ProcessingTask),
}

impl PollOutcome {
    /// Collapse a terminal outcome into a `Result`, mapping a failed task to
    /// [`EnrichError::TaskFailed`]. A timeout stays `Ok` wrapped in the
    /// outcome — it is not an error and implies no cancellation.
    pub fn completed(self) -> Result<Option<ProcessResponse>> {
        match self {
            Self::Completed(response) => Ok(Some(response)),
            Self::Failed(error) => Err(EnrichError::TaskFailed(error)),
            Self::TimedOut(_) => Ok(None),
        }
    }
}

/// Poll `task_id` at a fixed interval until a terminal state is observed or
/// the policy timeout elapses. Transport and not-found errors propagate.
pub async fn poll_until_terminal(
    client: &ApiClient,
    task_id: &str,
    policy: &PollPolicy,
) -> Result<PollOutcome> {
    let deadline = Instant::now() + policy.timeout;

    loop {
        let task = client.task_status(task_id).await?;

        match task.status {
            enrich_shared::TaskStatus::Completed => {
                let result = task.result.ok_or_else(|| {
                    EnrichError::transport("completed task is missing its result")
                })?;
                return Ok(PollOutcome::Completed(result));
            }
            enrich_shared::TaskStatus::Failed => {
                let error = task
                    .error
                    .unwrap_or_else(|| "task failed without error detail".to_string());
                return Ok(PollOutcome::Failed(error));
            }
            enrich_shared::TaskStatus::Processing => {
                if Instant::now() + policy.interval >= deadline {
                    debug!(task_id, "poll timeout reached, task still processing");
                    return Ok(PollOutcome::TimedOut(task));
                }
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TaskPoller
// ---------------------------------------------------------------------------

/// Background poller for one processing task.
///
/// Publishes each observed [`ProcessingTask`] through a watch channel and
/// exits on its own once a terminal state is seen. [`stop`](Self::stop) is
/// idempotent — double-stop is a no-op, and there is no reliance on
/// implicit teardown.
pub struct TaskPoller {
    task_id: String,
    stop_tx: watch::Sender<bool>,
    state_rx: watch::Receiver<Option<ProcessingTask>>,
    handle: JoinHandle<()>,
}

impl TaskPoller {
    /// Spawn a poller for `task_id` on the current tokio runtime.
    pub fn spawn(client: ApiClient, task_id: impl Into<String>, interval: Duration) -> Self {
        let task_id = task_id.into();
        let (state_tx, state_rx) = watch::channel(None);
        let (stop_tx, stop_rx) = watch::channel(false);

        let handle = tokio::spawn(poll_loop(
            client,
            task_id.clone(),
            interval,
            state_tx,
            stop_rx,
        ));

        Self {
            task_id,
            stop_tx,
            state_rx,
            handle,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Last observed task state, if any poll has succeeded yet.
    pub fn snapshot(&self) -> Option<ProcessingTask> {
        self.state_rx.borrow().clone()
    }

    /// Watch observed task states.
    pub fn subscribe(&self) -> watch::Receiver<Option<ProcessingTask>> {
        self.state_rx.clone()
    }

    /// Request the poll loop to stop. Safe to call any number of times.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Whether the poll loop has exited (terminal state, stop, or vanished
    /// task).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the poll loop to exit.
    pub async fn join(self) {
        let _ = self.handle.await;
    }
}

async fn poll_loop(
    client: ApiClient,
    task_id: String,
    interval: Duration,
    state_tx: watch::Sender<Option<ProcessingTask>>,
    mut stop_rx: watch::Receiver<bool>,
) {
    loop {
        if *stop_rx.borrow() {
            break;
        }

        match client.task_status(&task_id).await {
            Ok(task) => {
                let terminal = task.status.is_terminal();
                let _ = state_tx.send(Some(task));
                if terminal {
                    break;
                }
            }
            Err(EnrichError::NotFound(message)) => {
                warn!(%task_id, %message, "task vanished, stopping poller");
                break;
            }
            Err(e) => {
                // Transient transport failures: keep polling.
                warn!(%task_id, error = %e, "status poll failed, will retry");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            changed = stop_rx.changed() => {
                if changed.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }

    debug!(%task_id, "poller stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use enrich_shared::TaskStatus;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn processing_json(task_id: &str) -> serde_json::Value {
        serde_json::json!({
            "task_id": task_id,
            "status": "processing",
            "result": null,
            "error": null
        })
    }

    fn completed_json(task_id: &str, article_id: &str) -> serde_json::Value {
        serde_json::json!({
            "task_id": task_id,
            "status": "completed",
            "result": {
                "success": true,
                "article_id": article_id,
                "message": "Article generated"
            },
            "error": null
        })
    }

    async fn client_for(server: &MockServer) -> ApiClient {
        ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).expect("build client")
    }

    fn fast_policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(10),
            timeout: Duration::from_secs(5),
        }
    }

    #[tokio::test]
    async fn polls_until_completed() {
        let server = MockServer::start().await;

        // Two processing responses, then completed.
        Mock::given(method("GET"))
            .and(path("/process/status/t-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(processing_json("t-1")))
            .up_to_n_times(2)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(completed_json("t-1", "abc123")),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let outcome = poll_until_terminal(&client, "t-1", &fast_policy())
            .await
            .expect("poll");

        match outcome {
            PollOutcome::Completed(response) => {
                assert!(response.success);
                assert_eq!(response.article_id.as_deref(), Some("abc123"));
            }
            other => panic!("expected Completed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_task_carries_backend_error() {
        let server = MockServer::start().await;

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

        let client = client_for(&server).await;
        let outcome = poll_until_terminal(&client, "t-2", &fast_policy())
            .await
            .expect("poll");

        match &outcome {
            PollOutcome::Failed(error) => assert_eq!(error, "scrape blocked by source"),
            other => panic!("expected Failed, got {other:?}"),
        }

        let err = outcome.completed().expect_err("failed maps to error");
        assert!(matches!(err, EnrichError::TaskFailed(_)));
    }

    #[tokio::test]
    async fn timeout_leaves_task_processing() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(processing_json("t-3")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let policy = PollPolicy {
            interval: Duration::from_millis(20),
            timeout: Duration::from_millis(100),
        };
        let outcome = poll_until_terminal(&client, "t-3", &policy)
            .await
            .expect("poll");

        match outcome {
            PollOutcome::TimedOut(task) => {
                assert_eq!(task.status, TaskStatus::Processing);
                assert_eq!(task.task_id, "t-3");
            }
            other => panic!("expected TimedOut, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unknown_task_propagates_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/process/status/ghost"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Task not found"})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let err = poll_until_terminal(&client, "ghost", &fast_policy())
            .await
            .expect_err("404 propagates");
        assert!(matches!(err, EnrichError::NotFound(_)));
    }

    #[tokio::test]
    async fn poller_stops_itself_on_terminal_state() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/process/status/t-4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completed_json("t-4", "a9")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let poller = TaskPoller::spawn(client, "t-4", Duration::from_millis(10));
        let rx = poller.subscribe();

        tokio::time::timeout(Duration::from_secs(2), poller.join())
            .await
            .expect("poller exits on its own");

        let observed = rx.borrow().clone().expect("state published");
        assert_eq!(observed.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let server = MockServer::start().await;

        // Task never reaches a terminal state; only stop() ends the loop.
        Mock::given(method("GET"))
            .and(path("/process/status/t-5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(processing_json("t-5")))
            .mount(&server)
            .await;

        let client = client_for(&server).await;
        let poller = TaskPoller::spawn(client, "t-5", Duration::from_millis(50));

        poller.stop();
        poller.stop(); // double-stop must not error

        tokio::time::timeout(Duration::from_secs(2), poller.join())
            .await
            .expect("poller exits after stop");
    }
}
