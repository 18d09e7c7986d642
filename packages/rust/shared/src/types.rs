//! Core domain types for the Enrich backend's wire contract.
//!
//! All request/response bodies are UTF-8 JSON. Articles are immutable once
//! generated; the client only reads and displays them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Category of the origin URL an article was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// A public page.
    Page,
    /// A group/community feed.
    Group,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Page => write!(f, "page"),
            Self::Group => write!(f, "group"),
        }
    }
}

// ---------------------------------------------------------------------------
// QaScores
// ---------------------------------------------------------------------------

/// Backend-computed quality-assurance metrics, each on a 0–100 scale.
///
/// `passed` and `failed_metrics` are derived by the backend from its own
/// thresholds; the client displays them and never recomputes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaScores {
    pub readability: f64,
    pub coherence: f64,
    pub redundancy: f64,
    pub neutrality: f64,
    pub human_likeness: f64,
    pub passed: bool,
    /// Names of exactly the metrics that failed the backend thresholds.
    #[serde(default)]
    pub failed_metrics: Vec<String>,
}

impl QaScores {
    /// The five metrics as `(name, value)` pairs, in display order.
    pub fn metrics(&self) -> [(&'static str, f64); 5] {
        [
            ("readability", self.readability),
            ("coherence", self.coherence),
            ("redundancy", self.redundancy),
            ("neutrality", self.neutrality),
            ("human_likeness", self.human_likeness),
        ]
    }
}

// ---------------------------------------------------------------------------
// Article
// ---------------------------------------------------------------------------

/// A generated encyclopedic document derived from a source URL.
///
/// Immutable once generated — mutable only through full backend
/// regeneration, never by the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Opaque backend-assigned identifier.
    pub id: String,
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub summary: Option<String>,
    /// ISO-like language code (e.g. "en", "ar").
    pub language: String,
    /// Optional regional refinement, meaningful only for some languages.
    #[serde(default)]
    pub dialect: Option<String>,
    /// Origin URL the article was generated from.
    pub source_url: String,
    pub source_type: SourceType,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Absent until QA has run.
    #[serde(default)]
    pub qa_scores: Option<QaScores>,
    /// Lifecycle label for the article itself (e.g. draft/published).
    /// Opaque to the client.
    #[serde(default = "default_status")]
    pub status: String,
    /// Absent is valid and renders as "unknown date".
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_status() -> String {
    "draft".into()
}

// ---------------------------------------------------------------------------
// ArticleListResponse
// ---------------------------------------------------------------------------

/// Paged listing/search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleListResponse {
    pub articles: Vec<Article>,
    /// Full count matching the filter, independent of page/page_size.
    pub total: u64,
    /// 1-indexed page this response covers.
    pub page: u32,
    pub page_size: u32,
}

impl ArticleListResponse {
    /// Last valid page for this result set (`ceil(total / page_size)`).
    /// Zero when the result set is empty.
    pub fn total_pages(&self) -> u32 {
        total_pages(self.total, self.page_size)
    }
}

/// `ceil(total / page_size)`, saturating at zero for an empty result set.
pub fn total_pages(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    total.div_ceil(page_size as u64) as u32
}

// ---------------------------------------------------------------------------
// Processing
// ---------------------------------------------------------------------------

/// Lifecycle state of an asynchronous processing task.
///
/// `processing` is the initial state; `completed` and `failed` are terminal.
/// Transitions are backend-driven — the client only observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Processing,
    Completed,
    Failed,
}

impl TaskStatus {
    /// Whether no further transitions can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Processing => write!(f, "processing"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Outcome of a URL submission, synchronous or via a completed task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResponse {
    pub success: bool,
    /// Present iff an article was created.
    #[serde(default)]
    pub article_id: Option<String>,
    /// All created article ids, for multi-article pipelines.
    #[serde(default)]
    pub article_ids: Vec<String>,
    #[serde(default)]
    pub article_count: u32,
    /// Human-readable outcome description.
    pub message: String,
    #[serde(default)]
    pub qa_scores: Option<QaScores>,
}

/// One asynchronous submission being tracked by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTask {
    pub task_id: String,
    pub status: TaskStatus,
    /// Present only when `status` is `completed`.
    #[serde(default)]
    pub result: Option<ProcessResponse>,
    /// Present only when `status` is `failed`.
    #[serde(default)]
    pub error: Option<String>,
}

/// Immediate response to an asynchronous submission: accepted, not
/// necessarily started.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAccepted {
    pub task_id: String,
    pub status: TaskStatus,
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

/// Backend health probe response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn article_deserializes_with_sparse_fields() {
        // The backend omits optional columns entirely for older rows.
        let json = r#"{
            "id": "abc123",
            "title": "Test Article",
            "body": "Body text.",
            "language": "en",
            "source_url": "https://example.com/page",
            "source_type": "page"
        }"#;

        let article: Article = serde_json::from_str(json).expect("deserialize sparse article");
        assert_eq!(article.id, "abc123");
        assert_eq!(article.status, "draft");
        assert!(article.summary.is_none());
        assert!(article.qa_scores.is_none());
        assert!(article.created_at.is_none());
        assert!(article.tags.is_empty());
    }

    #[test]
    fn article_roundtrip_with_qa_scores() {
        let json = r#"{
            "id": "a1",
            "title": "Full Article",
            "summary": "A summary.",
            "body": "Body.",
            "language": "ar",
            "dialect": "levantine",
            "source_url": "https://example.com/group/1",
            "source_type": "group",
            "tags": ["history"],
            "categories": ["culture"],
            "qa_scores": {
                "readability": 82.0,
                "coherence": 90.5,
                "redundancy": 12.0,
                "neutrality": 77.0,
                "human_likeness": 88.0,
                "passed": true,
                "failed_metrics": []
            },
            "status": "published",
            "created_at": "2025-06-01T12:00:00Z"
        }"#;

        let article: Article = serde_json::from_str(json).expect("deserialize");
        let qa = article.qa_scores.as_ref().expect("qa scores present");
        assert!(qa.passed);
        assert_eq!(qa.metrics()[0], ("readability", 82.0));

        let reencoded = serde_json::to_string(&article).expect("serialize");
        let parsed: Article = serde_json::from_str(&reencoded).expect("reparse");
        assert_eq!(parsed, article);
    }

    #[test]
    fn task_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Processing).expect("serialize"),
            "\"processing\""
        );
        let status: TaskStatus = serde_json::from_str("\"failed\"").expect("deserialize");
        assert_eq!(status, TaskStatus::Failed);
        assert!(status.is_terminal());
        assert!(!TaskStatus::Processing.is_terminal());
    }

    #[test]
    fn processing_task_failed_shape() {
        let json = r#"{
            "task_id": "t-1",
            "status": "failed",
            "result": null,
            "error": "pipeline exploded"
        }"#;
        let task: ProcessingTask = serde_json::from_str(json).expect("deserialize");
        assert_eq!(task.status, TaskStatus::Failed);
        assert!(task.result.is_none());
        assert_eq!(task.error.as_deref(), Some("pipeline exploded"));
    }

    #[test]
    fn total_pages_math() {
        assert_eq!(total_pages(0, 12), 0);
        assert_eq!(total_pages(1, 12), 1);
        assert_eq!(total_pages(12, 12), 1);
        assert_eq!(total_pages(13, 12), 2);
        assert_eq!(total_pages(15, 12), 2);
        assert_eq!(total_pages(24, 12), 2);
        assert_eq!(total_pages(25, 12), 3);
    }

    #[test]
    fn process_response_defaults() {
        let json = r#"{"success": true, "article_id": "abc", "message": "ok"}"#;
        let resp: ProcessResponse = serde_json::from_str(json).expect("deserialize");
        assert!(resp.success);
        assert!(resp.article_ids.is_empty());
        assert_eq!(resp.article_count, 0);
    }
}
