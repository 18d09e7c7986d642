//! Pure presentation helpers: language labels, QA score banding, summary
//! truncation, and date display. No side effects, fixed constants.

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use enrich_shared::Article;

/// Character budget for summaries on list cards.
pub const SUMMARY_BUDGET: usize = 150;

/// Score at or above which a metric renders as "good".
pub const GOOD_THRESHOLD: f64 = 75.0;

/// Score at or above which a metric renders as "warning".
pub const WARNING_THRESHOLD: f64 = 50.0;

// ---------------------------------------------------------------------------
// Score banding
// ---------------------------------------------------------------------------

/// Display band for a 0–100 QA score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    Good,
    Warning,
    Poor,
}

impl ScoreBand {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Warning => "warning",
            Self::Poor => "poor",
        }
    }
}

/// Band a score: >= 75 good, >= 50 warning, else poor.
pub fn score_band(score: f64) -> ScoreBand {
    if score >= GOOD_THRESHOLD {
        ScoreBand::Good
    } else if score >= WARNING_THRESHOLD {
        ScoreBand::Warning
    } else {
        ScoreBand::Poor
    }
}

// ---------------------------------------------------------------------------
// Language labels
// ---------------------------------------------------------------------------

/// Display label for a language code. Unmapped codes fall back to the raw
/// code rather than failing.
pub fn language_label(code: &str) -> &str {
    match code {
        "en" => "English",
        "ar" => "Arabic",
        "fr" => "French",
        "es" => "Spanish",
        "de" => "German",
        "pt" => "Portuguese",
        "it" => "Italian",
        "he" => "Hebrew",
        other => other,
    }
}

/// Full language display for an article, including the dialect refinement
/// when present (e.g. "Arabic (levantine)").
pub fn display_language(article: &Article) -> String {
    let label = language_label(&article.language);
    match &article.dialect {
        Some(dialect) => format!("{label} ({dialect})"),
        None => label.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Summary truncation
// ---------------------------------------------------------------------------

/// Truncate a summary to [`SUMMARY_BUDGET`] characters for list cards.
///
/// The ellipsis is appended only when the source text exceeds the budget;
/// the original text is never mutated. Counts characters, not bytes, so
/// multi-byte text truncates cleanly.
pub fn truncate_summary(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= SUMMARY_BUDGET {
        return Cow::Borrowed(text);
    }

    let mut truncated: String = text.chars().take(SUMMARY_BUDGET).collect();
    truncated.push('…');
    Cow::Owned(truncated)
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

/// Human display for an optional timestamp; absent renders as
/// "unknown date".
pub fn display_date(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(t) => t.format("%Y-%m-%d").to_string(),
        None => "unknown date".to_string(),
    }
}
