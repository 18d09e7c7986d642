//! View-model state containers for the Enrich client.
//!
//! Each view-model owns a snapshot of screen state behind a
//! `tokio::sync::watch` channel: consumers (TUI, CLI, tests) read
//! [`snapshot`](list::ArticleListModel::snapshot) on their own cadence or
//! [`subscribe`](list::ArticleListModel::subscribe) for change notification,
//! with no dependency on a rendering runtime. View-models catch every
//! client error at the boundary and convert it to displayable state —
//! errors never escape, and a failed fetch keeps the previous good data.

pub mod detail;
pub mod list;
pub mod poll;
pub mod present;
pub mod submit;

pub use detail::{ArticleDetailModel, DetailError, DetailState};
pub use list::{ArticleListModel, ListState};
pub use poll::{PollOutcome, PollPolicy, TaskPoller, poll_until_terminal};
pub use present::{
    SUMMARY_BUDGET, ScoreBand, display_date, display_language, language_label, score_band,
    truncate_summary,
};
pub use submit::{SubmitModel, SubmitState};
