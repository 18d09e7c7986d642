//! Shared types, error model, and configuration for the Enrich client.
//!
//! This crate is the foundation depended on by all other Enrich crates.
//! It provides:
//! - [`EnrichError`] — the unified error type
//! - Domain types ([`Article`], [`QaScores`], [`ProcessingTask`], [`ProcessResponse`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiSettings, AppConfig, PollingSettings, UiSettings, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{EnrichError, Result};
pub use types::{
    Article, ArticleListResponse, Health, ProcessResponse, ProcessingTask, QaScores, SourceType,
    TaskAccepted, TaskStatus, total_pages,
};
