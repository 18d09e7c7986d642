//! Enrich TUI — interactive terminal interface for the article pipeline.
//!
//! Provides screens for submitting source URLs, browsing/searching the
//! generated articles, and inspecting one article with its QA scores,
//! built with `ratatui` + `crossterm`.

mod app;
mod screens;
mod widgets;

use color_eyre::eyre::Result;

fn main() -> Result<()> {
    color_eyre::install()?;
    app::run()
}
