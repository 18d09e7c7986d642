//! Enrich CLI — submit source URLs and browse the generated articles.
//!
//! Talks to the Enrich backend REST API: URL submission (sync or
//! detached), task status polling, and paged listing/search of articles
//! with their QA scores.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
