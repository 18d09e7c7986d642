//! CLI command definitions, routing, and tracing setup.

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use enrich_client::{ApiClient, ListQuery};
use enrich_shared::{
    AppConfig, Article, ArticleListResponse, EnrichError, ProcessResponse, QaScores, init_config,
    load_config,
};
use enrich_state::{
    PollOutcome, PollPolicy, display_date, display_language, poll_until_terminal, score_band,
    truncate_summary,
};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Enrich — turn source URLs into encyclopedic articles.
#[derive(Parser)]
#[command(
    name = "enrich",
    version,
    about = "Submit source URLs for article generation and browse the results.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend base URL (overrides the config file).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Submit a source URL and wait for the generated article.
    Submit {
        /// Source URL to process (a page or group address).
        url: String,

        /// Submit asynchronously and return the task id immediately.
        #[arg(long)]
        detach: bool,
    },

    /// List articles, paged and optionally filtered.
    List {
        /// Page to fetch (1-indexed).
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Articles per page (defaults to the configured page size).
        #[arg(long)]
        page_size: Option<u32>,

        /// Filter by language code (e.g. en, ar).
        #[arg(short, long)]
        language: Option<String>,

        /// Filter by category label.
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by article status (e.g. draft, published).
        #[arg(short, long)]
        status: Option<String>,
    },

    /// Search articles by text query.
    Search {
        /// Search query.
        query: String,

        /// Page to fetch (1-indexed).
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Articles per page (defaults to the configured page size).
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show a single article with its QA scores.
    Show {
        /// Article id.
        id: String,
    },

    /// Delete an article.
    Delete {
        /// Article id.
        id: String,
    },

    /// Check the status of an asynchronous processing task.
    Status {
        /// Task id returned by `submit --detach`.
        task_id: String,

        /// Keep polling until the task reaches a terminal state.
        #[arg(long)]
        watch: bool,
    },

    /// Probe backend health.
    Health,

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "enrich=info",
        1 => "enrich=debug",
        _ => "enrich=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let mut config = load_config()?;
    if let Some(api_url) = &cli.api_url {
        config.api.base_url = api_url.clone();
    }

    match cli.command {
        Command::Submit { url, detach } => cmd_submit(&config, &url, detach).await,
        Command::List {
            page,
            page_size,
            language,
            category,
            status,
        } => cmd_list(&config, page, page_size, language, category, status).await,
        Command::Search {
            query,
            page,
            page_size,
        } => cmd_search(&config, &query, page, page_size).await,
        Command::Show { id } => cmd_show(&config, &id).await,
        Command::Delete { id } => cmd_delete(&config, &id).await,
        Command::Status { task_id, watch } => cmd_status(&config, &task_id, watch).await,
        Command::Health => cmd_health(&config).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show(&config).await,
        },
    }
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_submit(config: &AppConfig, url: &str, detach: bool) -> Result<()> {
    let client = ApiClient::new(&config.api)?;

    if detach {
        let accepted = client.process_url_async(url).await?;
        println!("Task accepted: {}", accepted.task_id);
        println!("Check it with: enrich status {} --watch", accepted.task_id);
        return Ok(());
    }

    info!(url, "submitting URL for processing");
    let spinner = spinner("Processing URL…");
    let outcome = client.process_url(url).await;
    spinner.finish_and_clear();

    print_outcome(&outcome?);
    Ok(())
}

async fn cmd_list(
    config: &AppConfig,
    page: u32,
    page_size: Option<u32>,
    language: Option<String>,
    category: Option<String>,
    status: Option<String>,
) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    let query = ListQuery {
        page,
        page_size: page_size.unwrap_or(config.ui.page_size),
        language,
        category,
        status,
    };

    let listing = client.list_articles(&query).await?;
    print_listing(&listing);
    Ok(())
}

async fn cmd_search(
    config: &AppConfig,
    query: &str,
    page: u32,
    page_size: Option<u32>,
) -> Result<()> {
    if query.trim().is_empty() {
        return Err(eyre!("search query must not be empty"));
    }

    let client = ApiClient::new(&config.api)?;
    let listing = client
        .search_articles(query, page, page_size.unwrap_or(config.ui.page_size))
        .await?;
    print_listing(&listing);
    Ok(())
}

async fn cmd_show(config: &AppConfig, id: &str) -> Result<()> {
    let client = ApiClient::new(&config.api)?;

    let article = match client.get_article(id).await {
        Ok(article) => article,
        Err(e) if e.is_not_found() => {
            println!("Article Not Found: no article with id '{id}'.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    print_article(&article);
    Ok(())
}

async fn cmd_delete(config: &AppConfig, id: &str) -> Result<()> {
    let client = ApiClient::new(&config.api)?;

    // Delete is idempotent from the caller's side: a repeat delete of an
    // already-deleted id is success, not a failure.
    match client.delete_article(id).await {
        Ok(()) => println!("Deleted article {id}."),
        Err(EnrichError::NotFound(_)) => println!("Article {id} was already deleted."),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn cmd_status(config: &AppConfig, task_id: &str, watch: bool) -> Result<()> {
    let client = ApiClient::new(&config.api)?;

    if !watch {
        let task = client.task_status(task_id).await?;
        println!("Task:   {}", task.task_id);
        println!("Status: {}", task.status);
        if let Some(result) = &task.result {
            println!();
            print_outcome(result);
        }
        if let Some(error) = &task.error {
            println!("Error:  {error}");
        }
        return Ok(());
    }

    let policy = PollPolicy::from(&config.polling);
    let spinner = spinner(&format!("Waiting for task {task_id}…"));
    let outcome = poll_until_terminal(&client, task_id, &policy).await;
    spinner.finish_and_clear();

    match outcome? {
        PollOutcome::Completed(result) => print_outcome(&result),
        PollOutcome::Failed(error) => return Err(eyre!("task {task_id} failed: {error}")),
        PollOutcome::TimedOut(task) => {
            println!(
                "Task {} is still processing after {}s — it keeps running on the backend.",
                task.task_id, config.polling.timeout_secs
            );
            println!("Check again with: enrich status {} --watch", task.task_id);
        }
    }
    Ok(())
}

async fn cmd_health(config: &AppConfig) -> Result<()> {
    let client = ApiClient::new(&config.api)?;
    let health = client.health().await?;
    println!("Backend:  {}", client.base_url());
    println!("Status:   {}", health.status);
    println!("Version:  {}", health.version);
    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

/// Spinner for long-running waits.
fn spinner(msg: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(msg.to_string());
    spinner
}

fn print_outcome(outcome: &ProcessResponse) {
    println!();
    if outcome.success {
        println!("  Article generated successfully!");
    } else {
        println!("  Processing finished without an article.");
    }
    println!("  Message: {}", outcome.message);
    if let Some(id) = &outcome.article_id {
        println!("  Article: {id}");
    }
    if outcome.article_ids.len() > 1 {
        println!("  All ids: {}", outcome.article_ids.join(", "));
    }
    if let Some(qa) = &outcome.qa_scores {
        println!();
        print_qa_scores(qa);
    }
    println!();
    if outcome.success {
        println!("  View it with: enrich show {}", outcome.article_id.as_deref().unwrap_or("<id>"));
        println!();
    }
}

fn print_listing(listing: &ArticleListResponse) {
    let last_page = listing.total_pages();
    println!(
        "{} article(s) — page {} of {}",
        listing.total,
        listing.page,
        last_page.max(1)
    );
    println!();

    if listing.articles.is_empty() {
        println!("  (no articles on this page)");
        return;
    }

    for article in &listing.articles {
        let qa = match &article.qa_scores {
            Some(qa) if qa.passed => "QA pass",
            Some(_) => "QA fail",
            None => "QA –",
        };
        println!(
            "  {:<14} {:<44} {:<20} {:<8} {}",
            article.id,
            clip(&article.title, 42),
            display_language(article),
            qa,
            display_date(article.created_at.as_ref()),
        );
        if let Some(summary) = &article.summary {
            println!("    {}", truncate_summary(summary));
        }
    }

    println!();
    if listing.page < last_page {
        println!("Next page: --page {}", listing.page + 1);
    }
}

fn print_article(article: &Article) {
    println!();
    println!("  {}", article.title);
    println!("  {}", "=".repeat(article.title.chars().count().min(72)));
    println!();
    println!("  Id:        {}", article.id);
    println!("  Status:    {}", article.status);
    println!("  Language:  {}", display_language(article));
    println!("  Source:    {} ({})", article.source_url, article.source_type);
    println!("  Created:   {}", display_date(article.created_at.as_ref()));
    println!("  Updated:   {}", display_date(article.updated_at.as_ref()));
    if !article.tags.is_empty() {
        println!("  Tags:      {}", article.tags.join(", "));
    }
    if !article.categories.is_empty() {
        println!("  Categories: {}", article.categories.join(", "));
    }

    if let Some(qa) = &article.qa_scores {
        println!();
        print_qa_scores(qa);
    }

    if let Some(summary) = &article.summary {
        println!();
        println!("  {summary}");
    }

    println!();
    println!("{}", article.body);
}

fn print_qa_scores(qa: &QaScores) {
    println!("  QA scores ({}):", if qa.passed { "passed" } else { "failed" });
    for (name, value) in qa.metrics() {
        println!(
            "    {:<16} {:>5.1}  [{}]",
            name,
            value,
            score_band(value).label()
        );
    }
    if !qa.failed_metrics.is_empty() {
        println!("    failed metrics: {}", qa.failed_metrics.join(", "));
    }
}

/// Clip a string to `max` characters for table alignment.
fn clip(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let mut clipped: String = text.chars().take(max.saturating_sub(1)).collect();
        clipped.push('…');
        clipped
    }
}
