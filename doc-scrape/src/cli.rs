///
/// This module implements the CLI interface for doc-scrape: command parsing,
/// config loading, backend wiring and user-visible output.
///
/// All pipeline logic lives in the [`doc-scrape-core`] crate; this module only
/// glues configuration and concrete backends onto it.
///
/// ## Commands
/// - `scrape`: scrape the given URLs (or the config's `pages`) and print a report.
/// - `invoke`: run a single JSON invocation event and print the response.
///
/// ## How To Use
/// - For command-line users: run the `doc-scrape` binary with `--help`.
/// - For programmatic/integration use: call [`run`] with a constructed [`Cli`].
///
/// [`doc-scrape-core`]: ../../doc-scrape-core/
use crate::backends::build_backends;
use crate::load_config::load_config;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use doc_scrape_core::fetch::HttpFetcher;
use doc_scrape_core::handler::{handle_event, InvocationEvent};
use doc_scrape_core::pipeline::scrape_all;
use std::path::PathBuf;

/// CLI for doc-scrape: convert documentation pages to markdown and track changes.
#[derive(Parser)]
#[clap(
    name = "doc-scrape",
    version,
    about = "Scrape documentation pages into markdown on object storage, tracking content hashes"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scrape pages and store their markdown and hashes
    Scrape {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Page to scrape; repeatable. Defaults to the config's `pages` list.
        #[clap(long = "url")]
        urls: Vec<String>,
    },
    /// Handle one invocation event, e.g. '{"url": "https://..."}'
    Invoke {
        /// Path to the YAML config file
        #[clap(long)]
        config: PathBuf,
        /// Invocation event as JSON
        #[clap(long)]
        event: String,
    },
}

/// Extracted async CLI logic entrypoint for integration tests and main()
pub async fn run(cli: Cli) -> Result<()> {
    tracing::info!("trace_initialised");

    match cli.command {
        Commands::Scrape { config, urls } => {
            let config = load_config(config)?;
            let urls = if urls.is_empty() {
                config.pages.clone()
            } else {
                urls
            };
            if urls.is_empty() {
                anyhow::bail!("No pages to scrape: pass --url or list `pages` in the config");
            }

            tracing::info!(command = "scrape", pages = urls.len(), "Starting scrape");
            let fetcher = HttpFetcher::new(&config.scrape.fetch)
                .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
            let (objects, hashes) = build_backends(&config).await;

            let report = scrape_all(&config.scrape, &fetcher, &objects, &hashes, &urls).await;
            println!("Scrape complete.\nReport:");
            println!("{}", serde_json::to_string_pretty(&report)?);

            if report.is_success() {
                tracing::info!(command = "scrape", "Scrape run succeeded");
                Ok(())
            } else {
                tracing::error!(
                    command = "scrape",
                    failed = report.failures.len(),
                    "Scrape run had failures"
                );
                anyhow::bail!("{} of {} page(s) failed", report.failures.len(), urls.len())
            }
        }
        Commands::Invoke { config, event } => {
            let config = load_config(config)?;
            let event: InvocationEvent =
                serde_json::from_str(&event).context("Invocation event is not valid JSON")?;

            tracing::info!(command = "invoke", url = ?event.url, "Handling invocation event");
            let fetcher = HttpFetcher::new(&config.scrape.fetch)
                .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))?;
            let (objects, hashes) = build_backends(&config).await;

            let response = handle_event(&config.scrape, &fetcher, &objects, &hashes, &event).await;
            println!("{}", serde_json::to_string(&response)?);

            if response.is_success() {
                Ok(())
            } else {
                anyhow::bail!(
                    "Invocation failed with status {}: {}",
                    response.status_code,
                    response.body
                )
            }
        }
    }
}
