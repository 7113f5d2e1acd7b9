// src/main.rs
// =============================================================================
// Entry point of the site-harvester CLI.
//
// What happens here:
// 1. Set up logging (tracing, filtered by RUST_LOG, default "info")
// 2. Parse command-line arguments with clap
// 3. Read the seed list; if that fails, log it and stop without crawling
// 4. Wire up cancellation (Ctrl-C and the optional --timeout-secs deadline)
// 5. Run one crawl per seed and print a summary
//
// Crawl errors are logged, never turned into a failing exit code: the
// process always exits with 0.
// =============================================================================

mod cli;
mod crawl;
mod fetch;
mod seeds;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use crawl::{CrawlSummary, Supervisor};
use fetch::HttpFetcher;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!("{:#}", e);
    }
}

// Logs go to stderr so the summary on stdout stays clean (and valid JSON)
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let seeds = seeds::read_seed_list(&cli.seeds)
        .await
        .context("cannot start crawling")?;

    if seeds.is_empty() {
        warn!(seeds = %cli.seeds.display(), "Seed list is empty, nothing to crawl");
        return Ok(());
    }

    let cancel = CancellationToken::new();
    watch_for_shutdown(cancel.clone(), cli.timeout());

    let fetcher = HttpFetcher::new().context("error creating HTTP client")?;
    let supervisor = Supervisor::new(cli.crawl_config(), Arc::new(fetcher));

    let summary = supervisor.run(seeds, cancel).await;

    print_summary(&summary, cli.json)
}

// Fires `cancel` on Ctrl-C, or once `deadline` has passed
fn watch_for_shutdown(cancel: CancellationToken, deadline: Option<std::time::Duration>) {
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping crawls");
            on_signal.cancel();
        }
    });

    if let Some(deadline) = deadline {
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(deadline) => {
                    info!(seconds = deadline.as_secs(), "Deadline reached, stopping crawls");
                    cancel.cancel();
                }
            }
        });
    }
}

fn print_summary(summary: &CrawlSummary, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        print_table(summary);
    }
    Ok(())
}

fn print_table(summary: &CrawlSummary) {
    println!(
        "{:<20} {:<40} {:>10} {:>10} {:>8}",
        "SITE", "OUTPUT", "REQUESTS", "LINKS", "ERRORS"
    );
    println!("{}", "=".repeat(92));

    for site in &summary.sites {
        let mut output = site.output.display().to_string();
        if site.cancelled {
            output.push_str(" (cancelled)");
        }
        println!(
            "{:<20} {:<40} {:>10} {:>10} {:>8}",
            site.site_name, output, site.requests, site.discovered, site.failed_fetches
        );
    }

    println!();
    println!("Sites crawled: {}", summary.sites.len());
    println!("Seeds failed:  {}", summary.failed_seeds);
    println!("Requests:      {}", summary.total_requests());
}
