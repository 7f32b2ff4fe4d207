//! Firecrawl CLI adapter.
//!
//! Forwards JSON job requests to the Firecrawl API and prints the JSON
//! response. `crawl --wait` and `crawl-status --wait` poll the crawl job
//! until it reaches a terminal state.

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::io::IsTerminal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webfetch::jobs::{self, JobPoller};
use webfetch::{credential, ApiClient, PayloadArgs};

const API_BASE: &str = "https://api.firecrawl.dev";
const API_KEY_VAR: &str = "FIRECRAWL_API_KEY";
const USER_AGENT: &str = concat!("firecrawl-cli/", env!("CARGO_PKG_VERSION"));
const CRAWL_STATUS_PREFIX: &str = "/v2/crawl";

/// Firecrawl CLI - forward scrape and crawl jobs to the Firecrawl API.
#[derive(Parser)]
#[command(name = "firecrawl")]
#[command(about = "CLI adapter for the Firecrawl web scraping API")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a single URL
    Scrape(PayloadArgs),

    /// Start an asynchronous crawl job
    Crawl {
        #[command(flatten)]
        payload: PayloadArgs,

        /// Wait for the crawl job to complete
        #[arg(long)]
        wait: bool,
    },

    /// Map the URLs of a site
    Map(PayloadArgs),

    /// Scrape a batch of URLs
    BatchScrape(PayloadArgs),

    /// Check the status of a crawl job
    CrawlStatus {
        /// Crawl job id
        #[arg(long)]
        id: Option<String>,

        #[command(flatten)]
        payload: PayloadArgs,

        /// Wait for the crawl job to complete
        #[arg(long)]
        wait: bool,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = parse_cli();
    init_tracing(cli.verbose);

    let api_key = credential::resolve(API_KEY_VAR, credential::default_key_file().as_deref())
        .ok_or_else(|| {
            anyhow!("Missing Firecrawl API key: set {API_KEY_VAR} or add it to a .env file next to the binary")
        })?;
    let client = ApiClient::new(API_BASE, api_key, USER_AGENT)?;

    let result = match cli.command {
        Commands::Scrape(payload) => client.post("/v2/scrape", &payload.resolve()?).await?,
        Commands::Map(payload) => client.post("/v2/map", &payload.resolve()?).await?,
        Commands::BatchScrape(payload) => {
            client.post("/v2/batch-scrape", &payload.resolve()?).await?
        }
        Commands::Crawl { payload, wait } => run_crawl(&client, &payload, wait).await?,
        Commands::CrawlStatus { id, payload, wait } => {
            run_crawl_status(&client, id, &payload, wait).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Parse arguments, keeping the historical exit codes: help prints to
/// stdout and exits 0, any usage problem prints to stderr and exits 1.
fn parse_cli() -> Cli {
    Cli::try_parse().unwrap_or_else(|err| {
        let code = match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
            _ => 1,
        };
        let _ = err.print();
        std::process::exit(code);
    })
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("webfetch=debug,firecrawl=debug,info")
    } else {
        EnvFilter::new("webfetch=info,warn")
    };

    // Diagnostics go to stderr; stdout carries only the JSON response.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

async fn run_crawl(client: &ApiClient, payload: &PayloadArgs, wait: bool) -> Result<Value> {
    let started = client.post("/v2/crawl", &payload.resolve()?).await?;
    if !wait {
        return Ok(started);
    }

    let job_id = jobs::extract_job_id(&started)
        .ok_or_else(|| anyhow!("Missing crawl job id in response (expected id/jobId)"))?;
    tracing::info!(job_id, "crawl started, waiting for completion");

    JobPoller::new(client, CRAWL_STATUS_PREFIX)
        .wait_for_completion(&job_id)
        .await
}

async fn run_crawl_status(
    client: &ApiClient,
    id: Option<String>,
    payload: &PayloadArgs,
    wait: bool,
) -> Result<Value> {
    let job_id = resolve_crawl_id(id, payload)?;
    let poller = JobPoller::new(client, CRAWL_STATUS_PREFIX);

    if wait {
        poller.wait_for_completion(&job_id).await
    } else {
        poller.fetch_status(&job_id).await
    }
}

/// Work out which crawl job the caller means: an explicit `--id`, a bare
/// positional id, or a JSON payload carrying one of the id fields.
fn resolve_crawl_id(id: Option<String>, payload: &PayloadArgs) -> Result<String> {
    if let Some(id) = id {
        return Ok(id);
    }

    if let Some(arg) = payload.json.as_deref() {
        if !arg.trim().starts_with('{') {
            return Ok(arg.to_string());
        }
    }

    if payload.has_json_source(std::io::stdin().is_terminal()) {
        let value = payload.resolve()?;
        if let Some(id) = jobs::extract_job_id(&value) {
            return Ok(id);
        }
    }

    Err(anyhow!(
        "Missing crawl id (pass <crawl-id>, --id <crawl-id>, or a JSON payload containing id/jobId)"
    ))
}
