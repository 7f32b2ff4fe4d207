//! Tavily CLI adapter.
//!
//! Forwards JSON job requests to the Tavily API and prints the JSON
//! response.

use anyhow::{anyhow, Result};
use clap::error::ErrorKind;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use webfetch::{credential, ApiClient, PayloadArgs};

const API_BASE: &str = "https://api.tavily.com";
const API_KEY_VAR: &str = "TAVILY_API_KEY";
const USER_AGENT: &str = concat!("tavily-cli/", env!("CARGO_PKG_VERSION"));

/// Tavily CLI - forward search and extraction jobs to the Tavily API.
#[derive(Parser)]
#[command(name = "tavily")]
#[command(about = "CLI adapter for the Tavily web search API")]
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
    /// Run a web search
    Search(PayloadArgs),

    /// Extract content from URLs
    Extract(PayloadArgs),

    /// Crawl a site
    Crawl(PayloadArgs),

    /// Map the URLs of a site
    Map(PayloadArgs),

    /// Run a research job
    Research(PayloadArgs),
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
            anyhow!("Missing Tavily API key: set {API_KEY_VAR} or add it to a .env file next to the binary")
        })?;
    let client = ApiClient::new(API_BASE, api_key, USER_AGENT)?;

    let (endpoint, payload) = match &cli.command {
        Commands::Search(payload) => ("/search", payload),
        Commands::Extract(payload) => ("/extract", payload),
        Commands::Crawl(payload) => ("/crawl", payload),
        Commands::Map(payload) => ("/map", payload),
        Commands::Research(payload) => ("/research", payload),
    };

    let result = client.post(endpoint, &payload.resolve()?).await?;
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
        EnvFilter::new("webfetch=debug,tavily=debug,info")
    } else {
        EnvFilter::new("webfetch=info,warn")
    };

    // Diagnostics go to stderr; stdout carries only the JSON response.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
