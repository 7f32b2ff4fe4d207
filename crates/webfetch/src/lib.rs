//! Shared plumbing for the Firecrawl and Tavily CLI adapters.
//!
//! This crate provides:
//! - API key resolution from the environment or a local `.env` file
//! - JSON payload resolution from flags, arguments, or stdin
//! - A bearer-authenticated JSON request executor
//! - Crawl job id/status extraction and a completion poller

pub mod client;
pub mod credential;
pub mod jobs;
pub mod payload;

// Re-export main types
pub use client::{ApiClient, ApiError};
pub use jobs::{JobPoller, JobState};
pub use payload::PayloadArgs;
