//! Crawl job bookkeeping: id extraction, status classification, and
//! completion polling.

use anyhow::{bail, Result};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::client::ApiClient;

/// Default delay between status fetches.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Extract a job identifier from a response body.
///
/// Checks the conventional field locations in order and returns the first
/// non-empty string value.
pub fn extract_job_id(response: &Value) -> Option<String> {
    let data = &response["data"];
    let candidates = [
        &response["id"],
        &response["jobId"],
        &data["id"],
        &data["jobId"],
        &response["crawlId"],
        &data["crawlId"],
    ];

    candidates
        .into_iter()
        .filter_map(|value| value.as_str())
        .map(str::trim)
        .find(|id| !id.is_empty())
        .map(str::to_string)
}

/// Extract and normalize the job status from a status response.
///
/// Looks at `status`, falling back to `data.status` only when the top-level
/// field is missing. Returns `None` when the field is absent, not a string,
/// or empty after trimming.
pub fn extract_status(response: &Value) -> Option<String> {
    let field = match &response["status"] {
        Value::Null => &response["data"]["status"],
        present => present,
    };

    let status = field.as_str()?.trim().to_lowercase();
    (!status.is_empty()).then_some(status)
}

/// Classification of a job status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    /// Terminal: the job finished successfully.
    Succeeded,
    /// Terminal: the job failed or was cancelled.
    Failed,
    /// The job is still making progress.
    Running,
}

impl JobState {
    /// Classify a raw status string, ignoring case and surrounding
    /// whitespace. Unrecognized statuses count as still running.
    pub fn classify(status: &str) -> Self {
        match status.trim().to_lowercase().as_str() {
            "completed" | "complete" | "done" | "success" | "succeeded" | "finished" => {
                Self::Succeeded
            }
            "failed" | "error" | "cancelled" | "canceled" => Self::Failed,
            _ => Self::Running,
        }
    }
}

/// Polls a job's status endpoint until it reaches a terminal state.
pub struct JobPoller<'a> {
    client: &'a ApiClient,
    status_prefix: String,
    interval: Duration,
    cancel: Option<CancellationToken>,
}

impl<'a> JobPoller<'a> {
    /// Create a poller fetching status from `<prefix>/<job-id>`.
    pub fn new(client: &'a ApiClient, status_prefix: impl Into<String>) -> Self {
        Self {
            client,
            status_prefix: status_prefix.into(),
            interval: DEFAULT_POLL_INTERVAL,
            cancel: None,
        }
    }

    /// Override the delay between status fetches.
    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Attach a cancellation signal; polling stops early when it fires.
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Fetch the current status response for a job.
    pub async fn fetch_status(&self, job_id: &str) -> Result<Value> {
        let path = format!("{}/{}", self.status_prefix, urlencoding::encode(job_id));
        Ok(self.client.get(&path).await?)
    }

    /// Poll until the job reaches a terminal state, returning the
    /// last-fetched status response.
    ///
    /// A response with no readable status ends the loop as a success rather
    /// than polling forever. Without a cancellation token the loop has no
    /// bound of its own; the caller's process is the only way out.
    pub async fn wait_for_completion(&self, job_id: &str) -> Result<Value> {
        loop {
            let response = self.fetch_status(job_id).await?;

            let Some(status) = extract_status(&response) else {
                return Ok(response);
            };

            match JobState::classify(&status) {
                JobState::Succeeded => return Ok(response),
                JobState::Failed => bail!("Job {job_id} ended with status \"{status}\""),
                JobState::Running => {
                    tracing::debug!(job_id, status, "job still running");
                    self.sleep_or_cancel(job_id).await?;
                }
            }
        }
    }

    async fn sleep_or_cancel(&self, job_id: &str) -> Result<()> {
        match &self.cancel {
            None => tokio::time::sleep(self.interval).await,
            Some(token) => {
                tokio::select! {
                    () = tokio::time::sleep(self.interval) => {}
                    () = token.cancelled() => bail!("Polling cancelled for job {job_id}"),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_success_statuses() {
        for status in ["completed", "complete", "done", "success", "succeeded", "finished"] {
            assert_eq!(JobState::classify(status), JobState::Succeeded);
        }
    }

    #[test]
    fn test_classify_failure_statuses() {
        for status in ["failed", "error", "cancelled", "canceled"] {
            assert_eq!(JobState::classify(status), JobState::Failed);
        }
    }

    #[test]
    fn test_classify_ignores_case_and_whitespace() {
        assert_eq!(JobState::classify(" COMPLETED "), JobState::Succeeded);
        assert_eq!(JobState::classify("Completed"), JobState::Succeeded);
        assert_eq!(JobState::classify("completed"), JobState::Succeeded);
        assert_eq!(JobState::classify("\tFailed\n"), JobState::Failed);
    }

    #[test]
    fn test_classify_unknown_is_running() {
        assert_eq!(JobState::classify("scraping"), JobState::Running);
        assert_eq!(JobState::classify("queued"), JobState::Running);
    }

    #[test]
    fn test_extract_job_id_order() {
        let response = json!({"id": "top", "jobId": "second", "data": {"id": "nested"}});
        assert_eq!(extract_job_id(&response).as_deref(), Some("top"));

        let response = json!({"jobId": "second", "data": {"id": "nested"}});
        assert_eq!(extract_job_id(&response).as_deref(), Some("second"));

        let response = json!({"data": {"jobId": "nested-job"}});
        assert_eq!(extract_job_id(&response).as_deref(), Some("nested-job"));

        let response = json!({"crawlId": "crawl-7"});
        assert_eq!(extract_job_id(&response).as_deref(), Some("crawl-7"));
    }

    #[test]
    fn test_extract_job_id_skips_non_strings_and_blanks() {
        let response = json!({"id": 42, "jobId": "  ", "data": {"id": "real"}});
        assert_eq!(extract_job_id(&response).as_deref(), Some("real"));

        assert_eq!(extract_job_id(&json!({"success": true})), None);
    }

    #[test]
    fn test_extract_status_normalizes() {
        assert_eq!(
            extract_status(&json!({"status": " Running "})).as_deref(),
            Some("running")
        );
        assert_eq!(
            extract_status(&json!({"data": {"status": "COMPLETED"}})).as_deref(),
            Some("completed")
        );
    }

    #[test]
    fn test_extract_status_absent_or_invalid() {
        assert_eq!(extract_status(&json!({"success": true})), None);
        assert_eq!(extract_status(&json!({"status": "   "})), None);
        // A non-string status does not fall back to data.status
        assert_eq!(
            extract_status(&json!({"status": 7, "data": {"status": "running"}})),
            None
        );
    }
}
