//! Completion signal for the hosting workflow

use serde::Serialize;
use tracing::info;

use crate::config::WorkflowConfig;
use crate::{Error, Result};

#[derive(Debug, Serialize)]
struct FinishRequest<'a> {
    task_id: &'a str,
}

/// Join the base URL and finish endpoint with exactly one slash.
#[must_use]
pub fn completion_url(config: &WorkflowConfig) -> String {
    format!(
        "{}/{}",
        config.api_base_url.trim_end_matches('/'),
        config.finish_endpoint.trim_start_matches('/')
    )
}

/// Request body announcing that `config.task_id` is finished.
///
/// # Errors
///
/// Returns error if serialization fails.
pub fn completion_body(config: &WorkflowConfig) -> Result<serde_json::Value> {
    Ok(serde_json::to_value(FinishRequest {
        task_id: &config.task_id,
    })?)
}

/// POST the completion signal.
///
/// # Errors
///
/// Returns [`Error::Notify`] if the request fails or is rejected.
pub fn notify_completion(config: &WorkflowConfig) -> Result<()> {
    let url = completion_url(config);
    let body = completion_body(config)?;

    let response = reqwest::blocking::Client::new()
        .post(&url)
        .header("Authorization", format!("Bearer {}", config.auth_token))
        .json(&body)
        .send()
        .map_err(|e| Error::Notify(format!("POST {url} failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Notify(format!("POST {url} returned {status}")));
    }
    info!(task = %config.task_id, "Signalled task completion");
    Ok(())
}
