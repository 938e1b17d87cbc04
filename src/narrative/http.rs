use super::BackendError;
use anyhow::{anyhow, Result};
use reqwest::blocking::{Client, RequestBuilder};
use std::time::Duration;
use tracing::debug;

/// Longest provider error message passed through to the user.
const MAX_ERROR_CHARS: usize = 300;

pub fn build_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| anyhow!("failed to create HTTP client: {e}"))
}

pub fn api_key(env_var: &str) -> Result<String, BackendError> {
    match std::env::var(env_var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(BackendError::MissingCredential(env_var.to_string())),
    }
}

/// Sends a JSON request and returns the decoded JSON body of a 2xx reply.
pub fn send_json(
    provider: &'static str,
    request: RequestBuilder,
    timeout_secs: u64,
) -> Result<serde_json::Value, BackendError> {
    let response = request.send().map_err(|e| {
        if e.is_timeout() {
            BackendError::Timeout(timeout_secs)
        } else {
            BackendError::Http(format!("request to {provider} failed: {}", e.without_url()))
        }
    })?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|e| BackendError::Http(format!("reading {provider} response: {e}")))?;
    debug!(provider, status = status.as_u16(), bytes = body.len(), "provider replied");

    if !status.is_success() {
        return Err(BackendError::Status {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    serde_json::from_str(&body).map_err(|e| BackendError::InvalidResponse(provider, e.to_string()))
}

/// The `error.message` field all supported providers use, else a generic note.
/// Raw bodies are never echoed.
pub fn error_message(body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "request rejected".to_string());
    message.chars().take(MAX_ERROR_CHARS).collect()
}
