//! Anthropic Messages API backend.
//!
//! The API has no JSON response mode, so the assistant turn is primed with
//! `{` and that brace is put back in front of the returned text.

use super::{http, BackendError, GenerationSettings, NarrativeBackend};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";
const PRIMER: &str = "{";

pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key_env: String,
    settings: GenerationSettings,
}

impl AnthropicBackend {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        api_key_env: impl Into<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key_env: api_key_env.into(),
            settings,
        }
    }

    pub fn request_body(&self, model: &str, system: &str, user: &str) -> Value {
        json!({
            "model": model,
            "system": system,
            "messages": [
                {"role": "user", "content": user},
                {"role": "assistant", "content": PRIMER},
            ],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
        })
    }

    /// Text of the first `text` content block, with the primer restored.
    pub fn extract_text(response: &Value) -> Result<String, BackendError> {
        let text = response
            .get("content")
            .and_then(|v| v.as_array())
            .and_then(|blocks| {
                blocks
                    .iter()
                    .find(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
            })
            .and_then(|b| b.get("text"))
            .and_then(|t| t.as_str())
            .ok_or(BackendError::EmptyResponse(PROVIDER))?;
        Ok(format!("{PRIMER}{text}"))
    }
}

impl NarrativeBackend for AnthropicBackend {
    fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, BackendError> {
        let key = http::api_key(&self.api_key_env)?;
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));
        debug!(provider = PROVIDER, model, "sending message");

        let request = self
            .client
            .post(&url)
            .header("x-api-key", key)
            .header("anthropic-version", API_VERSION)
            .json(&self.request_body(model, system, user));
        let response = http::send_json(PROVIDER, request, self.settings.timeout_secs)?;
        Self::extract_text(&response)
    }
}
