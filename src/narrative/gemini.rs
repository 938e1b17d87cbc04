//! Google Gemini `generateContent` backend.

use super::{http, BackendError, GenerationSettings, NarrativeBackend};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

const PROVIDER: &str = "google";

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key_env: String,
    settings: GenerationSettings,
}

impl GeminiBackend {
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

    pub fn request_body(&self, system: &str, user: &str) -> Value {
        json!({
            "systemInstruction": {"parts": [{"text": system}]},
            "contents": [{"role": "user", "parts": [{"text": user}]}],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
                "responseMimeType": "application/json",
            },
        })
    }

    /// Concatenated text parts of the first candidate.
    pub fn extract_text(response: &Value) -> Result<String, BackendError> {
        let parts = response
            .get("candidates")
            .and_then(|v| v.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array())
            .ok_or(BackendError::EmptyResponse(PROVIDER))?;

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();
        if text.is_empty() {
            return Err(BackendError::EmptyResponse(PROVIDER));
        }
        Ok(text)
    }
}

impl NarrativeBackend for GeminiBackend {
    fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, BackendError> {
        let key = http::api_key(&self.api_key_env)?;
        // API key travels in a header, never the query string.
        let url = format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        );
        debug!(provider = PROVIDER, model, "sending generateContent");

        let request = self
            .client
            .post(&url)
            .header("x-goog-api-key", key)
            .json(&self.request_body(system, user));
        let response = http::send_json(PROVIDER, request, self.settings.timeout_secs)?;
        Self::extract_text(&response)
    }
}
