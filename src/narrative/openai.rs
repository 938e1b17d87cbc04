//! OpenAI-style `/chat/completions` backend. Also serves Groq, which speaks
//! the same protocol but has no JSON response mode.

use super::{http, BackendError, GenerationSettings, NarrativeBackend};
use reqwest::blocking::Client;
use serde_json::{json, Value};
use tracing::debug;

pub struct OpenAiCompatible {
    provider: &'static str,
    client: Client,
    base_url: String,
    api_key_env: String,
    json_mode: bool,
    settings: GenerationSettings,
}

impl OpenAiCompatible {
    pub fn new(
        provider: &'static str,
        client: Client,
        base_url: impl Into<String>,
        api_key_env: impl Into<String>,
        json_mode: bool,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            provider,
            client,
            base_url: base_url.into(),
            api_key_env: api_key_env.into(),
            json_mode,
            settings,
        }
    }

    pub fn request_body(&self, model: &str, system: &str, user: &str) -> Value {
        let mut body = json!({
            "model": model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });
        if self.json_mode {
            body["response_format"] = json!({"type": "json_object"});
        }
        body
    }

    /// `choices[0].message.content`.
    pub fn extract_text(provider: &'static str, response: &Value) -> Result<String, BackendError> {
        response
            .get("choices")
            .and_then(|v| v.get(0))
            .and_then(|v| v.get("message"))
            .and_then(|v| v.get("content"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .ok_or(BackendError::EmptyResponse(provider))
    }
}

impl NarrativeBackend for OpenAiCompatible {
    fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, BackendError> {
        let key = http::api_key(&self.api_key_env)?;
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!(provider = self.provider, model, "sending chat completion");

        let request = self
            .client
            .post(&url)
            .bearer_auth(key)
            .json(&self.request_body(model, system, user));
        let response = http::send_json(self.provider, request, self.settings.timeout_secs)?;
        Self::extract_text(self.provider, &response)
    }
}
