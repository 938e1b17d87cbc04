//! Narrative generation: turning the rendered diagnostic prompt into text.

pub mod anthropic;
pub mod error;
pub mod gemini;
pub mod http;
pub mod openai;
pub mod registry;

use crate::{config::Config, prompt::NarrativeRequest};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

pub use anthropic::AnthropicBackend;
pub use error::BackendError;
pub use gemini::GeminiBackend;
pub use openai::OpenAiCompatible;
pub use registry::{ModelEntry, ModelRegistry, DEFAULT_MODEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderFamily {
    OpenAi,
    Anthropic,
    Google,
    Groq,
}

impl ProviderFamily {
    pub const ALL: [ProviderFamily; 4] = [
        ProviderFamily::OpenAi,
        ProviderFamily::Anthropic,
        ProviderFamily::Google,
        ProviderFamily::Groq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProviderFamily::OpenAi => "openai",
            ProviderFamily::Anthropic => "anthropic",
            ProviderFamily::Google => "google",
            ProviderFamily::Groq => "groq",
        }
    }
}

impl fmt::Display for ProviderFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 500,
            timeout_secs: 60,
        }
    }
}

/// Submit a system instruction and a user prompt, receive raw model text.
pub trait NarrativeBackend: Send + Sync {
    fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, BackendError>;
}

/// Routes a model id to its provider's backend.
pub struct Narrator {
    registry: ModelRegistry,
    backends: HashMap<ProviderFamily, Box<dyn NarrativeBackend>>,
}

impl Narrator {
    /// An empty dispatch table; add backends with [`Narrator::with_backend`].
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            backends: HashMap::new(),
        }
    }

    pub fn with_backend(
        mut self,
        family: ProviderFamily,
        backend: impl NarrativeBackend + 'static,
    ) -> Self {
        self.backends.insert(family, Box::new(backend));
        self
    }

    /// HTTP backends for every supported provider, sharing one client.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let n = &cfg.narrative;
        let settings = GenerationSettings {
            temperature: n.temperature,
            max_tokens: n.max_tokens,
            timeout_secs: n.timeout_seconds,
        };
        let client = http::build_client(n.timeout_seconds)?;
        let registry = ModelRegistry::new(&cfg.models, &n.default_model, n.default_provider);

        let narrator = Self::new(registry)
            .with_backend(
                ProviderFamily::OpenAi,
                OpenAiCompatible::new(
                    "openai",
                    client.clone(),
                    &n.openai.base_url,
                    &n.openai.api_key_env,
                    true,
                    settings,
                ),
            )
            .with_backend(
                ProviderFamily::Anthropic,
                AnthropicBackend::new(
                    client.clone(),
                    &n.anthropic.base_url,
                    &n.anthropic.api_key_env,
                    settings,
                ),
            )
            .with_backend(
                ProviderFamily::Google,
                GeminiBackend::new(
                    client.clone(),
                    &n.google.base_url,
                    &n.google.api_key_env,
                    settings,
                ),
            )
            .with_backend(
                ProviderFamily::Groq,
                OpenAiCompatible::new(
                    "groq",
                    client,
                    &n.groq.base_url,
                    &n.groq.api_key_env,
                    false,
                    settings,
                ),
            );
        Ok(narrator)
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn generate(&self, model: &str, request: &NarrativeRequest) -> Result<String, BackendError> {
        let family = self.registry.family_for(model);
        if self.registry.get(model).is_none() {
            warn!(model, "unknown model id; using the {} provider", family);
        }
        let backend = self
            .backends
            .get(&family)
            .ok_or(BackendError::Unavailable(family))?;

        info!(model, provider = %family, "generating diagnosis");
        backend.generate(model, &request.system, &request.user)
    }
}
