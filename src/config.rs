use crate::narrative::ProviderFamily;
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub probes: Probes,
    #[serde(default)]
    pub narrative: Narrative,
    #[serde(default)]
    pub models: Vec<ModelSpec>,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub output: Output,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config: {}", path.display()))?;
        let cfg: Config = toml::from_str(&raw).with_context(|| "parsing TOML")?;
        Ok(cfg)
    }

    /// Loads `path` when one was resolved; otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Target {
    pub default_target: String,
}
impl Default for Target {
    fn default() -> Self {
        Self {
            default_target: "8.8.8.8".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Probes {
    #[serde(default)]
    pub ping: Ping,
    #[serde(default)]
    pub dns: Dns,
    #[serde(default)]
    pub traceroute: Traceroute,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Ping {
    pub executable: String,
    pub count: u32,
    pub timeout_seconds: u64,
}
impl Default for Ping {
    fn default() -> Self {
        Self {
            executable: "ping".into(),
            count: 4,
            timeout_seconds: 15,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Dns {
    pub executable: String,
    pub timeout_seconds: u64,
}
impl Default for Dns {
    fn default() -> Self {
        Self {
            executable: "nslookup".into(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Traceroute {
    pub executable: String,
    pub max_hops: u32,
    pub timeout_seconds: u64,
}
impl Default for Traceroute {
    fn default() -> Self {
        Self {
            executable: "traceroute".into(),
            max_hops: 30,
            timeout_seconds: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Narrative {
    pub default_model: String,
    pub default_provider: ProviderFamily,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
    #[serde(deserialize_with = "openai_provider")]
    pub openai: Provider,
    #[serde(deserialize_with = "anthropic_provider")]
    pub anthropic: Provider,
    #[serde(deserialize_with = "google_provider")]
    pub google: Provider,
    #[serde(deserialize_with = "groq_provider")]
    pub groq: Provider,
}
impl Default for Narrative {
    fn default() -> Self {
        Self {
            default_model: "gpt-4o-mini".into(),
            default_provider: ProviderFamily::OpenAi,
            temperature: 0.3,
            max_tokens: 500,
            timeout_seconds: 60,
            openai: Provider::openai(),
            anthropic: Provider::anthropic(),
            google: Provider::google(),
            groq: Provider::groq(),
        }
    }
}

impl Narrative {
    pub fn provider(&self, family: ProviderFamily) -> &Provider {
        match family {
            ProviderFamily::OpenAi => &self.openai,
            ProviderFamily::Anthropic => &self.anthropic,
            ProviderFamily::Google => &self.google,
            ProviderFamily::Groq => &self.groq,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub base_url: String,
    pub api_key_env: String,
}
impl Provider {
    fn openai() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key_env: "OPENAI_API_KEY".into(),
        }
    }

    fn anthropic() -> Self {
        Self {
            base_url: "https://api.anthropic.com".into(),
            api_key_env: "ANTHROPIC_API_KEY".into(),
        }
    }

    fn google() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            api_key_env: "GOOGLE_API_KEY".into(),
        }
    }

    fn groq() -> Self {
        Self {
            base_url: "https://api.groq.com/openai/v1".into(),
            api_key_env: "GROQ_API_KEY".into(),
        }
    }
}

/// A provider table as written; absent keys keep that provider's built-in value.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderOverride {
    base_url: Option<String>,
    api_key_env: Option<String>,
}

impl ProviderOverride {
    fn over(self, builtin: Provider) -> Provider {
        Provider {
            base_url: self.base_url.unwrap_or(builtin.base_url),
            api_key_env: self.api_key_env.unwrap_or(builtin.api_key_env),
        }
    }
}

fn openai_provider<'de, D: Deserializer<'de>>(d: D) -> Result<Provider, D::Error> {
    Ok(ProviderOverride::deserialize(d)?.over(Provider::openai()))
}

fn anthropic_provider<'de, D: Deserializer<'de>>(d: D) -> Result<Provider, D::Error> {
    Ok(ProviderOverride::deserialize(d)?.over(Provider::anthropic()))
}

fn google_provider<'de, D: Deserializer<'de>>(d: D) -> Result<Provider, D::Error> {
    Ok(ProviderOverride::deserialize(d)?.over(Provider::google()))
}

fn groq_provider<'de, D: Deserializer<'de>>(d: D) -> Result<Provider, D::Error> {
    Ok(ProviderOverride::deserialize(d)?.over(Provider::groq()))
}

/// Extra `[[models]]` entries; these extend or replace the built-in registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelSpec {
    pub id: String,
    pub label: String,
    pub provider: ProviderFamily,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
    pub json: bool,
    pub write_to_file: bool,
    pub file_path: String,
}
impl Default for Logging {
    fn default() -> Self {
        Self {
            level: "info".into(),
            json: false,
            write_to_file: false,
            file_path: "netdiag.log".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Output {
    pub format: OutputFormat,
    pub include_probes: bool,
}
impl Default for Output {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            include_probes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}
