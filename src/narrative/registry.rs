use super::ProviderFamily;
use crate::config::ModelSpec;
use serde::Serialize;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub label: String,
    pub family: ProviderFamily,
}

impl ModelEntry {
    fn new(id: &str, label: &str, family: ProviderFamily) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            family,
        }
    }
}

/// Known model ids, their display labels and provider families.
///
/// Built once at startup and only read afterwards.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    default_model: String,
    default_family: ProviderFamily,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self {
            entries: vec![
                ModelEntry::new("gpt-4o-mini", "gpt-4o-mini (OpenAI, default)", ProviderFamily::OpenAi),
                ModelEntry::new("gpt-4o", "gpt-4o (OpenAI)", ProviderFamily::OpenAi),
                ModelEntry::new(
                    "claude-haiku-4-5-20251001",
                    "claude-haiku-4-5 (Anthropic)",
                    ProviderFamily::Anthropic,
                ),
                ModelEntry::new("gemini-2.5-flash", "gemini-2.5-flash (Google)", ProviderFamily::Google),
                ModelEntry::new(
                    "llama-3.3-70b-versatile",
                    "llama-3.3-70b (Groq)",
                    ProviderFamily::Groq,
                ),
            ],
            default_model: DEFAULT_MODEL.into(),
            default_family: ProviderFamily::OpenAi,
        }
    }
}

impl ModelRegistry {
    /// Built-in models plus `extra`; an extra entry with a known id replaces it.
    pub fn new(extra: &[ModelSpec], default_model: &str, default_family: ProviderFamily) -> Self {
        let mut registry = Self {
            default_model: default_model.to_string(),
            default_family,
            ..Self::default()
        };
        for spec in extra {
            let entry = ModelEntry {
                id: spec.id.clone(),
                label: spec.label.clone(),
                family: spec.provider,
            };
            match registry.entries.iter_mut().find(|e| e.id == spec.id) {
                Some(existing) => *existing = entry,
                None => registry.entries.push(entry),
            }
        }
        registry
    }

    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    pub fn get(&self, model: &str) -> Option<&ModelEntry> {
        self.entries.iter().find(|e| e.id == model)
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    pub fn default_family(&self) -> ProviderFamily {
        self.default_family
    }

    /// Unknown ids fall back to the default family instead of failing.
    pub fn family_for(&self, model: &str) -> ProviderFamily {
        self.get(model)
            .map(|e| e.family)
            .unwrap_or(self.default_family)
    }
}
