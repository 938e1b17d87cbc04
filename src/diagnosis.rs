use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub const UNPARSED_ROOT_CAUSE: &str = "Could not parse response from model.";
pub const UNPARSED_RECOMMENDATION: &str = "Please try again or use a different model.";

/// Final narrative output of one diagnosis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Diagnosis {
    pub summary: String,
    pub root_cause: String,
    pub recommendations: Vec<String>,
}

impl Diagnosis {
    /// Stand-in used when the model's reply is not a JSON object.
    pub fn unparsed(raw: &str) -> Self {
        Self {
            summary: raw.to_string(),
            root_cause: UNPARSED_ROOT_CAUSE.to_string(),
            recommendations: vec![UNPARSED_RECOMMENDATION.to_string()],
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.root_cause == UNPARSED_ROOT_CAUSE
    }
}

/// Turns raw model text into a [`Diagnosis`]. Never fails.
///
/// Tries the text as-is, then with a ```` ```json ```` fence removed, then
/// gives up and wraps the raw text with [`Diagnosis::unparsed`].
pub fn parse_diagnosis(raw: &str) -> Diagnosis {
    if let Ok(d) = from_json_object(raw) {
        return d;
    }

    let stripped = strip_fence(raw);
    match from_json_object(stripped) {
        Ok(d) => {
            debug!("parsed diagnosis after removing code fence");
            d
        }
        Err(err) => {
            warn!("model response is not a diagnosis object: {err}");
            Diagnosis::unparsed(raw)
        }
    }
}

// Only a JSON object counts; serde would otherwise accept a bare array positionally.
fn from_json_object(text: &str) -> Result<Diagnosis, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    if !value.is_object() {
        return Err(serde::de::Error::custom("expected a JSON object"));
    }
    serde_json::from_value(value)
}

fn strip_fence(raw: &str) -> &str {
    let s = raw.trim();
    let s = s.strip_prefix("```json").unwrap_or(s);
    let s = s.strip_prefix("```").unwrap_or(s);
    let s = s.strip_suffix("```").unwrap_or(s);
    s.trim()
}
