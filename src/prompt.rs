use crate::probe::ProbeResult;
use serde::Serialize;
use std::fmt::Write;

pub const SYSTEM_PROMPT: &str = r#"You are a network diagnostic assistant.

You receive the output of ping, DNS lookup and traceroute runs against a host,
together with the problem a user reported. Explain what the results show to
someone without networking expertise.

Reply with a single JSON object and nothing else, in exactly this shape:
{
    "summary": "One or two plain-English sentences on what the diagnostics found",
    "root_cause": "The single most likely cause of the problem",
    "recommendations": [
        "First specific, actionable step",
        "Second specific, actionable step",
        "Optional third step"
    ]
}

Rules:
- Output only the JSON object: no markdown fences, no commentary
- Keep it short and avoid jargon
- "recommendations" holds 2 or 3 strings
"#;

const SECTION_RULE: usize = 40;

/// Provider-agnostic narrative request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NarrativeRequest {
    pub system: String,
    pub user: String,
}

pub fn build_request(symptom: &str, results: &[ProbeResult]) -> NarrativeRequest {
    NarrativeRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: build_user_prompt(symptom, results),
    }
}

/// Renders the symptom and every probe result, in the order given.
///
/// Successful probes carry both their structured data and the verbatim tool
/// output; failed probes carry their error.
pub fn build_user_prompt(symptom: &str, results: &[ProbeResult]) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "User reported issue: {symptom}");
    prompt.push('\n');
    prompt.push_str("Diagnostic Results:\n");
    prompt.push_str(&"=".repeat(SECTION_RULE));
    prompt.push('\n');

    for result in results {
        let _ = writeln!(
            prompt,
            "\n[{}] Target: {}",
            result.tool_name().as_str().to_uppercase(),
            result.target()
        );

        if result.success() {
            prompt.push_str("Status: SUCCESS\n");
            let _ = writeln!(prompt, "Data: {}", result.data_json());
            let _ = writeln!(prompt, "Raw Output:\n{}", result.raw_output());
        } else {
            prompt.push_str("Status: FAILED\n");
            let _ = writeln!(prompt, "Error: {}", result.error());
        }

        prompt.push_str(&"-".repeat(SECTION_RULE));
        prompt.push('\n');
    }

    prompt.push_str("\nBased on the above diagnostic results, please analyze the network issue.");
    prompt
}
