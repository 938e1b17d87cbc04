use crate::{diagnosis::Diagnosis, probe::ProbeResult};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisReport {
    pub symptom: String,
    pub target: String,
    pub model: String,
    pub started: String,
    pub finished: String,
    pub probes: Vec<ProbeResult>,
    pub diagnosis: Diagnosis,
}

/// Markdown-ish terminal rendering: summary, root cause, numbered recommendations.
pub fn render_diagnosis(d: &Diagnosis) -> String {
    let mut out = String::new();
    out.push_str("## Summary\n");
    out.push_str(&d.summary);
    out.push_str("\n\n## Root Cause\n");
    out.push_str(&d.root_cause);
    out.push_str("\n\n## Recommendations");
    for (i, rec) in d.recommendations.iter().enumerate() {
        let _ = write!(out, "\n{}. {}", i + 1, rec);
    }
    out
}

/// One line per probe: name, status, and its data or error.
pub fn render_probes(results: &[ProbeResult]) -> String {
    let mut out = String::from("## Probes");
    for r in results {
        if r.success() {
            let _ = write!(
                out,
                "\n- {} {} ok ({:.2}s) {}",
                r.tool_name(),
                r.target(),
                r.duration_seconds(),
                r.data_json()
            );
        } else {
            let _ = write!(
                out,
                "\n- {} {} FAILED ({:.2}s): {}",
                r.tool_name(),
                r.target(),
                r.duration_seconds(),
                r.error()
            );
        }
    }
    out
}
