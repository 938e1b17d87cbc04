//! Diagnostic probes.
//!
//! Each probe runs one OS networking tool through an [`Engine`], parses what it
//! printed, and returns a [`ProbeResult`]. A probe never returns an error: a
//! tool that fails, cannot be spawned, or times out is reported as a failed
//! result so the remaining probes and the narrative step still run.

pub mod dns;
pub mod ping;
pub mod traceroute;

use crate::{
    config::Config,
    engine::{CommandSpec, Engine},
};
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub use dns::{DnsAnswer, NameResolutionProbe};
pub use ping::{PingStats, ReachabilityProbe};
pub use traceroute::{Hop, PathTraceProbe, TraceRoute};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeKind {
    Reachability,
    NameResolution,
    PathTrace,
}

impl ProbeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ProbeKind::Reachability => "reachability",
            ProbeKind::NameResolution => "name_resolution",
            ProbeKind::PathTrace => "path_trace",
        }
    }

    /// The error text a failed run of this probe carries.
    pub fn failure_message(self, target: &str) -> String {
        match self {
            ProbeKind::Reachability => format!("ping failed for {target}"),
            ProbeKind::NameResolution => format!("DNS lookup failed for {target}"),
            ProbeKind::PathTrace => format!("traceroute failed for {target}"),
        }
    }
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Probe-specific structured fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProbeData {
    Reachability(PingStats),
    NameResolution(DnsAnswer),
    PathTrace(TraceRoute),
}

/// Uniform outcome of one probe run.
///
/// Built only through [`ProbeResult::succeeded`] and [`ProbeResult::failed`],
/// so `data` is present exactly when `success` is set and `error` is
/// non-empty exactly when it is not.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    tool_name: ProbeKind,
    target: String,
    success: bool,
    #[serde(serialize_with = "serialize_data")]
    data: Option<ProbeData>,
    raw_output: String,
    error: String,
    duration_seconds: f64,
}

impl ProbeResult {
    pub fn succeeded(
        tool_name: ProbeKind,
        target: impl Into<String>,
        data: ProbeData,
        raw_output: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            tool_name,
            target: target.into(),
            success: true,
            data: Some(data),
            raw_output: raw_output.into(),
            error: String::new(),
            duration_seconds: duration.as_secs_f64(),
        }
    }

    pub fn failed(
        tool_name: ProbeKind,
        target: impl Into<String>,
        error: impl Into<String>,
        raw_output: impl Into<String>,
        duration: Duration,
    ) -> Self {
        let target = target.into();
        let mut error = error.into();
        if error.trim().is_empty() {
            error = tool_name.failure_message(&target);
        }
        Self {
            tool_name,
            target,
            success: false,
            data: None,
            raw_output: raw_output.into(),
            error,
            duration_seconds: duration.as_secs_f64(),
        }
    }

    pub fn tool_name(&self) -> ProbeKind {
        self.tool_name
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&ProbeData> {
        self.data.as_ref()
    }

    pub fn raw_output(&self) -> &str {
        &self.raw_output
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    /// `data` as a JSON object; `{}` for failed runs.
    pub fn data_json(&self) -> serde_json::Value {
        match &self.data {
            Some(d) => serde_json::to_value(d)
                .unwrap_or_else(|_| serde_json::Value::Object(Default::default())),
            None => serde_json::Value::Object(Default::default()),
        }
    }
}

fn serialize_data<S: Serializer>(data: &Option<ProbeData>, s: S) -> Result<S::Ok, S::Error> {
    match data {
        Some(d) => d.serialize(s),
        None => serde_json::Map::new().serialize(s),
    }
}

/// One diagnostic tool.
pub trait Probe: Send + Sync {
    fn kind(&self) -> ProbeKind;
    fn run(&self, target: &str) -> ProbeResult;
}

/// The fixed battery in its fixed order: reachability, name resolution, path trace.
pub fn standard_probes(cfg: &Config, engine: Arc<dyn Engine>) -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(ReachabilityProbe::new(engine.clone(), &cfg.probes.ping)),
        Box::new(NameResolutionProbe::new(engine.clone(), &cfg.probes.dns)),
        Box::new(PathTraceProbe::new(engine, &cfg.probes.traceroute)),
    ]
}

/// Runs `spec` and turns the outcome into a [`ProbeResult`].
///
/// `parse` sees stdout of a zero-exit run along with the measured elapsed time.
fn execute<F>(
    engine: &dyn Engine,
    kind: ProbeKind,
    target: &str,
    spec: &CommandSpec,
    parse: F,
) -> ProbeResult
where
    F: FnOnce(&str, Duration) -> ProbeData,
{
    let started = Instant::now();
    match engine.run(spec) {
        Ok(out) if out.success() => {
            let data = parse(&out.stdout, out.elapsed);
            debug!(probe = %kind, host = target, "probe succeeded in {:?}", out.elapsed);
            ProbeResult::succeeded(kind, target, data, out.stdout, out.elapsed)
        }
        Ok(out) => {
            warn!(
                probe = %kind,
                host = target,
                exit = ?out.exit_code,
                "{} exited unsuccessfully",
                spec.program
            );
            let raw = out.combined();
            ProbeResult::failed(kind, target, kind.failure_message(target), raw, out.elapsed)
        }
        Err(err) => {
            warn!(probe = %kind, host = target, "{:#}", err);
            ProbeResult::failed(
                kind,
                target,
                kind.failure_message(target),
                format!("{err:#}"),
                started.elapsed(),
            )
        }
    }
}
