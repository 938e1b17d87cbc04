use super::{execute, Probe, ProbeData, ProbeKind, ProbeResult};
use crate::{
    config,
    engine::{CommandSpec, Engine},
    postprocess::output_lines,
    util::round_to,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DnsAnswer {
    pub resolved: bool,
    pub ip_addresses: Vec<String>,
    pub response_time_ms: f64,
    pub dns_server: Option<String>,
}

/// `nslookup <target>`.
pub struct NameResolutionProbe {
    engine: Arc<dyn Engine>,
    executable: String,
    timeout: Duration,
}

impl NameResolutionProbe {
    pub fn new(engine: Arc<dyn Engine>, cfg: &config::Dns) -> Self {
        Self {
            engine,
            executable: cfg.executable.clone(),
            timeout: Duration::from_secs(cfg.timeout_seconds),
        }
    }

    pub fn command(&self, target: &str) -> CommandSpec {
        CommandSpec::new(&self.executable, self.timeout).arg(target)
    }
}

impl Probe for NameResolutionProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::NameResolution
    }

    fn run(&self, target: &str) -> ProbeResult {
        let spec = self.command(target);
        execute(self.engine.as_ref(), self.kind(), target, &spec, |stdout, elapsed| {
            ProbeData::NameResolution(parse_nslookup(stdout, elapsed))
        })
    }
}

/// Collects answer addresses from nslookup output.
///
/// `Address:` lines carrying `#` are the resolver's own `ip#port` and are skipped.
pub fn parse_nslookup(stdout: &str, elapsed: Duration) -> DnsAnswer {
    let mut ip_addresses = Vec::new();
    let mut dns_server = None;

    for line in output_lines(stdout) {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix("Server:") {
            if dns_server.is_none() {
                dns_server = rest.split_whitespace().next().map(str::to_string);
            }
        }
        if let Some(rest) = line.strip_prefix("Address:") {
            if line.contains('#') {
                continue;
            }
            if let Some(ip) = rest.split_whitespace().last() {
                ip_addresses.push(ip.to_string());
            }
        }
    }

    DnsAnswer {
        resolved: !ip_addresses.is_empty(),
        ip_addresses,
        response_time_ms: round_to(elapsed.as_secs_f64() * 1000.0, 2),
        dns_server,
    }
}
