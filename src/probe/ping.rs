use super::{execute, Probe, ProbeData, ProbeKind, ProbeResult};
use crate::{
    config,
    engine::{CommandSpec, Engine},
    postprocess::output_lines,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PingStats {
    pub packet_loss_percent: Option<f64>,
    pub avg_rtt_ms: Option<f64>,
    pub min_rtt_ms: Option<f64>,
    pub max_rtt_ms: Option<f64>,
}

/// `ping -c <count> <target>`.
pub struct ReachabilityProbe {
    engine: Arc<dyn Engine>,
    executable: String,
    count: u32,
    timeout: Duration,
}

impl ReachabilityProbe {
    pub fn new(engine: Arc<dyn Engine>, cfg: &config::Ping) -> Self {
        Self {
            engine,
            executable: cfg.executable.clone(),
            count: cfg.count.max(1),
            timeout: Duration::from_secs(cfg.timeout_seconds),
        }
    }

    pub fn command(&self, target: &str) -> CommandSpec {
        CommandSpec::new(&self.executable, self.timeout)
            .arg("-c")
            .arg(self.count.to_string())
            .arg(target)
    }
}

impl Probe for ReachabilityProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::Reachability
    }

    fn run(&self, target: &str) -> ProbeResult {
        let spec = self.command(target);
        execute(self.engine.as_ref(), self.kind(), target, &spec, |stdout, _| {
            ProbeData::Reachability(parse_ping(stdout))
        })
    }
}

/// Pulls packet loss and the min/avg/max round-trip times out of ping's
/// summary. Anything missing stays `None`.
pub fn parse_ping(stdout: &str) -> PingStats {
    let mut stats = PingStats::default();

    for line in output_lines(stdout) {
        if line.contains("packet loss") && stats.packet_loss_percent.is_none() {
            stats.packet_loss_percent = line
                .split_whitespace()
                .map(|tok| tok.trim_end_matches(','))
                .find(|tok| tok.ends_with('%'))
                .and_then(|tok| tok.trim_end_matches('%').parse::<f64>().ok());
        }

        if line.contains("min/avg/max") {
            if let Some((min, avg, max)) = parse_rtt_line(&line) {
                stats.min_rtt_ms = Some(min);
                stats.avg_rtt_ms = Some(avg);
                stats.max_rtt_ms = Some(max);
            }
        }
    }

    stats
}

// "round-trip min/avg/max/stddev = 6.1/11.5/14.4/3.2 ms" (BSD),
// "rtt min/avg/max/mdev = 6.1/11.5/14.4/3.2 ms" (Linux).
fn parse_rtt_line(line: &str) -> Option<(f64, f64, f64)> {
    let (_, values) = line.split_once('=')?;
    let values = values.trim().trim_end_matches("ms").trim();
    let mut parts = values.split('/').map(|p| p.trim().parse::<f64>());
    let min = parts.next()?.ok()?;
    let avg = parts.next()?.ok()?;
    let max = parts.next()?.ok()?;
    Some((min, avg, max))
}
