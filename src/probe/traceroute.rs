use super::{execute, Probe, ProbeData, ProbeKind, ProbeResult};
use crate::{
    config,
    engine::{CommandSpec, Engine},
    postprocess::output_lines,
    util::round_to,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

static HOP_NUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s").expect("HOP_NUM is a compile-time constant"));
static HOP_IP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d+\.\d+\.\d+\.\d+)\)").expect("HOP_IP is a compile-time constant")
});
static HOP_RTT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s+ms\b").expect("HOP_RTT is a compile-time constant")
});

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hop {
    pub hop_num: u32,
    pub ip: Option<String>,
    pub rtt_ms: Option<f64>,
    pub timed_out: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRoute {
    pub hops: Vec<Hop>,
    pub total_hops: usize,
    pub reached_destination: bool,
}

/// `traceroute -m <max_hops> <target>`.
pub struct PathTraceProbe {
    engine: Arc<dyn Engine>,
    executable: String,
    max_hops: u32,
    timeout: Duration,
}

impl PathTraceProbe {
    pub fn new(engine: Arc<dyn Engine>, cfg: &config::Traceroute) -> Self {
        Self {
            engine,
            executable: cfg.executable.clone(),
            max_hops: cfg.max_hops.max(1),
            timeout: Duration::from_secs(cfg.timeout_seconds),
        }
    }

    pub fn command(&self, target: &str) -> CommandSpec {
        CommandSpec::new(&self.executable, self.timeout)
            .arg("-m")
            .arg(self.max_hops.to_string())
            .arg(target)
    }
}

impl Probe for PathTraceProbe {
    fn kind(&self) -> ProbeKind {
        ProbeKind::PathTrace
    }

    fn run(&self, target: &str) -> ProbeResult {
        let spec = self.command(target);
        execute(self.engine.as_ref(), self.kind(), target, &spec, |stdout, _| {
            ProbeData::PathTrace(parse_traceroute(stdout))
        })
    }
}

/// Parses one hop line, e.g. `3  gw (10.0.0.1)  12.345 ms  13.456 ms  14.567 ms`.
/// Returns `None` for lines that don't start with a hop number.
pub fn parse_hop(line: &str) -> Option<Hop> {
    let line = line.trim();
    let hop_num = HOP_NUM.captures(line)?.get(1)?.as_str().parse().ok()?;

    let ip = HOP_IP
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    let times: Vec<f64> = HOP_RTT
        .captures_iter(line)
        .filter_map(|c| c.get(1)?.as_str().parse().ok())
        .collect();
    let rtt_ms = if times.is_empty() {
        None
    } else {
        Some(round_to(times.iter().sum::<f64>() / times.len() as f64, 3))
    };

    Some(Hop {
        hop_num,
        ip,
        rtt_ms,
        timed_out: line.contains('*'),
    })
}

/// Hops in the order traceroute printed them.
pub fn parse_traceroute(stdout: &str) -> TraceRoute {
    let hops: Vec<Hop> = output_lines(stdout)
        .iter()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| parse_hop(l))
        .collect();

    let reached_destination = hops
        .last()
        .is_some_and(|h| h.ip.is_some() && h.rtt_ms.is_some());

    TraceRoute {
        total_hops: hops.len(),
        reached_destination,
        hops,
    }
}
