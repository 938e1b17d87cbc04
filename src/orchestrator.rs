use crate::{
    config::Config,
    diagnosis::{parse_diagnosis, Diagnosis},
    engine::Engine,
    narrative::{BackendError, Narrator},
    probe::{self, Probe, ProbeResult},
    prompt,
    report::DiagnosisReport,
    target::extract_target,
    util::now_rfc3339,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Symptom in, diagnosis out.
///
/// Holds only read-only state, so one instance can serve concurrent requests.
pub struct Orchestrator {
    default_target: String,
    probes: Vec<Box<dyn Probe>>,
    narrator: Narrator,
}

impl Orchestrator {
    /// The standard battery (ping, nslookup, traceroute) on `engine`.
    pub fn new(cfg: &Config, engine: Arc<dyn Engine>, narrator: Narrator) -> Self {
        Self::with_probes(
            &cfg.target.default_target,
            probe::standard_probes(cfg, engine),
            narrator,
        )
    }

    /// A custom battery; probes run in the order given.
    pub fn with_probes(
        default_target: &str,
        probes: Vec<Box<dyn Probe>>,
        narrator: Narrator,
    ) -> Self {
        Self {
            default_target: default_target.to_string(),
            probes,
            narrator,
        }
    }

    pub fn narrator(&self) -> &Narrator {
        &self.narrator
    }

    pub fn target_for(&self, symptom: &str) -> String {
        extract_target(symptom, &self.default_target)
    }

    /// Runs every probe against `target`, each to completion, in battery order.
    ///
    /// There is no early exit: a probe that reports total loss does not stop
    /// the ones after it.
    pub fn run_probes(&self, target: &str) -> Vec<ProbeResult> {
        let mut results = Vec::with_capacity(self.probes.len());
        for p in &self.probes {
            info!("running {} probe on {}", p.kind(), target);
            let started = Instant::now();
            let result = p.run(target);
            if result.success() {
                info!("{} probe finished in {:?}", p.kind(), started.elapsed());
            } else {
                warn!("{} probe failed: {}", p.kind(), result.error());
            }
            results.push(result);
        }
        results
    }

    pub fn diagnose(&self, symptom: &str, model: &str) -> Result<Diagnosis, BackendError> {
        Ok(self.investigate(symptom, model)?.diagnosis)
    }

    /// Full run, keeping the target and probe results alongside the diagnosis.
    pub fn investigate(&self, symptom: &str, model: &str) -> Result<DiagnosisReport, BackendError> {
        let started = now_rfc3339();
        info!("analyzing: {symptom}");

        let target = self.target_for(symptom);
        info!("target identified: {target}");

        let probes = self.run_probes(&target);

        let request = prompt::build_request(symptom, &probes);
        let raw = self.narrator.generate(model, &request)?;
        let diagnosis = parse_diagnosis(&raw);
        if diagnosis.is_degraded() {
            warn!("model {model} returned an unparseable diagnosis");
        }

        Ok(DiagnosisReport {
            symptom: symptom.to_string(),
            target,
            model: model.to_string(),
            started,
            finished: now_rfc3339(),
            probes,
            diagnosis,
        })
    }
}
