mod common;

use common::{FakeBackend, FakeEngine, DIAGNOSIS_JSON};
use netdiag::config::Config;
use netdiag::narrative::{BackendError, ModelRegistry, Narrator, ProviderFamily};
use netdiag::probe::ProbeKind;
use netdiag::Orchestrator;
use std::sync::Arc;

const ORDER: [ProbeKind; 3] = [
    ProbeKind::Reachability,
    ProbeKind::NameResolution,
    ProbeKind::PathTrace,
];

fn narrator_replying(text: &str) -> (Narrator, Arc<std::sync::Mutex<Vec<common::Seen>>>) {
    let (backend, seen) = FakeBackend::replying(text);
    let narrator = Narrator::new(ModelRegistry::default()).with_backend(ProviderFamily::OpenAi, backend);
    (narrator, seen)
}

#[test]
fn healthy_run_end_to_end() {
    let engine = Arc::new(FakeEngine::healthy());
    let (narrator, seen) = narrator_replying(DIAGNOSIS_JSON);
    let orch = Orchestrator::new(&Config::default(), engine.clone(), narrator);

    let report = orch
        .investigate("I can't reach example.com!", "gpt-4o-mini")
        .unwrap();

    assert_eq!(report.target, "example.com");
    assert_eq!(report.model, "gpt-4o-mini");
    let kinds: Vec<ProbeKind> = report.probes.iter().map(|r| r.tool_name()).collect();
    assert_eq!(kinds, ORDER);
    assert!(report.probes.iter().all(|r| r.success()));
    assert_eq!(report.diagnosis.root_cause, "No fault found.");
    assert_eq!(report.diagnosis.recommendations.len(), 2);

    let programs: Vec<String> = engine.calls().into_iter().map(|c| c.program).collect();
    assert_eq!(programs, vec!["ping", "nslookup", "traceroute"]);

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].model, "gpt-4o-mini");
    assert!(seen[0].user.starts_with("User reported issue: I can't reach example.com!"));
}

#[test]
fn every_probe_runs_even_when_all_fail() {
    // No canned replies: every tool "cannot be spawned".
    let engine = Arc::new(FakeEngine::new());
    let (narrator, seen) = narrator_replying(DIAGNOSIS_JSON);
    let orch = Orchestrator::new(&Config::default(), engine.clone(), narrator);

    let diagnosis = orch.diagnose("the internet is down", "gpt-4o").unwrap();
    assert_eq!(diagnosis.summary, "The host answers normally.");
    assert_eq!(engine.calls().len(), 3);

    let seen = seen.lock().unwrap();
    assert_eq!(seen[0].user.matches("Status: FAILED").count(), 3);
}

#[test]
fn total_packet_loss_does_not_stop_later_probes() {
    let engine = Arc::new(
        FakeEngine::healthy().exit(
            "ping",
            0,
            "4 packets transmitted, 0 received, 100% packet loss\n",
        ),
    );
    let (narrator, _) = narrator_replying(DIAGNOSIS_JSON);
    let orch = Orchestrator::new(&Config::default(), engine.clone(), narrator);

    let results = orch.run_probes("example.com");
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].data_json()["packet_loss_percent"], 100.0);
    assert_eq!(engine.calls().len(), 3);
}

#[test]
fn symptom_without_host_uses_default_target() {
    let engine = Arc::new(FakeEngine::healthy());
    let (narrator, _) = narrator_replying(DIAGNOSIS_JSON);
    let mut cfg = Config::default();
    cfg.target.default_target = "1.1.1.1".into();
    let orch = Orchestrator::new(&cfg, engine.clone(), narrator);

    let report = orch.investigate("my VPN keeps dropping", "gpt-4o-mini").unwrap();
    assert_eq!(report.target, "1.1.1.1");
    assert!(engine.calls().iter().all(|c| c.args.last().map(String::as_str) == Some("1.1.1.1")));
}

#[test]
fn backend_failure_propagates() {
    let engine = Arc::new(FakeEngine::healthy());
    let (backend, _) = FakeBackend::failing("connection refused");
    let narrator = Narrator::new(ModelRegistry::default()).with_backend(ProviderFamily::OpenAi, backend);
    let orch = Orchestrator::new(&Config::default(), engine.clone(), narrator);

    let err = orch.diagnose("example.com is down", "gpt-4o-mini").unwrap_err();
    assert!(matches!(err, BackendError::Http(ref m) if m == "connection refused"));
    // Probes still ran before the narrative step failed.
    assert_eq!(engine.calls().len(), 3);
}

#[test]
fn malformed_reply_is_degraded_not_an_error() {
    let engine = Arc::new(FakeEngine::healthy());
    let (narrator, _) = narrator_replying("The network looks fine to me.");
    let orch = Orchestrator::new(&Config::default(), engine, narrator);

    let d = orch.diagnose("example.com is slow", "gpt-4o-mini").unwrap();
    assert!(d.is_degraded());
    assert_eq!(d.summary, "The network looks fine to me.");
}

#[test]
fn models_route_to_their_provider() {
    let engine = Arc::new(FakeEngine::healthy());
    let (openai, openai_seen) = FakeBackend::replying(DIAGNOSIS_JSON);
    let (anthropic, anthropic_seen) = FakeBackend::replying(DIAGNOSIS_JSON);
    let narrator = Narrator::new(ModelRegistry::default())
        .with_backend(ProviderFamily::OpenAi, openai)
        .with_backend(ProviderFamily::Anthropic, anthropic);
    let orch = Orchestrator::new(&Config::default(), engine, narrator);

    orch.diagnose("example.com", "claude-haiku-4-5-20251001").unwrap();
    orch.diagnose("example.com", "some-future-model").unwrap();

    assert_eq!(anthropic_seen.lock().unwrap().len(), 1);
    let openai_seen = openai_seen.lock().unwrap();
    assert_eq!(openai_seen.len(), 1);
    assert_eq!(openai_seen[0].model, "some-future-model");
}

#[test]
fn missing_backend_is_reported() {
    let engine = Arc::new(FakeEngine::healthy());
    let narrator = Narrator::new(ModelRegistry::default());
    let orch = Orchestrator::new(&Config::default(), engine, narrator);

    let err = orch.diagnose("example.com", "gemini-2.5-flash").unwrap_err();
    assert!(matches!(err, BackendError::Unavailable(ProviderFamily::Google)));
}

#[test]
fn orchestrator_is_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Orchestrator>();
}
