use crate::{
    config::{Config, OutputFormat},
    engine::{Engine, SystemEngine},
    narrative::{Narrator, ProviderFamily},
    orchestrator::Orchestrator,
    report::{render_diagnosis, render_probes},
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Parser, Debug)]
#[command(name = "netdiag")]
#[command(about = "Network diagnostic assistant (ping + nslookup + traceroute, explained by an LLM)")]
pub struct Args {
    #[command(subcommand)]
    pub cmd: Command,

    /// Path to config TOML. If omitted, uses ./netdiag.toml if present.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace/debug/info/warn/error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Describe the problem in plain words; probes run and a model explains them.
    Diagnose {
        symptom: String,
        /// Model id (see `netdiag models`).
        #[arg(long)]
        model: Option<String>,
        /// Print the full JSON report instead of the text rendering.
        #[arg(long)]
        json: bool,
    },
    /// Run the probes against a host without calling a model.
    Probe {
        target: String,
        #[arg(long)]
        json: bool,
    },
    /// List supported model ids.
    Models {},
    /// Check that probe tools and provider credentials are available.
    Doctor {},
}

pub fn dispatch(args: Args) -> Result<()> {
    let cfg_path = resolve_config_path(args.config.as_deref());
    let cfg = Config::load_or_default(cfg_path.as_deref())?;
    let _guard = init_logging(&args, &cfg)?;
    if let Some(p) = &cfg_path {
        info!("config: {}", p.display());
    }

    match &args.cmd {
        Command::Diagnose {
            symptom,
            model,
            json,
        } => diagnose(&cfg, symptom, model.as_deref(), *json),
        Command::Probe { target, json } => probe(&cfg, target, *json),
        Command::Models {} => models(&cfg),
        Command::Doctor {} => doctor(&cfg),
    }
}

fn resolve_config_path(user: Option<&Path>) -> Option<PathBuf> {
    if let Some(p) = user {
        return Some(p.to_path_buf());
    }
    let default = PathBuf::from("netdiag.toml");
    default.exists().then_some(default)
}

fn init_logging(args: &Args, cfg: &Config) -> Result<Option<WorkerGuard>> {
    let level = args
        .log_level
        .as_deref()
        .unwrap_or(cfg.logging.level.as_str());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    // stdout carries the diagnosis; logs go to stderr.
    let stderr_layer = if cfg.logging.json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .boxed()
    };

    let (file_layer, guard) = if cfg.logging.write_to_file && !cfg.logging.file_path.is_empty() {
        let path = Path::new(&cfg.logging.file_path);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            crate::util::ensure_dir(parent)?;
        }
        let file = std::fs::File::create(path)
            .with_context(|| format!("create log file: {}", path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(non_blocking)
            .with_ansi(false)
            .with_target(true)
            .boxed();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow!("failed to init logging: {e}"))?;

    Ok(guard)
}

fn build_orchestrator(cfg: &Config) -> Result<Orchestrator> {
    let narrator = Narrator::from_config(cfg)?;
    Ok(Orchestrator::new(cfg, Arc::new(SystemEngine::new()), narrator))
}

fn diagnose(cfg: &Config, symptom: &str, model: Option<&str>, json: bool) -> Result<()> {
    let symptom = symptom.trim();
    if symptom.is_empty() {
        return Err(anyhow!("symptom must not be empty"));
    }

    let orchestrator = build_orchestrator(cfg)?;
    let model = model.unwrap_or(orchestrator.narrator().registry().default_model());
    let report = orchestrator
        .investigate(symptom, model)
        .map_err(|e| anyhow!("Diagnosis failed: {e}"))?;

    if json || cfg.output.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if cfg.output.include_probes {
        println!("{}\n", render_probes(&report.probes));
    }
    println!("{}", render_diagnosis(&report.diagnosis));
    Ok(())
}

fn probe(cfg: &Config, target: &str, json: bool) -> Result<()> {
    let orchestrator = build_orchestrator(cfg)?;
    let results = orchestrator.run_probes(target.trim());

    if json || cfg.output.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{}", render_probes(&results));
    }
    Ok(())
}

fn models(cfg: &Config) -> Result<()> {
    let narrator = Narrator::from_config(cfg)?;
    let registry = narrator.registry();
    println!("Available models:");
    for entry in registry.entries() {
        let marker = if entry.id == registry.default_model() {
            "*"
        } else {
            " "
        };
        println!("{marker} {:35} {}", entry.id, entry.label);
    }
    Ok(())
}

fn doctor(cfg: &Config) -> Result<()> {
    let engine = SystemEngine::new();
    let tools: Vec<_> = [
        &cfg.probes.ping.executable,
        &cfg.probes.dns.executable,
        &cfg.probes.traceroute.executable,
    ]
    .into_iter()
    .map(|exe| {
        let found = engine.locate(exe);
        serde_json::json!({
            "executable": exe,
            "found": found.is_some(),
            "path": found,
        })
    })
    .collect();

    let providers: Vec<_> = ProviderFamily::ALL
        .into_iter()
        .map(|family| {
            let env = &cfg.narrative.provider(family).api_key_env;
            let set = std::env::var(env).is_ok_and(|v| !v.trim().is_empty());
            serde_json::json!({
                "provider": family,
                "api_key_env": env,
                "api_key_set": set,
            })
        })
        .collect();

    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "tools": tools,
            "providers": providers,
        }))?
    );
    Ok(())
}
