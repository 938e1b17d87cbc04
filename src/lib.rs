pub mod cli;
pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod narrative;
pub mod orchestrator;
pub mod postprocess;
pub mod probe;
pub mod prompt;
pub mod report;
pub mod target;
pub mod util;

pub use diagnosis::{parse_diagnosis, Diagnosis};
pub use orchestrator::Orchestrator;
pub use probe::{ProbeKind, ProbeResult};
