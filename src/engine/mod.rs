pub mod system;
pub mod types;

use anyhow::Result;

pub use system::SystemEngine;
pub use types::{CommandOutput, CommandSpec};

/// Runs external diagnostic tools.
///
/// `Err` means the command never produced an exit status: it could not be
/// spawned, or it was killed at its timeout. A non-zero exit is an `Ok`.
pub trait Engine: Send + Sync {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;

    /// Whether `program` can be found; used by `doctor`.
    fn locate(&self, program: &str) -> Option<std::path::PathBuf>;
}
