use super::{CommandOutput, CommandSpec, Engine};
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Runs the OS networking tools as child processes.
pub struct SystemEngine {
    env: Vec<(String, String)>,
}

impl Default for SystemEngine {
    fn default() -> Self {
        // Tool output is parsed as text; pin the C locale so decimal separators
        // and summary lines stay in the format the parsers expect.
        Self {
            env: vec![("LC_ALL".into(), "C".into())],
        }
    }
}

impl SystemEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Engine for SystemEngine {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!("exec {} timeout={:?}", spec.display(), spec.timeout);
        let started = Instant::now();

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());
        for (k, v) in &self.env {
            cmd.env(k, v);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("spawning {}", spec.program))?;
        let mut guard = ChildGuard::new(child);

        let (status, stdout, stderr) = wait_with_timeout(&mut guard, spec.timeout)
            .with_context(|| format!("running {}", spec.display()))?;

        let out = CommandOutput {
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            elapsed: started.elapsed(),
        };
        debug!(
            "exec {} exit={:?} elapsed={:?}",
            spec.program, out.exit_code, out.elapsed
        );
        Ok(out)
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        let candidate = Path::new(program);
        if candidate.components().count() > 1 {
            return candidate.is_file().then(|| candidate.to_path_buf());
        }
        let paths = std::env::var_os("PATH")?;
        std::env::split_paths(&paths)
            .map(|dir| dir.join(program))
            .find(|p| p.is_file())
    }
}

/// Owns a spawned child and kills it on drop unless it was reaped.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self {
            child,
            reaped: false,
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}

fn spawn_reader<R: Read + Send + 'static>(
    reader: Option<R>,
    name: &'static str,
) -> JoinHandle<Result<Vec<u8>>> {
    std::thread::spawn(move || -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        if let Some(mut r) = reader {
            r.read_to_end(&mut buf)
                .with_context(|| format!("read {name}"))?;
        }
        Ok(buf)
    })
}

fn join_reader(handle: JoinHandle<Result<Vec<u8>>>, name: &str) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| anyhow!("{name} reader thread panicked"))?
}

fn wait_with_timeout(
    guard: &mut ChildGuard,
    timeout: Duration,
) -> Result<(ExitStatus, Vec<u8>, Vec<u8>)> {
    // Drain pipes while waiting so a chatty tool can't block on a full buffer.
    let stdout_thread = spawn_reader(guard.child.stdout.take(), "stdout");
    let stderr_thread = spawn_reader(guard.child.stderr.take(), "stderr");

    let start = Instant::now();
    loop {
        if let Some(status) = guard.child.try_wait().with_context(|| "try_wait")? {
            guard.reaped = true;
            let stdout = join_reader(stdout_thread, "stdout")?;
            let stderr = join_reader(stderr_thread, "stderr")?;
            return Ok((status, stdout, stderr));
        }

        if start.elapsed() > timeout {
            warn!("process timed out after {:?}", timeout);
            let _ = guard.child.kill();
            guard.child.wait().with_context(|| "wait after kill")?;
            guard.reaped = true;
            let _ = join_reader(stdout_thread, "stdout");
            let stderr = join_reader(stderr_thread, "stderr").unwrap_or_default();
            return Err(anyhow!(
                "process exceeded timeout ({:?}); stderr: {}",
                timeout,
                String::from_utf8_lossy(&stderr).trim()
            ));
        }

        std::thread::sleep(Duration::from_millis(50));
    }
}
