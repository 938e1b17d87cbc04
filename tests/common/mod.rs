#![allow(dead_code)]

use anyhow::anyhow;
use netdiag::engine::{CommandOutput, CommandSpec, Engine};
use netdiag::narrative::{BackendError, NarrativeBackend};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const PING_OK: &str = "PING example.com (93.184.216.34): 56 data bytes
64 bytes from 93.184.216.34: icmp_seq=0 ttl=56 time=6.1 ms
64 bytes from 93.184.216.34: icmp_seq=1 ttl=56 time=14.4 ms

--- example.com ping statistics ---
4 packets transmitted, 4 received, 0.0% packet loss
round-trip min/avg/max/stddev = 6.1/11.5/14.4/3.2 ms
";

pub const DNS_OK: &str = "Server:\t\t10.0.0.1
Address:\t10.0.0.1#53

Non-authoritative answer:
Name:\texample.com
Address: 93.184.216.34
";

pub const TRACE_OK: &str = "traceroute to example.com (93.184.216.34), 30 hops max, 60 byte packets
 1  router.lan (192.168.1.1)  1.123 ms  1.456 ms  1.789 ms
 2  * * *
 3  10.0.0.1 (10.0.0.1)  12.345 ms  13.456 ms  14.567 ms
";

pub const DIAGNOSIS_JSON: &str = r#"{"summary":"The host answers normally.","root_cause":"No fault found.","recommendations":["Retry the page","Clear the browser cache"]}"#;

#[derive(Clone)]
pub enum Reply {
    Exit(i32, String, String),
    Missing,
}

/// Canned command output keyed by program name. Unknown programs behave as
/// if they could not be spawned.
#[derive(Default)]
pub struct FakeEngine {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn healthy() -> Self {
        Self::new()
            .exit("ping", 0, PING_OK)
            .exit("nslookup", 0, DNS_OK)
            .exit("traceroute", 0, TRACE_OK)
    }

    pub fn exit(mut self, program: &str, code: i32, stdout: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Exit(code, stdout.to_string(), String::new()),
        );
        self
    }

    pub fn exit_with_stderr(mut self, program: &str, code: i32, stdout: &str, stderr: &str) -> Self {
        self.replies.insert(
            program.to_string(),
            Reply::Exit(code, stdout.to_string(), stderr.to_string()),
        );
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

impl Engine for FakeEngine {
    fn run(&self, spec: &CommandSpec) -> anyhow::Result<CommandOutput> {
        self.calls.lock().unwrap().push(spec.clone());
        match self.replies.get(&spec.program).cloned().unwrap_or(Reply::Missing) {
            Reply::Exit(code, stdout, stderr) => Ok(CommandOutput {
                exit_code: Some(code),
                stdout,
                stderr,
                elapsed: Duration::from_millis(12),
            }),
            Reply::Missing => Err(anyhow!(
                "spawning {}: No such file or directory (os error 2)",
                spec.program
            )),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.replies
            .contains_key(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Seen {
    pub model: String,
    pub system: String,
    pub user: String,
}

/// Narrative backend that answers every call with the same text or error.
pub struct FakeBackend {
    reply: Result<String, String>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl FakeBackend {
    pub fn replying(text: &str) -> (Self, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: Ok(text.to_string()),
                seen: seen.clone(),
            },
            seen,
        )
    }

    pub fn failing(message: &str) -> (Self, Arc<Mutex<Vec<Seen>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                reply: Err(message.to_string()),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

impl NarrativeBackend for FakeBackend {
    fn generate(&self, model: &str, system: &str, user: &str) -> Result<String, BackendError> {
        self.seen.lock().unwrap().push(Seen {
            model: model.to_string(),
            system: system.to_string(),
            user: user.to_string(),
        });
        self.reply.clone().map_err(BackendError::Http)
    }
}
