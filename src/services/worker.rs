//! Strategy-model worker interface and subprocess transport.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::config::ModelSpec;
use crate::models::{Instrument, WorkerFailure, WorkerPayload};

/// One strategy model. Implementations must not share mutable state with
/// siblings; the invoker runs them concurrently.
#[async_trait]
pub trait StrategyWorker: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, instrument: &Instrument) -> Result<WorkerPayload, WorkerFailure>;
}

/// Runs a model as a child process: `<program> <args..> --ticker <instrument>`.
///
/// The child is killed if the invocation future is dropped, which is how the
/// invoker's deadline takes effect.
pub struct SubprocessWorker {
    spec: ModelSpec,
}

impl SubprocessWorker {
    pub fn new(spec: ModelSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl StrategyWorker for SubprocessWorker {
    fn name(&self) -> &str {
        &self.spec.name
    }

    async fn run(&self, instrument: &Instrument) -> Result<WorkerPayload, WorkerFailure> {
        let output = Command::new(&self.spec.program)
            .args(&self.spec.args)
            .arg("--ticker")
            .arg(instrument.as_str())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| WorkerFailure::crash(format!("failed to spawn {}: {}", self.spec.program, e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            let last_err = stderr.lines().rev().find(|line| !line.trim().is_empty());
            return Err(WorkerFailure::crash(match last_err {
                Some(line) => format!("{}: {}", output.status, line.trim()),
                None => output.status.to_string(),
            }));
        }

        if !stderr.trim().is_empty() {
            debug!(model = %self.spec.name, instrument = %instrument, stderr = %stderr.trim(), "worker stderr");
        }

        parse_worker_output(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Parse a worker's stdout: the last non-empty line is the JSON payload,
/// anything before it is diagnostics.
pub fn parse_worker_output(stdout: &str) -> Result<WorkerPayload, WorkerFailure> {
    let mut lines = stdout.lines().map(str::trim).filter(|line| !line.is_empty());
    let payload = lines
        .next_back()
        .ok_or_else(|| WorkerFailure::crash("worker produced no output"))?;

    for line in lines {
        debug!(line = %line, "worker diagnostics");
    }

    serde_json::from_str(payload).map_err(|e| WorkerFailure::crash(format!("unparseable output: {}", e)))
}
