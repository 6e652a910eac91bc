//! Build-and-run executor: one [`ExecutionOutcome`] per example.

use std::{env, fs, io, path::{Path, PathBuf}, time::Duration};

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::bank::{ExampleId, ExampleRecord};

pub mod process;
pub mod toolchain;

use process::{run_captured, Exit};
pub use toolchain::Toolchain;

/// Failures of the run environment rather than of one example. Fatal.
#[derive(Error, Debug)]
pub enum EnvError {
    #[error("C compiler `{program}` is not available: {source}")]
    CompilerUnavailable {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to spawn {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("scratch path {} is not usable: {source}", path.display())]
    Scratch {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecutionOutcome {
    pub id: ExampleId,
    #[serde(flatten)]
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OutcomeStatus {
    Ok {
        stdout: String,
        stderr: String,
    },
    /// No run happened.
    CompileError {
        compile_stderr: String,
    },
    RuntimeNonzero {
        /// `None` when the program was killed by a signal.
        returncode: Option<i32>,
        stdout: String,
        stderr: String,
    },
    Timeout {
        timeout_secs: u64,
        stdout: String,
        stderr: String,
    },
}

impl OutcomeStatus {
    pub fn label(&self) -> &'static str {
        match self {
            OutcomeStatus::Ok { .. } => "ok",
            OutcomeStatus::CompileError { .. } => "compile_error",
            OutcomeStatus::RuntimeNonzero { .. } => "runtime_nonzero",
            OutcomeStatus::Timeout { .. } => "timeout",
        }
    }

    /// Captured program stdout; empty when nothing ran.
    pub fn stdout(&self) -> &str {
        match self {
            OutcomeStatus::Ok { stdout, .. }
            | OutcomeStatus::RuntimeNonzero { stdout, .. }
            | OutcomeStatus::Timeout { stdout, .. } => stdout,
            OutcomeStatus::CompileError { .. } => "",
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, OutcomeStatus::Ok { .. })
    }
}

/// Compiles and runs examples inside one scratch directory.
#[derive(Debug, Clone)]
pub struct Executor {
    toolchain: Toolchain,
    scratch_dir: PathBuf,
    timeout: Duration,
}

impl Executor {
    /// Create the scratch directory (once, before any example) and probe the
    /// compiler.
    pub async fn prepare(toolchain: Toolchain, scratch_dir: &Path, timeout: Duration) -> Result<Self, EnvError> {
        let scratch_dir = absolute(scratch_dir)?;
        fs::create_dir_all(&scratch_dir).map_err(|source| EnvError::Scratch { path: scratch_dir.clone(), source })?;
        toolchain.probe().await?;
        Ok(Self { toolchain, scratch_dir, timeout })
    }

    pub fn scratch_dir(&self) -> &Path {
        &self.scratch_dir
    }

    pub async fn execute(&self, record: &ExampleRecord) -> Result<ExecutionOutcome, EnvError> {
        let stem = record.id.file_stem();
        let src = toolchain::source_path(&self.scratch_dir, &stem);
        let exe = toolchain::artifact_path(&self.scratch_dir, &stem);

        tokio::fs::write(&src, record.source.as_bytes())
            .await
            .map_err(|source| EnvError::Scratch { path: src.clone(), source })?;
        // never run a binary left over from an earlier run
        match tokio::fs::remove_file(&exe).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => {
                return Err(EnvError::Scratch { path: exe, source: e });
            }
            _ => {}
        }

        debug!(id = %record.id, source = %src.display(), "compiling");
        let compiled = self.toolchain.compile(&src, &exe, self.timeout).await?;
        if !compiled.success() {
            let diag = compile_diagnostic(compiled.exit, compiled.stderr.trim(), self.timeout);
            warn!(id = %record.id, "compile error");
            return Ok(self.outcome(record, OutcomeStatus::CompileError { compile_stderr: diag }));
        }

        debug!(id = %record.id, artifact = %exe.display(), "running");
        let ran = run_captured(Command::new(&exe), self.timeout)
            .await
            .map_err(|source| EnvError::Spawn { program: exe.clone(), source })?;
        let status = match ran.exit {
            Exit::Code(0) => OutcomeStatus::Ok { stdout: ran.stdout, stderr: ran.stderr },
            Exit::Code(code) => {
                warn!(id = %record.id, code, "nonzero exit");
                OutcomeStatus::RuntimeNonzero { returncode: Some(code), stdout: ran.stdout, stderr: ran.stderr }
            }
            Exit::Killed => {
                warn!(id = %record.id, "terminated by signal");
                OutcomeStatus::RuntimeNonzero { returncode: None, stdout: ran.stdout, stderr: ran.stderr }
            }
            Exit::TimedOut => {
                warn!(id = %record.id, secs = self.timeout.as_secs(), "timed out");
                OutcomeStatus::Timeout { timeout_secs: self.timeout.as_secs(), stdout: ran.stdout, stderr: ran.stderr }
            }
        };
        Ok(self.outcome(record, status))
    }

    fn outcome(&self, record: &ExampleRecord, status: OutcomeStatus) -> ExecutionOutcome {
        ExecutionOutcome { id: record.id.clone(), status }
    }
}

fn compile_diagnostic(exit: Exit, stderr: &str, limit: Duration) -> String {
    match exit {
        Exit::TimedOut => format!("compilation timed out after {}s", limit.as_secs()),
        _ if !stderr.is_empty() => stderr.to_string(),
        Exit::Code(code) => format!("compiler exited with status {}", code),
        Exit::Killed => "compiler terminated by signal".to_string(),
    }
}

fn absolute(path: &Path) -> Result<PathBuf, EnvError> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|source| EnvError::Scratch { path: path.to_path_buf(), source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_serializes_flat_with_status_tag() {
        let o = ExecutionOutcome {
            id: ExampleId::Number(3),
            status: OutcomeStatus::RuntimeNonzero { returncode: Some(1), stdout: "x".into(), stderr: String::new() },
        };
        let v = serde_json::to_value(&o).unwrap();
        assert_eq!(v["id"], 3);
        assert_eq!(v["status"], "runtime_nonzero");
        assert_eq!(v["returncode"], 1);
        assert_eq!(v["stdout"], "x");

        let c = ExecutionOutcome {
            id: ExampleId::Text("a".into()),
            status: OutcomeStatus::CompileError { compile_stderr: "boom".into() },
        };
        let v = serde_json::to_value(&c).unwrap();
        assert_eq!(v["status"], "compile_error");
        assert_eq!(v["compile_stderr"], "boom");
        assert!(v.get("stdout").is_none());
    }

    #[test]
    fn compile_error_has_no_stdout() {
        let s = OutcomeStatus::CompileError { compile_stderr: "e".into() };
        assert_eq!(s.stdout(), "");
        assert_eq!(s.label(), "compile_error");
        assert!(!s.is_ok());
    }

    #[test]
    fn diagnostic_is_never_empty() {
        let limit = Duration::from_secs(5);
        assert_eq!(compile_diagnostic(Exit::Code(1), "", limit), "compiler exited with status 1");
        assert_eq!(compile_diagnostic(Exit::Code(1), "x.c:1: error", limit), "x.c:1: error");
        assert_eq!(compile_diagnostic(Exit::TimedOut, "partial", limit), "compilation timed out after 5s");
        assert!(!compile_diagnostic(Exit::Killed, "", limit).is_empty());
    }
}
