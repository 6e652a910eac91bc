//! External C compiler contract: `<compiler> <source> -o <artifact> [flags...]`.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use tokio::process::Command;
use tracing::debug;

use super::{
    process::{run_captured, Captured, Exit},
    EnvError,
};

const PROBE_LIMIT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Toolchain {
    pub program: String,
    pub flags: Vec<String>,
}

impl Toolchain {
    pub fn new(program: impl Into<String>, flags: Vec<String>) -> Self {
        Self { program: program.into(), flags }
    }

    /// Run `<compiler> --version` once so a missing toolchain fails the
    /// whole run instead of every example.
    pub async fn probe(&self) -> Result<String, EnvError> {
        self.probe_within(PROBE_LIMIT).await
    }

    pub async fn probe_within(&self, limit: Duration) -> Result<String, EnvError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--version");
        let unavailable = |source: io::Error| EnvError::CompilerUnavailable { program: self.program.clone(), source };
        let out = run_captured(cmd, limit).await.map_err(unavailable)?;
        if out.exit == Exit::TimedOut {
            return Err(unavailable(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("`--version` did not finish within {}s", limit.as_secs()),
            )));
        }
        let banner = out.stdout.lines().next().unwrap_or_default().trim().to_string();
        debug!(compiler = %self.program, %banner, "toolchain probed");
        Ok(banner)
    }

    pub async fn compile(&self, source: &Path, artifact: &Path, limit: Duration) -> Result<Captured, EnvError> {
        let mut cmd = Command::new(&self.program);
        cmd.arg(source).arg("-o").arg(artifact).args(&self.flags);
        run_captured(cmd, limit)
            .await
            .map_err(|source| EnvError::Spawn { program: PathBuf::from(&self.program), source })
    }
}

pub fn source_path(scratch: &Path, stem: &str) -> PathBuf {
    scratch.join(format!("{}.c", stem))
}

pub fn artifact_path(scratch: &Path, stem: &str) -> PathBuf {
    if cfg!(windows) {
        scratch.join(format!("{}.exe", stem))
    } else {
        scratch.join(stem)
    }
}
