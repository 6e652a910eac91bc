//! Subprocess runner with output capture and a wall-clock limit.

use std::{
    io,
    process::Stdio,
    sync::{Arc, Mutex},
    time::Duration,
};

use tokio::{
    io::{AsyncRead, AsyncReadExt},
    process::Command,
    task::JoinHandle,
    time::timeout,
};

/// How long to wait for the pipes to drain once the child is gone.
const DRAIN_GRACE: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Code(i32),
    /// Terminated without an exit code (signal).
    Killed,
    TimedOut,
}

#[derive(Debug, Clone)]
pub struct Captured {
    pub exit: Exit,
    pub stdout: String,
    pub stderr: String,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.exit == Exit::Code(0)
    }
}

/// Spawn `cmd`, wait at most `limit`, and collect whatever it wrote.
///
/// Errors only when the process cannot be spawned or waited on; a timeout
/// kills the child and is reported through [`Exit::TimedOut`].
pub async fn run_captured(mut cmd: Command, limit: Duration) -> io::Result<Captured> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd.spawn()?;
    let out_buf = Buffer::default();
    let err_buf = Buffer::default();
    let out_task = tokio::spawn(read_all(child.stdout.take(), out_buf.clone()));
    let err_task = tokio::spawn(read_all(child.stderr.take(), err_buf.clone()));

    let exit = match timeout(limit, child.wait()).await {
        Ok(status) => match status?.code() {
            Some(code) => Exit::Code(code),
            None => Exit::Killed,
        },
        Err(_) => {
            let _ = child.kill().await;
            Exit::TimedOut
        }
    };

    let (stdout, stderr) = tokio::join!(drain(out_task, out_buf), drain(err_task, err_buf));
    Ok(Captured { exit, stdout, stderr })
}

type Buffer = Arc<Mutex<Vec<u8>>>;

async fn read_all<R: AsyncRead + Unpin>(pipe: Option<R>, buf: Buffer) {
    let Some(mut pipe) = pipe else { return };
    let mut chunk = [0u8; 8192];
    loop {
        match pipe.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                if let Ok(mut b) = buf.lock() {
                    b.extend_from_slice(&chunk[..n]);
                }
            }
        }
    }
}

/// Wait briefly for EOF, then keep whatever was read so far. A pipe held
/// open by a grandchild would otherwise never close.
async fn drain(task: JoinHandle<()>, buf: Buffer) -> String {
    let abort = task.abort_handle();
    if timeout(DRAIN_GRACE, task).await.is_err() {
        abort.abort();
    }
    let bytes = match buf.lock() {
        Ok(b) => b.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    };
    String::from_utf8_lossy(&bytes).into_owned()
}
