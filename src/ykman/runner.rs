//! ykman process execution
//!
//! `CommandRunner` is the only place a process gets spawned. `YkmanRunner`
//! runs the real ykman through `tokio::process`; tests substitute their own
//! runner.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

use crate::config::{OathConfig, DEFAULT_YKMAN_PATH};

/// How a ykman process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Process exited on its own with the given code
    Exited(i32),
    /// Process was terminated by a signal
    Signaled(i32),
    /// Caller cancelled; the process was killed
    Cancelled,
    /// Invocation exceeded the configured timeout; the process was killed
    TimedOut,
}

impl Termination {
    pub fn success(&self) -> bool {
        matches!(self, Termination::Exited(0))
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        if let Some(code) = status.code() {
            return Termination::Exited(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return Termination::Signaled(signal);
            }
        }
        Termination::Exited(-1)
    }
}

/// Captured result of one ykman process
#[derive(Debug, Clone)]
pub struct RawOutput {
    pub stdout: String,
    pub stderr: String,
    pub termination: Termination,
}

impl RawOutput {
    fn interrupted(termination: Termination) -> Self {
        Self {
            stdout: String::new(),
            stderr: String::new(),
            termination,
        }
    }
}

/// Capability to run ykman once
///
/// Returns `Err` only when the process could not be spawned or awaited;
/// every outcome of a running process is reported through [`RawOutput`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        args: &[String],
        stdin: &[u8],
        cancel: &CancellationToken,
    ) -> io::Result<RawOutput>;
}

/// Runs the real ykman executable
#[derive(Debug, Clone)]
pub struct YkmanRunner {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl YkmanRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    pub fn from_config(config: &OathConfig) -> Self {
        Self {
            program: config.ykman_path.clone(),
            timeout: config.timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for YkmanRunner {
    fn default() -> Self {
        Self::new(DEFAULT_YKMAN_PATH)
    }
}

#[async_trait]
impl CommandRunner for YkmanRunner {
    async fn run(
        &self,
        args: &[String],
        stdin: &[u8],
        cancel: &CancellationToken,
    ) -> io::Result<RawOutput> {
        if cancel.is_cancelled() {
            return Ok(RawOutput::interrupted(Termination::Cancelled));
        }

        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        tracing::debug!("ykman process spawned with PID: {:?}", child.id());

        if let Some(mut child_stdin) = child.stdin.take() {
            // ykman may exit without ever reading stdin
            match child_stdin.write_all(stdin).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {}
                Err(e) => return Err(e),
            }
            drop(child_stdin);
        }

        let timeout = self.timeout;
        let deadline = async move {
            match timeout {
                Some(duration) => tokio::time::sleep(duration).await,
                None => std::future::pending::<()>().await,
            }
        };

        // Dropping the wait future drops the child, and kill_on_drop kills it
        tokio::select! {
            output = child.wait_with_output() => {
                let output = output?;
                Ok(RawOutput {
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    termination: output.status.into(),
                })
            }
            _ = cancel.cancelled() => {
                tracing::warn!("ykman invocation cancelled, killing process");
                Ok(RawOutput::interrupted(Termination::Cancelled))
            }
            _ = deadline => {
                tracing::warn!("ykman invocation timed out after {:?}, killing process", timeout);
                Ok(RawOutput::interrupted(Termination::TimedOut))
            }
        }
    }
}
