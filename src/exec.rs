//! exec
//!
//! Process execution boundary for CLI-backed providers.
//!
//! # Design
//!
//! The executor returns a tagged [`RawInvocation`] rather than failing on
//! any non-zero exit. Some invocation shapes (notably `diff --no-index`
//! between differing inputs) report success through a non-zero exit code, so
//! the caller must be able to inspect the outcome before deciding whether it
//! failed. [`ExecError`] is reserved for failures of execution itself:
//! the binary could not be spawned, or the invocation exceeded its timeout.
//!
//! On timeout the child is forcibly terminated and reaped before the error
//! is returned; a lingering process after a timed-out invocation is a defect.
//! Children are also spawned with kill-on-drop so that cancelling an
//! in-flight operation (dropping its future) terminates the process.
//!
//! Every invocation runs with `LC_ALL=C` and `GIT_TERMINAL_PROMPT=0`:
//! parsers rely on locale-stable output, and a CLI invoked on behalf of an
//! agent must never block on an interactive credential prompt.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::context::OperationContext;

/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// One completed tool invocation: the argument vector it was started with
/// plus its exit code and captured output.
///
/// Ephemeral; lives only inside one operation's execution and is never
/// exposed past the provider boundary except inside mapped errors.
#[derive(Debug, Clone)]
pub struct RawInvocation {
    /// Arguments the process was started with (program excluded)
    pub argv: Vec<String>,
    /// Exit code; `None` when the process was terminated by a signal
    pub exit_code: Option<i32>,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
}

impl RawInvocation {
    /// Whether the process exited zero.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }

    /// Display-only command line for diagnostics. Never re-executed and
    /// never passed to a shell.
    pub fn command_line(&self) -> String {
        self.argv.join(" ")
    }
}

/// Errors of execution itself, as opposed to tool-reported failures.
#[derive(Debug, Error)]
pub enum ExecError {
    /// The binary could not be spawned (missing, not executable).
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// The program that failed to start
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The invocation exceeded its timeout and was terminated.
    #[error("{program} timed out after {timeout:?}")]
    TimedOut {
        /// The program that was terminated
        program: String,
        /// The configured timeout
        timeout: Duration,
    },

    /// Reading captured output failed.
    #[error("failed to capture output of {program}: {source}")]
    Capture {
        /// The program whose output could not be read
        program: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Process execution abstraction injected into CLI-backed providers.
///
/// Implementations must be safe to share across concurrent operations; the
/// executor holds no per-invocation state.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `program` with `argv` in `cwd` and capture its outcome.
    ///
    /// Non-zero exits are reported through [`RawInvocation::exit_code`],
    /// not as errors; see the module docs for the rationale.
    async fn run(
        &self,
        program: &Path,
        argv: &[String],
        cwd: &Path,
        ctx: &OperationContext,
    ) -> Result<RawInvocation, ExecError>;
}

/// Executor backed by real subprocesses.
#[derive(Debug, Clone)]
pub struct SystemExecutor {
    timeout: Duration,
}

impl Default for SystemExecutor {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SystemExecutor {
    /// Create an executor with the default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an executor with a custom per-invocation timeout.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Executor for SystemExecutor {
    async fn run(
        &self,
        program: &Path,
        argv: &[String],
        cwd: &Path,
        ctx: &OperationContext,
    ) -> Result<RawInvocation, ExecError> {
        let program_display = program.display().to_string();

        tracing::debug!(
            program = %program_display,
            argv = %argv.join(" "),
            cwd = %cwd.display(),
            request = %ctx.request_id,
            "spawning"
        );

        let mut child = Command::new(program)
            .args(argv)
            .current_dir(cwd)
            .env("LC_ALL", "C")
            .env("GIT_TERMINAL_PROMPT", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program_display.clone(),
                source,
            })?;

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let wait = async {
            let mut stdout = Vec::new();
            let mut stderr = Vec::new();
            // Drain both pipes concurrently; reading them in sequence can
            // deadlock against a child that fills the other pipe first.
            let drain_stdout = async {
                if let Some(pipe) = stdout_pipe.as_mut() {
                    pipe.read_to_end(&mut stdout).await?;
                }
                Ok::<_, std::io::Error>(())
            };
            let drain_stderr = async {
                if let Some(pipe) = stderr_pipe.as_mut() {
                    pipe.read_to_end(&mut stderr).await?;
                }
                Ok::<_, std::io::Error>(())
            };
            tokio::try_join!(drain_stdout, drain_stderr)?;
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout, stderr))
        };

        let outcome = timeout(self.timeout, wait).await;
        match outcome {
            Ok(Ok((status, stdout, stderr))) => {
                let invocation = RawInvocation {
                    argv: argv.to_vec(),
                    exit_code: status.code(),
                    stdout: String::from_utf8_lossy(&stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&stderr).into_owned(),
                };
                tracing::trace!(
                    exit = ?invocation.exit_code,
                    request = %ctx.request_id,
                    "completed"
                );
                Ok(invocation)
            }
            Ok(Err(source)) => Err(ExecError::Capture {
                program: program_display,
                source,
            }),
            Err(_) => {
                // Kill and reap; no orphan may outlive the timeout.
                let _ = child.kill().await;
                tracing::warn!(
                    program = %program_display,
                    timeout = ?self.timeout,
                    request = %ctx.request_id,
                    "timed out, terminated"
                );
                Err(ExecError::TimedOut {
                    program: program_display,
                    timeout: self.timeout,
                })
            }
        }
    }
}
