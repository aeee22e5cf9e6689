//! External process execution.
//!
//! Stages describe what to run as a [`CommandSpec`] and hand it to a
//! [`CommandRunner`]. [`SystemRunner`] spawns real processes; tests supply
//! their own runner to record invocations.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// A process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program name or path.
    pub program: PathBuf,
    /// Arguments.
    pub args: Vec<String>,
    /// Working directory, inherited when unset.
    pub current_dir: Option<PathBuf>,
}

impl CommandSpec {
    /// A command with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// Append one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Run from `dir`.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Shell-like rendering for logs and messages.
    pub fn display(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if terminated by a signal.
    pub exit_code: Option<i32>,
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
}

impl CommandOutput {
    /// Whether the process exited with status 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Ways a process can fail to produce a [`CommandOutput`].
#[derive(Debug, Error)]
pub enum RunError {
    /// The process could not be started.
    #[error("failed to start {program}: {source}")]
    Spawn {
        /// Program that failed to start.
        program: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The cancellation token fired; the process was killed.
    #[error("cancelled")]
    Cancelled,

    /// The process exceeded its time limit and was killed.
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
}

/// Runs external processes to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `spec`, capturing its output.
    ///
    /// Must stop the process and return [`RunError::Cancelled`] once
    /// `cancel` fires. A non-zero exit is a normal [`CommandOutput`].
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError>;
}

/// Runs commands as real child processes.
///
/// Children are killed when the run is cancelled or times out.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    timeout: Option<Duration>,
}

impl SystemRunner {
    /// A runner with no time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill processes that run longer than `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for SystemRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &spec.current_dir {
            command.current_dir(dir);
        }

        debug!(command = %spec.display(), "spawning");
        let child = command.spawn().map_err(|source| RunError::Spawn {
            program: spec.program.display().to_string(),
            source,
        })?;

        // Dropping the wait future drops the child, which kills it.
        let wait = child.wait_with_output();
        let waited = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RunError::Cancelled),
            result = with_limit(self.timeout, wait) => result?,
        };
        let output = waited.map_err(|source| RunError::Spawn {
            program: spec.program.display().to_string(),
            source,
        })?;

        Ok(CommandOutput {
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

/// Applies a time limit to every command run through another runner.
pub(crate) struct TimeLimited<'a, R: ?Sized> {
    inner: &'a R,
    limit: Option<Duration>,
}

impl<'a, R: ?Sized> TimeLimited<'a, R> {
    pub(crate) fn new(inner: &'a R, limit: Option<Duration>) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<'a, R: CommandRunner + ?Sized> CommandRunner for TimeLimited<'a, R> {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        with_limit(self.limit, self.inner.run(spec, cancel)).await?
    }
}

async fn with_limit<F: std::future::Future>(
    limit: Option<Duration>,
    future: F,
) -> Result<F::Output, RunError> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| RunError::TimedOut(limit)),
        None => Ok(future.await),
    }
}
