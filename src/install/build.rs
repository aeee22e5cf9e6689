//! Build system invocation.
//!
//! `make install PREFIX=<prefix>` is the one step that installs the compiler
//! itself; everything after it only adds auxiliary files.

use super::runner::{CommandRunner, CommandSpec, RunError};
use super::{InstallError, Stage};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// What the build system reported.
///
/// Only successful builds are returned; a failing build becomes
/// [`InstallError::Build`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    /// Whether the build system exited with status 0.
    pub success: bool,
    /// Where the compiler should now be installed.
    pub binary: PathBuf,
    /// Captured stdout followed by stderr.
    pub diagnostics: String,
}

/// The build system command and where it installs to.
#[derive(Debug, Clone)]
pub struct BuildPlan<'a> {
    /// Build system executable, e.g. `make`.
    pub program: &'a str,
    /// Target that installs into `PREFIX`, e.g. `install`.
    pub target: &'a str,
    /// Directory the build runs in.
    pub source_dir: &'a Path,
    /// Installation prefix bound to `PREFIX`.
    pub prefix: &'a Path,
    /// Installed compiler location to report.
    pub binary: PathBuf,
}

impl BuildPlan<'_> {
    /// `<program> <target> PREFIX=<prefix>`, run from the source root.
    pub fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program)
            .arg(self.target)
            .arg(format!("PREFIX={}", self.prefix.display()))
            .current_dir(self.source_dir)
    }
}

/// Run the build system's install target.
///
/// # Errors
///
/// [`InstallError::Build`] if the build system cannot be started or exits
/// non-zero. Its output is carried on the error unchanged. Files already
/// written under the prefix are left in place.
pub async fn build<R: CommandRunner + ?Sized>(
    runner: &R,
    plan: BuildPlan<'_>,
    cancel: &CancellationToken,
) -> Result<BuildResult, InstallError> {
    let command = plan.command();
    info!(command = %command.display(), "building");

    let output = runner
        .run(&command, cancel)
        .await
        .map_err(|e| match e {
            RunError::Spawn { program, source } => InstallError::Build {
                message: format!("could not start {program}: {source}"),
                exit_code: None,
                stdout: None,
                stderr: None,
                fix: format!("Install {} or pass a different build program", plan.program),
            },
            RunError::Cancelled => InstallError::Cancelled {
                stage: Stage::Build,
            },
            RunError::TimedOut(duration) => super::timed_out(Stage::Build, duration),
        })?;

    if !output.success() {
        error!(exit_code = ?output.exit_code, stderr = %output.stderr, "build failed");
        return Err(InstallError::Build {
            message: format!("{} exited with code {:?}", command.display(), output.exit_code),
            exit_code: output.exit_code,
            stdout: Some(output.stdout),
            stderr: Some(output.stderr),
            fix: "See the build output above for the failing step".to_string(),
        });
    }

    let mut diagnostics = output.stdout;
    diagnostics.push_str(&output.stderr);
    Ok(BuildResult {
        success: true,
        binary: plan.binary,
        diagnostics,
    })
}
