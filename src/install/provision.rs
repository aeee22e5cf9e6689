//! Build environment provisioning.
//!
//! Runs the source tree's container build script. The image it produces
//! outlives the run and is reused by later installs; nothing here tears it
//! down or retries a failed attempt.

use super::runner::{CommandOutput, CommandRunner, CommandSpec, RunError};
use super::{InstallError, Stage};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Output of a successful provisioning run.
#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    /// The command that was run.
    pub command: CommandSpec,
    /// What it printed.
    pub output: CommandOutput,
}

/// Run `script` with no arguments from `source_dir`.
///
/// Relative script paths are resolved against `source_dir`.
///
/// # Errors
///
/// [`InstallError::Provisioning`] if the script cannot be started or exits
/// non-zero; [`InstallError::Cancelled`] or [`InstallError::Timeout`] if the
/// run was interrupted.
pub async fn provision<R: CommandRunner + ?Sized>(
    runner: &R,
    source_dir: &Path,
    script: &Path,
    cancel: &CancellationToken,
) -> Result<ProvisionOutcome, InstallError> {
    let command = CommandSpec::new(source_dir.join(script)).current_dir(source_dir);
    info!(command = %command.display(), "provisioning build environment");

    let output = runner
        .run(&command, cancel)
        .await
        .map_err(|e| match e {
            RunError::Spawn { program, source } => InstallError::Provisioning {
                message: format!("could not start {program}: {source}"),
                exit_code: None,
                stdout: None,
                stderr: None,
                fix: format!(
                    "Make sure {} exists in the source tree and is executable",
                    script.display()
                ),
            },
            RunError::Cancelled => InstallError::Cancelled {
                stage: Stage::Provision,
            },
            RunError::TimedOut(duration) => super::timed_out(Stage::Provision, duration),
        })?;

    if !output.success() {
        error!(exit_code = ?output.exit_code, stderr = %output.stderr, "provisioning failed");
        return Err(InstallError::Provisioning {
            message: format!("{} exited with code {:?}", command.display(), output.exit_code),
            exit_code: output.exit_code,
            stdout: Some(output.stdout),
            stderr: Some(output.stderr),
            fix: "Check that the container runtime is running, then re-run the install"
                .to_string(),
        });
    }

    Ok(ProvisionOutcome { command, output })
}
