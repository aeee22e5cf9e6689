//! End-to-end check of the installed compiler.
//!
//! Compiles a two-statement Scheme program with the freshly installed
//! binary, runs the result and looks for its greeting on stdout.

use super::runner::{CommandOutput, CommandRunner, CommandSpec, RunError};
use super::{InstallError, Stage};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Source of the test program.
pub const TEST_PROGRAM: &str = "(display \"Hello from Stalin!\")(newline)";

/// Text the compiled program must print.
pub const EXPECTED_OUTPUT: &str = "Hello from Stalin!";

/// File name of the test program inside the scratch directory.
pub const TEST_SOURCE: &str = "test.sc";

/// Result of a passing smoke test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmokeTestOutcome {
    /// Path of the compiled test program.
    pub artifact: PathBuf,
    /// Whether the compiled program existed after compiling.
    pub artifact_exists: bool,
    /// Standard output of the compiled program.
    pub output: String,
    /// Whether `output` contained [`EXPECTED_OUTPUT`].
    pub passed: bool,
}

/// Compile and run the test program in `scratch_dir`.
///
/// The compiled program is expected next to the source with the extension
/// removed; it is only executed if it exists.
///
/// # Errors
///
/// [`InstallError::Verification`] if the compiler cannot be started, exits
/// non-zero, produces no program, or the program's output lacks the
/// greeting. This is distinct from [`InstallError::Build`]: the build
/// succeeded but what it installed does not work.
pub async fn smoke_test<R: CommandRunner + ?Sized>(
    runner: &R,
    compiler: &Path,
    scratch_dir: &Path,
    cancel: &CancellationToken,
) -> Result<SmokeTestOutcome, InstallError> {
    let source = scratch_dir.join(TEST_SOURCE);
    tokio::fs::write(&source, TEST_PROGRAM)
        .await
        .map_err(|e| verification(format!("could not write {}: {e}", source.display()), None))?;
    debug!(source = %source.display(), "wrote test program");

    let artifact = source.with_extension("");
    remove_stale(&artifact).await?;

    let compile = CommandSpec::new(compiler)
        .arg(source.display().to_string())
        .current_dir(scratch_dir);
    info!(command = %compile.display(), "compiling test program");
    let compiled = run(runner, &compile, cancel).await?;
    if !compiled.success() {
        error!(exit_code = ?compiled.exit_code, stderr = %compiled.stderr, "compiler failed");
        return Err(verification(
            format!("compiler exited with code {:?}", compiled.exit_code),
            Some(combined(&compiled)),
        ));
    }

    if !artifact.is_file() {
        return Err(verification(
            format!("compiled program {} was not produced", artifact.display()),
            Some(combined(&compiled)),
        ));
    }

    let executed = run(runner, &CommandSpec::new(&artifact).current_dir(scratch_dir), cancel).await?;
    if !executed.success() {
        return Err(verification(
            format!("test program exited with code {:?}", executed.exit_code),
            Some(combined(&executed)),
        ));
    }

    let passed = executed.stdout.contains(EXPECTED_OUTPUT);
    if !passed {
        return Err(verification(
            format!("test program output did not contain {EXPECTED_OUTPUT:?}"),
            Some(executed.stdout),
        ));
    }

    Ok(SmokeTestOutcome {
        artifact,
        artifact_exists: true,
        output: executed.stdout,
        passed,
    })
}

async fn run<R: CommandRunner + ?Sized>(
    runner: &R,
    spec: &CommandSpec,
    cancel: &CancellationToken,
) -> Result<CommandOutput, InstallError> {
    runner.run(spec, cancel).await.map_err(|e| match e {
        RunError::Spawn { program, source } => {
            verification(format!("could not run {program}: {source}"), None)
        }
        RunError::Cancelled => InstallError::Cancelled {
            stage: Stage::Verify,
        },
        RunError::TimedOut(duration) => super::timed_out(Stage::Verify, duration),
    })
}

/// Remove a compiled program left by an earlier run in the same directory.
async fn remove_stale(artifact: &Path) -> Result<(), InstallError> {
    match tokio::fs::remove_file(artifact).await {
        Ok(()) => {
            debug!(artifact = %artifact.display(), "removed stale test program");
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(verification(
            format!("could not remove stale {}: {e}", artifact.display()),
            None,
        )),
    }
}

fn combined(output: &CommandOutput) -> String {
    format!("{}{}", output.stdout, output.stderr)
}

fn verification(reason: String, output: Option<String>) -> InstallError {
    InstallError::Verification {
        reason,
        output,
        fix: "The compiler was installed but does not work; check the build log and reinstall"
            .to_string(),
    }
}
