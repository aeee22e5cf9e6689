//! Error types for installation operations.
//!
//! Every pipeline failure is fatal and carries a `fix` suggestion. Variants
//! map one-to-one onto the stage that failed, so a caller can tell a failing
//! build tool apart from an installed compiler that does not work.

use super::progress::Stage;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Coarse classification of an [`InstallError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Required tools were missing.
    Prerequisites,
    /// The build environment could not be provisioned.
    Provisioning,
    /// The build system failed to build or install.
    Build,
    /// Auxiliary assets could not be copied after a successful build.
    Layout,
    /// The installed compiler is present but does not work.
    Verification,
    /// The run was interrupted.
    Cancelled,
    /// An external process exceeded the caller's time limit.
    Timeout,
}

/// Errors that can occur during an install pipeline run.
///
/// # Example
///
/// ```rust
/// use stalin_installer::{FailureKind, InstallError};
///
/// fn handle_error(error: InstallError) {
///     if error.kind() == FailureKind::Verification {
///         eprintln!("installed, but broken: {error}");
///     }
///     eprintln!("To fix: {}", error.fix_suggestion());
/// }
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InstallError {
    /// One or more required tools are not installed.
    #[error("Missing prerequisites: {}", join(.missing))]
    PrerequisitesMissing {
        /// Executable names that were not found.
        missing: BTreeSet<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The provisioning script failed; nothing was installed.
    #[error("Provisioning failed: {message}")]
    Provisioning {
        /// Description of the failure.
        message: String,
        /// Exit code, if the process ran to completion.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: Option<String>,
        /// Captured standard error.
        stderr: Option<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The build system failed. The prefix is left as the build left it.
    #[error("Build failed: {message}")]
    Build {
        /// Description of the failure.
        message: String,
        /// Exit code, if the process ran to completion.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: Option<String>,
        /// Captured standard error.
        stderr: Option<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// Copying docs or examples failed after a successful build.
    #[error("Layout failed for {}: {message}", .path.display())]
    Layout {
        /// Description of the failure.
        message: String,
        /// The file or directory involved.
        path: PathBuf,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The installed compiler could not compile or run the test program.
    #[error("Verification failed: {reason}")]
    Verification {
        /// What went wrong.
        reason: String,
        /// Output captured from the compiler or the compiled program.
        output: Option<String>,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },

    /// The run was cancelled while a stage was in progress.
    #[error("Installation cancelled during {stage}")]
    Cancelled {
        /// Stage that was interrupted.
        stage: Stage,
    },

    /// An external process ran longer than the configured stage timeout.
    #[error("{stage} timed out after {duration:?}")]
    Timeout {
        /// Stage that timed out.
        stage: Stage,
        /// Configured limit.
        duration: Duration,
        /// Actionable suggestion for resolving the issue.
        fix: String,
    },
}

fn join(names: &BTreeSet<String>) -> String {
    names.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl InstallError {
    /// Get an actionable suggestion for fixing this error.
    pub fn fix_suggestion(&self) -> &str {
        match self {
            Self::PrerequisitesMissing { fix, .. } => fix,
            Self::Provisioning { fix, .. } => fix,
            Self::Build { fix, .. } => fix,
            Self::Layout { fix, .. } => fix,
            Self::Verification { fix, .. } => fix,
            Self::Cancelled { .. } => "Re-run the installation; completed stages are safe to repeat",
            Self::Timeout { fix, .. } => fix,
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::PrerequisitesMissing { .. } => FailureKind::Prerequisites,
            Self::Provisioning { .. } => FailureKind::Provisioning,
            Self::Build { .. } => FailureKind::Build,
            Self::Layout { .. } => FailureKind::Layout,
            Self::Verification { .. } => FailureKind::Verification,
            Self::Cancelled { .. } => FailureKind::Cancelled,
            Self::Timeout { .. } => FailureKind::Timeout,
        }
    }

    /// Captured standard error of the failing process, if any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::Provisioning { stderr, .. } | Self::Build { stderr, .. } => stderr.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_error() -> InstallError {
        InstallError::Build {
            message: "make exited with code Some(2)".to_string(),
            exit_code: Some(2),
            stdout: None,
            stderr: Some("gcc: error".to_string()),
            fix: "Check the build output".to_string(),
        }
    }

    #[test]
    fn test_prerequisites_display() {
        let error = InstallError::PrerequisitesMissing {
            missing: ["docker".to_string(), "gcc".to_string()].into(),
            fix: "Install them".to_string(),
        };
        assert_eq!(error.to_string(), "Missing prerequisites: docker, gcc");
        assert_eq!(error.kind(), FailureKind::Prerequisites);
    }

    #[test]
    fn test_build_and_verification_are_distinct() {
        let verification = InstallError::Verification {
            reason: "compiled program not found".to_string(),
            output: None,
            fix: "Reinstall".to_string(),
        };
        assert_eq!(build_error().kind(), FailureKind::Build);
        assert_eq!(verification.kind(), FailureKind::Verification);
        assert_ne!(build_error().kind(), verification.kind());
    }

    #[test]
    fn test_stderr_accessor() {
        assert_eq!(build_error().stderr(), Some("gcc: error"));
        let cancelled = InstallError::Cancelled {
            stage: Stage::Build,
        };
        assert_eq!(cancelled.stderr(), None);
    }

    #[test]
    fn test_cancelled_display() {
        let error = InstallError::Cancelled {
            stage: Stage::Provision,
        };
        assert_eq!(error.to_string(), "Installation cancelled during provisioning");
        assert_eq!(error.kind(), FailureKind::Cancelled);
    }

    #[test]
    fn test_layout_display_includes_path() {
        let error = InstallError::Layout {
            message: "source directory missing".to_string(),
            path: PathBuf::from("/src/benchmarks"),
            fix: "Restore benchmarks/".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Layout failed for /src/benchmarks: source directory missing"
        );
    }

    #[test]
    fn test_all_variants_have_fix() {
        let errors = vec![
            build_error(),
            InstallError::Provisioning {
                message: "exit 1".to_string(),
                exit_code: Some(1),
                stdout: None,
                stderr: None,
                fix: "Is the Docker daemon running?".to_string(),
            },
            InstallError::Cancelled {
                stage: Stage::Verify,
            },
            InstallError::Timeout {
                stage: Stage::Build,
                duration: Duration::from_secs(60),
                fix: "Raise the timeout".to_string(),
            },
        ];
        for error in errors {
            assert!(!error.fix_suggestion().is_empty(), "{error:?}");
        }
    }
}
