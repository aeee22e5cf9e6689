//! Tool status types representing probe results.

use semver::Version;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Typed reasons a present tool could not be fully inspected.
///
/// These never make a tool count as missing on their own; see
/// [`ToolStatus::is_available`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum ProbeError {
    /// Timed out while running `--version`.
    Timeout,

    /// Permission denied executing the tool.
    PermissionDenied,

    /// The `--version` output held no recognizable version.
    VersionParseFailed,

    /// I/O error while running the tool.
    IoError,
}

impl ProbeError {
    /// Human-readable description of the error.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::ProbeError;
    ///
    /// assert_eq!(ProbeError::Timeout.description(), "Version check timed out");
    /// ```
    pub fn description(&self) -> &'static str {
        match self {
            Self::Timeout => "Version check timed out",
            Self::PermissionDenied => "Permission denied",
            Self::VersionParseFailed => "Failed to parse version",
            Self::IoError => "I/O error during version check",
        }
    }
}

/// Result of probing a single tool.
///
/// # Example
///
/// ```rust
/// use stalin_installer::ToolStatus;
///
/// let status = ToolStatus::Missing;
/// assert!(!status.is_available());
/// assert!(status.path().is_none());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ToolStatus {
    /// The executable was found.
    Available {
        /// Resolved path to the executable.
        path: PathBuf,
        /// Parsed version, `None` when version checks were skipped.
        version: Option<Version>,
    },

    /// The executable is not on PATH or in any fallback location.
    Missing,

    /// The executable was found but its version could not be determined.
    Unknown {
        /// Resolved path to the executable.
        path: PathBuf,
        /// Typed error variant for programmatic handling.
        error: ProbeError,
        /// Human-readable message for display.
        message: String,
    },
}

impl ToolStatus {
    /// Whether the tool can be invoked.
    ///
    /// A tool with an unreadable version is still present, so `Unknown`
    /// counts as available: the install does not impose version constraints.
    pub fn is_available(&self) -> bool {
        !matches!(self, Self::Missing)
    }

    /// Path to the executable, if found.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Available { path, .. } | Self::Unknown { path, .. } => Some(path),
            Self::Missing => None,
        }
    }

    /// Parsed version, if known.
    pub fn version(&self) -> Option<&Version> {
        match self {
            Self::Available { version, .. } => version.as_ref(),
            _ => None,
        }
    }
}
