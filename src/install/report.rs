//! Final report and caveats message.

use super::request::InstallationRequest;
use crate::PackageInfo;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// User-facing locations, resolved against the installation root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPaths {
    /// `<root>/share/<package>/examples`.
    pub examples_dir: PathBuf,
    /// `<root>/share/doc/<package>`.
    pub docs_dir: PathBuf,
}

impl ResolvedPaths {
    /// Paths for `package` under `root`.
    pub fn new(root: &Path, package: &PackageInfo) -> Self {
        let share = root.join("share");
        Self {
            examples_dir: share.join(&package.name).join("examples"),
            docs_dir: share.join("doc").join(&package.name),
        }
    }

    /// Paths for a request, using its installation root.
    pub fn for_request(request: &InstallationRequest) -> Self {
        Self::new(request.install_root(), request.package())
    }
}

/// Render the post-install caveats.
///
/// # Example
///
/// ```rust
/// use stalin_installer::{render_caveats, PackageInfo, ResolvedPaths};
/// use std::path::Path;
///
/// let paths = ResolvedPaths::new(Path::new("/usr/local"), &PackageInfo::stalin());
/// let text = render_caveats(&paths);
/// assert!(text.contains("/usr/local/share/stalin/examples/"));
/// ```
pub fn render_caveats(paths: &ResolvedPaths) -> String {
    format!(
        "Stalin has been installed with Docker integration for ARM64/Apple Silicon.\n\
         \n\
         To compile Scheme programs:\n  \
         stalin yourfile.sc\n\
         \n\
         Example programs are available in:\n  \
         {}/\n\
         \n\
         Documentation:\n  \
         {}/\n\
         \n\
         Note: First compilation may take a few minutes to download Docker images.\n",
        paths.examples_dir.display(),
        paths.docs_dir.display(),
    )
}

/// Smoke test result as shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokeTestStatus {
    /// Compiled and printed the greeting.
    Passed,
    /// Disabled by the caller.
    Skipped,
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct InstallationReport {
    /// The caveats message.
    pub message: String,
    /// Where examples and docs were installed, as shown to the user.
    pub paths: ResolvedPaths,
    /// Package that was installed.
    pub package: PackageInfo,
    /// Installed compiler.
    pub binary: PathBuf,
    /// Installed documentation files; empty if the source had no readme.
    pub docs: Vec<PathBuf>,
    /// Number of example files installed.
    pub example_files: usize,
    /// Outcome of the smoke test.
    pub smoke_test: SmokeTestStatus,
}

impl InstallationReport {
    /// Whether documentation was installed.
    pub fn has_docs(&self) -> bool {
        !self.docs.is_empty()
    }
}
