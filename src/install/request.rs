//! The immutable description of one install attempt.

use crate::PackageInfo;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Optional assets found in the source tree.
///
/// Resolved once when a request is created; later stages branch on these
/// values instead of checking the filesystem again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTree {
    /// The source root that was searched.
    pub root: PathBuf,
    /// `README.md`, whose presence gates the documentation copy.
    pub readme: Option<PathBuf>,
    /// `DEVELOPMENT.md`, copied alongside the readme.
    pub development_guide: Option<PathBuf>,
    /// `benchmarks/`, mirrored as the installed examples.
    pub benchmarks: Option<PathBuf>,
}

impl SourceTree {
    /// Name of the readme that gates the documentation copy.
    pub const README: &'static str = "README.md";
    /// Name of the development guide installed with the readme.
    pub const DEVELOPMENT_GUIDE: &'static str = "DEVELOPMENT.md";
    /// Directory installed as the examples.
    pub const BENCHMARKS: &'static str = "benchmarks";

    /// Look for the optional assets under `root`.
    pub fn discover(root: &Path) -> Self {
        let file = |name: &str| Some(root.join(name)).filter(|path| path.is_file());
        Self {
            root: root.to_path_buf(),
            readme: file(Self::README),
            development_guide: file(Self::DEVELOPMENT_GUIDE),
            benchmarks: Some(root.join(Self::BENCHMARKS)).filter(|path| path.is_dir()),
        }
    }
}

/// Everything one pipeline run installs, and where.
///
/// Built once per invocation and never changed afterwards. All locations are
/// explicit fields so runs can target fabricated paths.
///
/// # Example
///
/// ```rust
/// use stalin_installer::InstallationRequest;
///
/// let request = InstallationRequest::new("/tmp/stalin-src", "/opt/stalin/0.11")
///     .with_install_root("/opt/stalin");
/// assert_eq!(request.binary_path().to_str(), Some("/opt/stalin/0.11/bin/stalin"));
/// ```
#[derive(Debug, Clone)]
pub struct InstallationRequest {
    source_dir: PathBuf,
    prefix: PathBuf,
    install_root: Option<PathBuf>,
    package: PackageInfo,
    tools: BTreeMap<String, bool>,
    source_tree: SourceTree,
}

impl InstallationRequest {
    /// Describe an install of the Stalin sources at `source_dir` into `prefix`.
    ///
    /// Relative paths are made absolute against the current directory, since
    /// the build runs from the source root but layout and the smoke test do
    /// not.
    ///
    /// Optional assets are discovered here, before anything runs. A
    /// `benchmarks/` directory created later by the build is not seen.
    pub fn new(source_dir: impl Into<PathBuf>, prefix: impl Into<PathBuf>) -> Self {
        let source_dir = absolute(source_dir.into());
        let source_tree = SourceTree::discover(&source_dir);
        Self {
            source_dir,
            prefix: absolute(prefix.into()),
            install_root: None,
            package: PackageInfo::stalin(),
            tools: BTreeMap::new(),
            source_tree,
        }
    }

    /// Root used in user-facing paths. Defaults to the prefix.
    pub fn with_install_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.install_root = Some(root.into());
        self
    }

    /// Install a different package description.
    pub fn with_package(mut self, package: PackageInfo) -> Self {
        self.package = package;
        self
    }

    /// Record known tool availability. Tools listed here are not probed.
    pub fn with_tool_availability(mut self, tools: BTreeMap<String, bool>) -> Self {
        self.tools = tools;
        self
    }

    /// Directory holding the extracted sources.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory everything is installed under.
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Root used when showing paths to the user.
    pub fn install_root(&self) -> &Path {
        self.install_root.as_deref().unwrap_or(&self.prefix)
    }

    /// Package metadata.
    pub fn package(&self) -> &PackageInfo {
        &self.package
    }

    /// Known availability of a tool, `None` if it must be probed.
    pub fn tool_available(&self, name: &str) -> Option<bool> {
        self.tools.get(name).copied()
    }

    /// Optional assets discovered when the request was created.
    pub fn source_tree(&self) -> &SourceTree {
        &self.source_tree
    }

    /// `<prefix>/bin/<binary>`.
    pub fn binary_path(&self) -> PathBuf {
        self.prefix.join("bin").join(&self.package.binary)
    }

    /// `<prefix>/share/doc/<package>`.
    pub fn docs_dir(&self) -> PathBuf {
        self.prefix.join("share/doc").join(&self.package.name)
    }

    /// `<prefix>/share/<package>/examples`.
    pub fn examples_dir(&self) -> PathBuf {
        self.prefix
            .join("share")
            .join(&self.package.name)
            .join("examples")
    }
}

fn absolute(path: PathBuf) -> PathBuf {
    std::path::absolute(&path).unwrap_or(path)
}
