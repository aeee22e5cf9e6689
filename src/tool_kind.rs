//! Tool enum identifying the external programs an installation depends on.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

/// An external tool the install pipeline relies on.
///
/// These are the default prerequisites checked before a build is attempted.
/// The probe itself works on plain executable names, so callers may check
/// tools outside this list as well.
///
/// This enum is marked `#[non_exhaustive]` to allow adding new tools in
/// future versions.
///
/// # Example
///
/// ```rust
/// use stalin_installer::Tool;
///
/// for tool in Tool::all() {
///     println!("{}: {}", tool.display_name(), tool.executable_name());
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[non_exhaustive]
pub enum Tool {
    /// The host C compiler used by the generated code.
    Gcc,
    /// The container runtime hosting the build environment.
    Docker,
    /// The build system driving `make install`.
    Make,
}

impl Tool {
    /// The executable name to search for in PATH.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::Tool;
    ///
    /// assert_eq!(Tool::Docker.executable_name(), "docker");
    /// ```
    pub fn executable_name(&self) -> &'static str {
        match self {
            Self::Gcc => "gcc",
            Self::Docker => "docker",
            Self::Make => "make",
        }
    }

    /// Human-readable display name for the tool.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gcc => "GCC",
            Self::Docker => "Docker",
            Self::Make => "GNU Make",
        }
    }

    /// Where to get the tool when it is missing.
    pub fn install_hint(&self) -> &'static str {
        match self {
            Self::Gcc => "https://gcc.gnu.org/install/",
            Self::Docker => "https://docs.docker.com/get-docker/",
            Self::Make => "https://www.gnu.org/software/make/",
        }
    }

    /// Look up a tool by its executable name.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::Tool;
    ///
    /// assert_eq!(Tool::from_executable("gcc"), Some(Tool::Gcc));
    /// assert_eq!(Tool::from_executable("clang"), None);
    /// ```
    pub fn from_executable(name: &str) -> Option<Self> {
        Self::all().find(|tool| tool.executable_name() == name)
    }

    /// Iterator over all known tools.
    pub fn all() -> impl Iterator<Item = Self> {
        <Self as IntoEnumIterator>::iter()
    }

    /// Executable names of all known tools, in declaration order.
    pub fn default_names() -> Vec<String> {
        Self::all()
            .map(|tool| tool.executable_name().to_string())
            .collect()
    }
}
