//! Static package metadata.

use serde::Serialize;

/// Descriptive metadata for the package being installed.
///
/// `name` determines the `share/<name>` and `share/doc/<name>` directories;
/// `binary` is the executable expected under `<prefix>/bin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageInfo {
    /// Package name used for share directories.
    pub name: String,
    /// Version or identifier of the source being installed.
    pub version: String,
    /// One-line description.
    pub description: String,
    /// Project homepage.
    pub homepage: String,
    /// Name of the installed compiler executable.
    pub binary: String,
}

impl PackageInfo {
    /// Metadata for the Stalin Scheme compiler.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::PackageInfo;
    ///
    /// let pkg = PackageInfo::stalin();
    /// assert_eq!(pkg.binary, "stalin");
    /// ```
    pub fn stalin() -> Self {
        Self {
            name: "stalin".to_string(),
            version: "0.11-arm64".to_string(),
            description: "Optimizing Scheme compiler with aggressive compile-time optimizations"
                .to_string(),
            homepage: "https://github.com/celicoo/stalin".to_string(),
            binary: "stalin".to_string(),
        }
    }

    /// Same package with a different version identifier.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

impl Default for PackageInfo {
    fn default() -> Self {
        Self::stalin()
    }
}
