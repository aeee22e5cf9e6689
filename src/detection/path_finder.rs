//! PATH-based executable lookup with fallback locations.

use std::path::PathBuf;

/// Locations checked when the executable is not on PATH.
///
/// Package-manager prefixes and the Docker Desktop bundle are common places
/// for toolchains that a login shell adds to PATH but a build service does not.
const FALLBACK_PATHS: &[&str] = &[
    "/usr/local/bin",
    "/usr/bin",
    "/opt/homebrew/bin",
    "/Applications/Docker.app/Contents/Resources/bin",
];

/// Find an executable by name.
///
/// Tries the system PATH via the `which` crate first, then the fixed
/// fallback directories, then `~/.local/bin` and `~/bin`.
///
/// Returns `Some(PathBuf)` if the executable is found, `None` otherwise.
pub(crate) fn find_executable(name: &str) -> Option<PathBuf> {
    if let Ok(path) = which::which(name) {
        return Some(path);
    }

    let fallback = FALLBACK_PATHS
        .iter()
        .map(|dir| PathBuf::from(dir).join(name))
        .find(|path| path.is_file());
    if fallback.is_some() {
        return fallback;
    }

    let home = std::env::var_os("HOME")?;
    let home = PathBuf::from(home);
    [home.join(".local/bin"), home.join("bin")]
        .into_iter()
        .map(|dir| dir.join(name))
        .find(|path| path.is_file())
}
