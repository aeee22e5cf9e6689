//! Async version check with timeout.

use crate::ProbeError;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;

/// Run `<path> --version` and capture its output.
///
/// The child is killed if `limit` elapses first. Output is stdout when
/// non-empty, otherwise stderr (some tools print their banner there).
///
/// # Errors
///
/// - `Timeout` if the command takes longer than `limit`
/// - `PermissionDenied` if the executable cannot be run due to permissions
/// - `IoError` for other I/O failures or non-zero exit codes
/// - `VersionParseFailed` if output is not valid UTF-8
pub(crate) async fn check_version(path: &Path, limit: Duration) -> Result<String, ProbeError> {
    let mut command = Command::new(path);
    command.arg("--version").kill_on_drop(true);

    let output = timeout(limit, command.output())
        .await
        .map_err(|_| ProbeError::Timeout)?
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                ProbeError::PermissionDenied
            } else {
                ProbeError::IoError
            }
        })?;

    if !output.status.success() {
        return Err(ProbeError::IoError);
    }

    let out = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };

    String::from_utf8(out).map_err(|_| ProbeError::VersionParseFailed)
}
