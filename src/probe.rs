//! Environment probing for prerequisite tools.

use crate::detection::{check_version, find_executable, parse_version};
use crate::{ProbeError, ProbeOptions, ToolStatus};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Availability of a set of tools, keyed by executable name.
///
/// Absence is data: a report with missing tools is a normal result, and the
/// caller decides whether to stop.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProbeReport {
    tools: BTreeMap<String, ToolStatus>,
}

impl ProbeReport {
    /// Status of a single tool, if it was probed.
    pub fn get(&self, name: &str) -> Option<&ToolStatus> {
        self.tools.get(name)
    }

    /// Names of tools that were not found. Empty means all are present.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::{probe, ProbeOptions};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let report = probe(&["definitely-not-installed-xyz"], &ProbeOptions::default()).await;
    /// assert!(report.missing().contains("definitely-not-installed-xyz"));
    /// # }
    /// ```
    pub fn missing(&self) -> BTreeSet<String> {
        self.tools
            .iter()
            .filter(|(_, status)| !status.is_available())
            .map(|(name, _)| name.clone())
            .collect()
    }

    /// Whether every probed tool is present.
    pub fn all_present(&self) -> bool {
        self.tools.values().all(ToolStatus::is_available)
    }

    /// Availability flag per tool name.
    pub fn availability(&self) -> BTreeMap<String, bool> {
        self.tools
            .iter()
            .map(|(name, status)| (name.clone(), status.is_available()))
            .collect()
    }

    /// Iterate over `(name, status)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ToolStatus)> {
        self.tools.iter().map(|(name, status)| (name.as_str(), status))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, status: ToolStatus) {
        self.tools.insert(name.into(), status);
    }
}

/// Probe a single tool by executable name.
///
/// Never fails: a tool that is not found is `Missing`, and a tool whose
/// version banner cannot be read is `Unknown` but still available.
pub async fn probe_tool(name: &str, options: &ProbeOptions) -> ToolStatus {
    let Some(path) = find_executable(name) else {
        debug!(tool = name, "tool not found");
        return ToolStatus::Missing;
    };

    if options.skip_version {
        return ToolStatus::Available {
            path,
            version: None,
        };
    }

    let parsed = match check_version(&path, options.timeout).await {
        Ok(output) => parse_version(&output).map_err(|e| (e, output.trim().to_string())),
        Err(e) => Err((e, String::new())),
    };

    match parsed {
        Ok(version) => {
            debug!(tool = name, path = %path.display(), %version, "tool found");
            ToolStatus::Available {
                path,
                version: Some(version),
            }
        }
        Err((error, banner)) => {
            debug!(tool = name, path = %path.display(), ?error, "tool found, version unknown");
            ToolStatus::Unknown {
                path,
                error,
                message: unknown_message(name, error, &banner),
            }
        }
    }
}

fn unknown_message(name: &str, error: ProbeError, banner: &str) -> String {
    if banner.is_empty() {
        format!("Failed to check {name}: {}", error.description())
    } else {
        format!("Failed to parse version from: {banner}")
    }
}

/// Probe each named tool in turn.
///
/// Read-only: nothing is installed or modified. Duplicate names are probed
/// once.
///
/// # Example
///
/// ```rust,no_run
/// use stalin_installer::{probe, ProbeOptions};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let report = probe(&["gcc", "docker"], &ProbeOptions::default()).await;
///     for name in report.missing() {
///         println!("missing: {name}");
///     }
/// }
/// ```
pub async fn probe<S: AsRef<str>>(names: &[S], options: &ProbeOptions) -> ProbeReport {
    let mut report = ProbeReport::default();
    for name in names {
        let name = name.as_ref();
        if report.get(name).is_some() {
            continue;
        }
        let status = probe_tool(name, options).await;
        report.insert(name, status);
    }
    report
}
