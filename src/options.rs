//! Probe and install configuration.
//!
//! Both structs implement [`Default`]; override individual fields with
//! struct update syntax.

use crate::Tool;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for tool probing.
///
/// # Example
///
/// ```rust
/// use stalin_installer::ProbeOptions;
/// use std::time::Duration;
///
/// let opts = ProbeOptions {
///     timeout: Duration::from_secs(10),
///     ..Default::default()
/// };
/// assert!(!opts.skip_version);
/// ```
#[derive(Debug, Clone)]
pub struct ProbeOptions {
    /// Maximum time to wait for a tool's `--version` output.
    ///
    /// Default: 5 seconds
    pub timeout: Duration,

    /// Only check that tools exist; do not run `--version`.
    ///
    /// Default: `false`
    pub skip_version: bool,
}

impl Default for ProbeOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            skip_version: false,
        }
    }
}

/// Options controlling an install pipeline run.
///
/// Paths describing *what* to install live on
/// [`InstallationRequest`](crate::InstallationRequest); these options
/// describe *how*.
///
/// # Example
///
/// ```rust
/// use stalin_installer::InstallOptions;
///
/// let options = InstallOptions {
///     run_smoke_test: false,
///     ..Default::default()
/// };
/// assert_eq!(options.build_target, "install");
/// assert!(options.stage_timeout.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Executables that must be present before provisioning starts.
    ///
    /// Default: `gcc`, `docker`, `make`
    pub required_tools: Vec<String>,

    /// Continue even if some required tools are missing.
    ///
    /// Default: `false`
    pub allow_missing_tools: bool,

    /// Provisioning script, relative to the source root.
    ///
    /// Default: `docker-build.sh`
    pub provision_script: PathBuf,

    /// Treat the build environment as already provisioned.
    ///
    /// Default: `false`
    pub skip_provision: bool,

    /// Build system executable.
    ///
    /// Default: `make`
    pub build_program: String,

    /// Build system target that installs into `PREFIX`.
    ///
    /// Default: `install`
    pub build_target: String,

    /// Compile and run a test program with the installed compiler.
    ///
    /// Default: `true`
    pub run_smoke_test: bool,

    /// Directory for the smoke test program. A temporary directory is
    /// created and removed when unset.
    pub scratch_dir: Option<PathBuf>,

    /// Upper bound for each external process the pipeline runs.
    ///
    /// Applied by [`install`](crate::install) on top of the runner it is
    /// given. A process that exceeds it is killed and the run fails with
    /// [`InstallError::Timeout`](crate::InstallError::Timeout).
    ///
    /// Default: `None`. Provisioning and compiling may legitimately take a
    /// long time, so no limit is imposed unless the caller sets one.
    pub stage_timeout: Option<Duration>,

    /// Options for the prerequisite probe.
    pub probe: ProbeOptions,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            required_tools: Tool::default_names(),
            allow_missing_tools: false,
            provision_script: PathBuf::from("docker-build.sh"),
            skip_provision: false,
            build_program: "make".to_string(),
            build_target: "install".to_string(),
            run_smoke_test: true,
            scratch_dir: None,
            stage_timeout: None,
            probe: ProbeOptions::default(),
        }
    }
}
