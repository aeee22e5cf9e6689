//! # stalin-installer
//!
//! Installs the Stalin Scheme compiler from an extracted source tree.
//!
//! The crate checks for the external tools the build needs, provisions the
//! containerized build environment, runs `make install PREFIX=<prefix>`,
//! copies documentation and examples, and verifies the result by compiling
//! and running a small program with the installed compiler.
//!
//! ## Features
//!
//! - `Tool` enum identifying the prerequisite tools
//! - `probe()` async function reporting which tools are missing
//! - `InstallationRequest` describing one install attempt
//! - `install()` async function running the whole pipeline with progress
//!   callbacks and cancellation
//! - `CommandRunner` trait for substituting how external commands run
//!
//! ## Example
//!
//! ```rust,no_run
//! use stalin_installer::{install, probe, InstallOptions, InstallationRequest, SystemRunner, Tool};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let report = probe(&Tool::default_names(), &Default::default()).await;
//!     if !report.all_present() {
//!         eprintln!("missing: {:?}", report.missing());
//!         return;
//!     }
//!
//!     let request = InstallationRequest::new("./stalin-0.11", "/usr/local")
//!         .with_tool_availability(report.availability());
//!     let result = install(
//!         &request,
//!         &InstallOptions::default(),
//!         &SystemRunner::new(),
//!         &CancellationToken::new(),
//!         |progress| println!("{}", progress.description()),
//!     )
//!     .await;
//!
//!     match result {
//!         Ok(report) => println!("{}", report.message),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

mod detection;
mod install;
mod options;
mod package;
mod probe;
mod tool_kind;
mod tool_status;

pub use install::{
    build, install, provision, render_caveats, smoke_test, write_layout, BuildPlan, BuildResult,
    CommandOutput, CommandRunner, CommandSpec, FailureKind, InstallError, InstallProgress,
    InstallationReport, InstallationRequest, LayoutOutcome, PipelineState, ProvisionOutcome,
    ResolvedPaths, RunError, SmokeTestOutcome, SmokeTestStatus, SourceTree, Stage, SystemRunner,
    EXPECTED_OUTPUT, TEST_PROGRAM,
};
pub use options::{InstallOptions, ProbeOptions};
pub use package::PackageInfo;
pub use probe::{probe, probe_tool, ProbeReport};
pub use tool_kind::Tool;
pub use tool_status::{ProbeError, ToolStatus};
