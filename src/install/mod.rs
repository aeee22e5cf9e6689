//! The install pipeline for the Stalin compiler.
//!
//! [`install`] drives a source tree through provisioning, the build
//! system's install target, documentation and example layout, and a smoke
//! test of the installed compiler. Each stage is a hard gate.
//!
//! # Example
//!
//! ```rust,no_run
//! use stalin_installer::{install, InstallOptions, InstallationRequest, SystemRunner};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() {
//!     let request = InstallationRequest::new("./stalin-0.11", "/opt/stalin");
//!     let options = InstallOptions {
//!         run_smoke_test: false,
//!         ..Default::default()
//!     };
//!
//!     match install(&request, &options, &SystemRunner::new(), &CancellationToken::new(), |_| {}).await {
//!         Ok(report) => println!("{}", report.message),
//!         Err(e) => eprintln!("{e}\n  {}", e.fix_suggestion()),
//!     }
//! }
//! ```

mod build;
mod errors;
mod layout;
mod pipeline;
mod progress;
mod provision;
mod report;
mod request;
mod runner;
mod smoke;
#[cfg(test)]
mod test_support;

pub use build::{build, BuildPlan, BuildResult};
pub use errors::{FailureKind, InstallError};
pub use layout::{write_layout, LayoutOutcome};
pub use pipeline::install;
pub use progress::{InstallProgress, PipelineState, Stage};
pub use provision::{provision, ProvisionOutcome};
pub use report::{render_caveats, InstallationReport, ResolvedPaths, SmokeTestStatus};
pub use request::{InstallationRequest, SourceTree};
pub use runner::{CommandOutput, CommandRunner, CommandSpec, RunError, SystemRunner};
pub use smoke::{smoke_test, SmokeTestOutcome, EXPECTED_OUTPUT, TEST_PROGRAM};

use std::time::Duration;

pub(crate) fn timed_out(stage: Stage, duration: Duration) -> InstallError {
    InstallError::Timeout {
        stage,
        duration,
        fix: format!("Raise the stage timeout above {duration:?} or remove it"),
    }
}
