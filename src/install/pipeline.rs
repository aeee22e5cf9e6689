//! The install pipeline.
//!
//! Probe, provision, build, lay out, verify and report, strictly in that
//! order. The first failure moves the run to [`PipelineState::Failed`] and
//! nothing after it runs.

use super::build::{build, BuildPlan};
use super::layout::{write_layout, LayoutOutcome};
use super::provision::provision;
use super::report::{render_caveats, InstallationReport, ResolvedPaths, SmokeTestStatus};
use super::request::{InstallationRequest, SourceTree};
use super::runner::{CommandRunner, TimeLimited};
use super::smoke::smoke_test;
use super::{InstallError, InstallProgress, PipelineState, Stage};
use crate::{probe, InstallOptions, Tool};
use std::collections::BTreeSet;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Run a complete installation.
///
/// Progress events, including every state transition, go to `on_progress`.
/// Every external process is limited by
/// [`InstallOptions::stage_timeout`], whichever runner is passed.
/// Cancelling `cancel` kills the running external process and ends the run
/// with [`InstallError::Cancelled`].
///
/// Files written before a failure stay where they are; re-running with the
/// same request converges on the same layout.
///
/// # Errors
///
/// The [`InstallError`] of the first stage that failed.
///
/// # Example
///
/// ```rust,no_run
/// use stalin_installer::{install, InstallOptions, InstallationRequest, SystemRunner};
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() {
///     let request = InstallationRequest::new("./stalin-0.11", "/usr/local");
///     let result = install(
///         &request,
///         &InstallOptions::default(),
///         &SystemRunner::new(),
///         &CancellationToken::new(),
///         |progress| println!("{}", progress.description()),
///     )
///     .await;
///
///     match result {
///         Ok(report) => println!("{}", report.message),
///         Err(e) => eprintln!("Failed: {e}. Fix: {}", e.fix_suggestion()),
///     }
/// }
/// ```
pub async fn install<R, F>(
    request: &InstallationRequest,
    options: &InstallOptions,
    runner: &R,
    cancel: &CancellationToken,
    on_progress: F,
) -> Result<InstallationReport, InstallError>
where
    R: CommandRunner + ?Sized,
    F: Fn(InstallProgress) + Send + Sync,
{
    let mut tracker = Tracker {
        state: PipelineState::Init,
        on_progress: &on_progress,
    };
    let result = run_stages(request, options, runner, cancel, &mut tracker).await;
    if let Err(e) = &result {
        error!(state = ?tracker.state, kind = ?e.kind(), "installation failed: {e}");
        tracker.advance(PipelineState::Failed);
    }
    result
}

struct Tracker<'a, F> {
    state: PipelineState,
    on_progress: &'a F,
}

impl<F: Fn(InstallProgress)> Tracker<'_, F> {
    fn emit(&self, progress: InstallProgress) {
        (self.on_progress)(progress);
    }

    fn start(&self, stage: Stage) {
        info!("{}", InstallProgress::StageStarted { stage }.description());
        self.emit(InstallProgress::StageStarted { stage });
    }

    fn skip(&self, stage: Stage, reason: &str) {
        info!(%stage, reason, "stage skipped");
        self.emit(InstallProgress::StageSkipped {
            stage,
            reason: reason.to_string(),
        });
    }

    fn advance(&mut self, to: PipelineState) {
        if !self.state.can_transition_to(to) {
            warn!(from = ?self.state, to = ?to, "ignoring illegal state transition");
            return;
        }
        let from = self.state;
        self.state = to;
        debug!(?from, ?to, "state changed");
        self.emit(InstallProgress::StateChanged { from, to });
    }

    fn complete(&mut self, stage: Stage) {
        self.advance(stage.completes());
    }
}

async fn run_stages<R, F>(
    request: &InstallationRequest,
    options: &InstallOptions,
    runner: &R,
    cancel: &CancellationToken,
    tracker: &mut Tracker<'_, F>,
) -> Result<InstallationReport, InstallError>
where
    R: CommandRunner + ?Sized,
    F: Fn(InstallProgress),
{
    let runner = &TimeLimited::new(runner, options.stage_timeout);

    // Probe
    ensure_running(cancel, Stage::Probe)?;
    tracker.start(Stage::Probe);
    let missing = missing_tools(request, options).await;
    if !missing.is_empty() {
        if !options.allow_missing_tools {
            return Err(prerequisites_missing(missing));
        }
        warn!(missing = ?missing, "continuing without required tools");
    }
    tracker.complete(Stage::Probe);

    // Provision
    ensure_running(cancel, Stage::Provision)?;
    if options.skip_provision {
        tracker.skip(Stage::Provision, "provisioning disabled");
    } else {
        tracker.start(Stage::Provision);
        provision(
            runner,
            request.source_dir(),
            &options.provision_script,
            cancel,
        )
        .await?;
    }
    tracker.complete(Stage::Provision);

    // Build
    ensure_running(cancel, Stage::Build)?;
    tracker.start(Stage::Build);
    let built = build(
        runner,
        BuildPlan {
            program: &options.build_program,
            target: &options.build_target,
            source_dir: request.source_dir(),
            prefix: request.prefix(),
            binary: request.binary_path(),
        },
        cancel,
    )
    .await?;
    debug!(binary = %built.binary.display(), "build finished");
    tracker.complete(Stage::Build);

    // Layout
    ensure_running(cancel, Stage::Layout)?;
    tracker.start(Stage::Layout);
    let tree = request.source_tree();
    if tree.readme.is_none() {
        tracker.emit(InstallProgress::AssetSkipped {
            path: tree.root.join(SourceTree::README),
        });
    }
    let laid_out = lay_out(request).await?;
    tracker.complete(Stage::Layout);

    // Verify
    ensure_running(cancel, Stage::Verify)?;
    let smoke = if options.run_smoke_test {
        tracker.start(Stage::Verify);
        verify(runner, &built.binary, options.scratch_dir.as_deref(), cancel).await?;
        SmokeTestStatus::Passed
    } else {
        tracker.skip(Stage::Verify, "smoke test disabled");
        SmokeTestStatus::Skipped
    };
    tracker.complete(Stage::Verify);

    // Report
    tracker.start(Stage::Report);
    let paths = ResolvedPaths::for_request(request);
    let report = InstallationReport {
        message: render_caveats(&paths),
        paths,
        package: request.package().clone(),
        binary: built.binary,
        docs: laid_out.docs,
        example_files: laid_out.example_files,
        smoke_test: smoke,
    };
    tracker.complete(Stage::Report);
    info!(
        package = %report.package.name,
        version = %report.package.version,
        "installation complete"
    );
    Ok(report)
}

fn ensure_running(cancel: &CancellationToken, stage: Stage) -> Result<(), InstallError> {
    if cancel.is_cancelled() {
        return Err(InstallError::Cancelled { stage });
    }
    Ok(())
}

/// Required tools that are absent, using the request's known availability
/// and probing only the rest.
async fn missing_tools(request: &InstallationRequest, options: &InstallOptions) -> BTreeSet<String> {
    let mut missing = BTreeSet::new();
    let mut unknown = Vec::new();
    for name in &options.required_tools {
        match request.tool_available(name) {
            Some(true) => {}
            Some(false) => {
                missing.insert(name.clone());
            }
            None => unknown.push(name.as_str()),
        }
    }
    if !unknown.is_empty() {
        let report = probe(&unknown, &options.probe).await;
        missing.extend(report.missing());
    }
    missing
}

fn prerequisites_missing(missing: BTreeSet<String>) -> InstallError {
    let fix = missing
        .iter()
        .map(|name| match Tool::from_executable(name) {
            Some(tool) => format!("{}: {}", tool.display_name(), tool.install_hint()),
            None => format!("install {name} and make sure it is on PATH"),
        })
        .collect::<Vec<_>>()
        .join("; ");
    InstallError::PrerequisitesMissing { missing, fix }
}

async fn lay_out(request: &InstallationRequest) -> Result<LayoutOutcome, InstallError> {
    let tree = request.source_tree().clone();
    let docs_dir = request.docs_dir();
    let examples_dir = request.examples_dir();
    let target = examples_dir.clone();

    tokio::task::spawn_blocking(move || write_layout(&tree, &docs_dir, &examples_dir))
        .await
        .map_err(|e| InstallError::Layout {
            message: format!("layout task failed: {e}"),
            path: target,
            fix: "Re-run the installation".to_string(),
        })?
}

async fn verify<R: CommandRunner + ?Sized>(
    runner: &R,
    compiler: &Path,
    scratch_dir: Option<&Path>,
    cancel: &CancellationToken,
) -> Result<(), InstallError> {
    let scratch_error = |e: std::io::Error| InstallError::Verification {
        reason: format!("could not create scratch directory: {e}"),
        output: None,
        fix: "Pass a writable scratch directory".to_string(),
    };

    let temp;
    let scratch = match scratch_dir {
        Some(dir) => {
            tokio::fs::create_dir_all(dir).await.map_err(scratch_error)?;
            dir
        }
        None => {
            temp = tempfile::Builder::new()
                .prefix("stalin-smoke")
                .tempdir()
                .map_err(scratch_error)?;
            temp.path()
        }
    };

    let outcome = smoke_test(runner, compiler, scratch, cancel).await?;
    debug!(artifact = %outcome.artifact.display(), output = %outcome.output.trim_end(), "smoke test passed");
    Ok(())
}
