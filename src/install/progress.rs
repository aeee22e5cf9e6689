//! Progress reporting types for installation operations.
//!
//! A run moves strictly forward through [`PipelineState`]; every transition
//! is reported to the caller's callback as an [`InstallProgress`] event.

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// The pipeline stage doing work when an event or failure occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Checking for required tools.
    Probe,
    /// Preparing the containerized build environment.
    Provision,
    /// Running the build system's install target.
    Build,
    /// Copying docs and examples.
    Layout,
    /// Compiling and running the test program.
    Verify,
    /// Rendering the final message.
    Report,
}

impl Stage {
    /// The state reached when this stage succeeds.
    pub fn completes(&self) -> PipelineState {
        match self {
            Self::Probe => PipelineState::Probed,
            Self::Provision => PipelineState::Provisioned,
            Self::Build => PipelineState::Built,
            Self::Layout => PipelineState::LaidOut,
            Self::Verify => PipelineState::Verified,
            Self::Report => PipelineState::Reported,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Probe => "prerequisite check",
            Self::Provision => "provisioning",
            Self::Build => "build",
            Self::Layout => "layout",
            Self::Verify => "verification",
            Self::Report => "report",
        };
        f.write_str(name)
    }
}

/// Position of a run in the install state machine.
///
/// ```text
/// Init -> Probed -> Provisioned -> Built -> LaidOut -> Verified -> Reported
///    \________\___________\__________\________\___________> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Nothing has run yet.
    Init,
    /// Prerequisites checked.
    Probed,
    /// Build environment ready.
    Provisioned,
    /// Build system installed into the prefix.
    Built,
    /// Docs and examples copied.
    LaidOut,
    /// Smoke test passed or was skipped.
    Verified,
    /// Final report produced.
    Reported,
    /// A stage failed; nothing further runs.
    Failed,
}

impl PipelineState {
    /// The single successor on the success path.
    ///
    /// # Example
    ///
    /// ```rust
    /// use stalin_installer::PipelineState;
    ///
    /// assert_eq!(PipelineState::Built.next(), Some(PipelineState::LaidOut));
    /// assert_eq!(PipelineState::Reported.next(), None);
    /// ```
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Probed),
            Self::Probed => Some(Self::Provisioned),
            Self::Provisioned => Some(Self::Built),
            Self::Built => Some(Self::LaidOut),
            Self::LaidOut => Some(Self::Verified),
            Self::Verified => Some(Self::Reported),
            Self::Reported | Self::Failed => None,
        }
    }

    /// Whether the run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Reported | Self::Failed)
    }

    /// Whether moving to `to` is a legal transition.
    ///
    /// Only the direct successor or `Failed` are reachable, and nothing
    /// leaves a terminal state.
    pub fn can_transition_to(&self, to: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        to == Self::Failed || self.next() == Some(to)
    }
}

/// Events emitted while a pipeline runs.
///
/// # Example
///
/// ```rust
/// use stalin_installer::{InstallProgress, PipelineState};
///
/// fn on_progress(progress: InstallProgress) {
///     match &progress {
///         InstallProgress::StageStarted { .. } => println!("==> {}", progress.description()),
///         InstallProgress::StageSkipped { stage, reason } => println!("skipped {stage}: {reason}"),
///         InstallProgress::StateChanged { to, .. } if *to == PipelineState::Failed => {
///             println!("failed")
///         }
///         _ => {}
///     }
/// }
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum InstallProgress {
    /// A stage began doing work.
    StageStarted {
        /// The stage.
        stage: Stage,
    },

    /// A stage was not run; its state is still reached.
    StageSkipped {
        /// The stage.
        stage: Stage,
        /// Why it was skipped.
        reason: String,
    },

    /// An optional asset was absent and its copy was skipped.
    AssetSkipped {
        /// The path that was looked for.
        path: PathBuf,
    },

    /// The state machine moved.
    StateChanged {
        /// Previous state.
        from: PipelineState,
        /// New state.
        to: PipelineState,
    },
}

impl InstallProgress {
    /// Human-readable description of the event.
    pub fn description(&self) -> String {
        match self {
            Self::StageStarted { stage } => match stage {
                Stage::Probe => "Checking prerequisites".to_string(),
                Stage::Provision => "Provisioning build environment".to_string(),
                Stage::Build => "Building and installing".to_string(),
                Stage::Layout => "Installing documentation and examples".to_string(),
                Stage::Verify => "Running smoke test".to_string(),
                Stage::Report => "Preparing report".to_string(),
            },
            Self::StageSkipped { stage, reason } => format!("Skipped {stage}: {reason}"),
            Self::AssetSkipped { path } => format!("Skipped missing {}", path.display()),
            Self::StateChanged { from, to } => format!("{from:?} -> {to:?}"),
        }
    }

    /// Whether this event ends the run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::StateChanged { to, .. } if to.is_terminal())
    }
}
