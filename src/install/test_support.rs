//! A scripted [`CommandRunner`] for unit tests.

use super::runner::{CommandOutput, CommandRunner, CommandSpec, RunError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

type Handler = Arc<dyn Fn(&CommandSpec) -> Result<CommandOutput, RunError> + Send + Sync>;

/// Records every command and answers by program file name.
///
/// Unscripted programs succeed with empty output.
#[derive(Default, Clone)]
pub(crate) struct ScriptedRunner {
    handlers: HashMap<String, Handler>,
    calls: Arc<Mutex<Vec<CommandSpec>>>,
}

impl ScriptedRunner {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn respond<F>(mut self, program: &str, handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, RunError> + Send + Sync + 'static,
    {
        self.handlers.insert(program.to_string(), Arc::new(handler));
        self
    }

    pub(crate) fn fail(self, program: &str, exit_code: i32, stderr: &str) -> Self {
        let stderr = stderr.to_string();
        self.respond(program, move |_| {
            Ok(CommandOutput {
                exit_code: Some(exit_code),
                stdout: String::new(),
                stderr: stderr.clone(),
            })
        })
    }

    pub(crate) fn missing(self, program: &str) -> Self {
        self.respond(program, |spec| {
            Err(RunError::Spawn {
                program: spec.program.display().to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        })
    }

    pub(crate) fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, program: &str) -> usize {
        self.calls()
            .iter()
            .filter(|spec| file_name(spec) == program)
            .count()
    }
}

fn file_name(spec: &CommandSpec) -> String {
    spec.program
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) fn ok() -> CommandOutput {
    CommandOutput {
        exit_code: Some(0),
        ..Default::default()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        cancel: &CancellationToken,
    ) -> Result<CommandOutput, RunError> {
        if cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        self.calls.lock().unwrap().push(spec.clone());
        match self.handlers.get(&file_name(spec)) {
            Some(handler) => handler(spec),
            None => Ok(ok()),
        }
    }
}
