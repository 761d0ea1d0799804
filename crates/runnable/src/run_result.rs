use std::time::Duration;

use job_runner_ctx::ContextError;
use thiserror::Error;

/// Why a single activation failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    /// The shared context was cancelled or its deadline elapsed.
    #[error(transparent)]
    Context(#[from] ContextError),
    /// The runnable rejected its own input.
    #[error("task returned the following error : {0}")]
    Task(String),
    /// A panic unwound out of the work body and was contained.
    #[error("task panicked : {0}")]
    Panic(String),
    /// The runnable was asked to run again after leaving its initial state.
    #[error("'{0}' has already been run")]
    AlreadyRun(String),
}

impl RunError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, RunError::Context(_))
    }

    pub fn is_panic(&self) -> bool {
        matches!(self, RunError::Panic(_))
    }

    pub fn is_task_error(&self) -> bool {
        matches!(self, RunError::Task(_))
    }

    pub fn is_already_run(&self) -> bool {
        matches!(self, RunError::AlreadyRun(_))
    }

    /// The context error carried by a cancellation, if any.
    pub fn context_error(&self) -> Option<ContextError> {
        match self {
            RunError::Context(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Result of one activation, as seen at the runner's join point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub name: String,
    pub duration: Duration,
    pub result: Result<(), RunError>,
}

impl RunOutcome {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn result(&self) -> &Result<(), RunError> {
        &self.result
    }

    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}
