use job_runner_runnable::RunError;
use thiserror::Error;

/// A failed activation, as collected by the runner.
///
/// Carries the name of the runnable so an aggregate of failures can be reported
/// without holding on to the runnables themselves.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("'{runnable}' failed: {error}")]
pub struct RunFailure {
    /// Name of the runnable that failed
    pub runnable: String,
    /// Why it failed
    #[source]
    pub error: RunError,
}

impl RunFailure {
    pub fn runnable(&self) -> &str {
        &self.runnable
    }

    pub fn error(&self) -> &RunError {
        &self.error
    }
}
