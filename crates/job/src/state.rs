use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`Job`](crate::Job).
///
/// ```text
/// Queued -> Running -> Done
///                   \-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Created and waiting to be run.
    #[default]
    Queued,
    /// Inside `run`.
    Running,
    /// Finished successfully.
    Done,
    /// Cancelled, rejected its input, or faulted.
    Failed,
}

impl JobState {
    pub fn can_transition_to(&self, target: JobState) -> bool {
        use JobState::*;

        matches!(
            (self, target),
            (Queued, Running) | (Running, Done) | (Running, Failed)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Queued => "queued",
            JobState::Running => "running",
            JobState::Done => "done",
            JobState::Failed => "failed",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
