mod attributes;
mod state;

use std::panic::AssertUnwindSafe;
use std::time::Duration;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use futures::future::BoxFuture;
use futures::FutureExt;
use getset::{CopyGetters, Getters};
use job_runner_ctx::RunContext;
use job_runner_runnable::{panic_message, RunError, Runnable};
use serde::Serialize;
use tracing::{debug, warn};

pub use attributes::JobAttributes;
pub use state::JobState;

/// How long a job's simulated work takes unless configured otherwise.
pub const DEFAULT_WORK_DURATION: Duration = Duration::from_millis(100);

/// A unit of simulated work with an observable lifecycle.
///
/// A job starts in [`JobState::Queued`] and is moved forward only by its own
/// [`Runnable::run`], which leaves it in [`JobState::Done`] or
/// [`JobState::Failed`]. `created_at` is stamped at construction and never
/// changes.
#[derive(Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Serialize, Builder)]
#[builder(build_fn(private, name = "build_internal"), pattern = "owned")]
pub struct Job {
    /// Caller-assigned identifier. Uniqueness is not checked.
    #[getset(get_copy = "pub")]
    #[builder(default)]
    id: i64,
    /// Display name, also used as the runnable name
    #[getset(get = "pub")]
    #[builder(default, setter(into))]
    name: String,
    #[getset(get_copy = "pub")]
    #[builder(setter(skip), default)]
    state: JobState,
    #[getset(get_copy = "pub")]
    #[builder(setter(skip), default = "Utc::now()")]
    created_at: DateTime<Utc>,
    #[getset(get = "pub")]
    #[builder(default)]
    attributes: JobAttributes,
    /// Length of the simulated work interval
    #[getset(get_copy = "pub")]
    #[builder(default = "DEFAULT_WORK_DURATION")]
    work_duration: Duration,
    /// Rendered error of the run that moved the job to `Failed`
    #[getset(get = "pub")]
    #[builder(setter(skip), default)]
    last_error: Option<String>,
}

impl Job {
    /// Creates a queued job with the default work duration.
    pub fn new(id: i64, name: impl Into<String>, attributes: JobAttributes) -> Job {
        Job::builder()
            .id(id)
            .name(name)
            .attributes(attributes)
            .build()
    }

    /// Creates a new builder for constructing a `Job`.
    pub fn builder() -> JobBuilder {
        JobBuilder::default()
    }

    fn transition(&mut self, next: JobState) {
        if self.state.can_transition_to(next) {
            debug!(job_id = self.id, from = %self.state, to = %next, "Job state transition");
            self.state = next;
        } else {
            warn!(job_id = self.id, from = %self.state, to = %next, "Refused illegal job state transition");
        }
    }

    async fn execute(&mut self, ctx: &RunContext) -> Result<(), RunError> {
        if self.state != JobState::Queued {
            warn!(job_id = self.id, state = %self.state, "Job has already been run");
            return Err(RunError::AlreadyRun(self.name.clone()));
        }

        self.transition(JobState::Running);

        let result = AssertUnwindSafe(self.work(ctx))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(RunError::Panic(panic_message(payload.as_ref()))));

        match &result {
            Ok(()) => self.transition(JobState::Done),
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.transition(JobState::Failed);
            }
        }

        result
    }

    async fn work(&self, ctx: &RunContext) -> Result<(), RunError> {
        if let Some(reason) = ctx.err() {
            return Err(reason.into());
        }

        if self.attributes.force_fault {
            panic!("job '{}' hit an injected fault", self.name);
        }

        if self.attributes.force_error {
            return Err(RunError::Task(format!(
                "job '{}' failed: force_error attribute is set",
                self.name
            )));
        }

        tokio::select! {
            biased;
            reason = ctx.done() => Err(reason.into()),
            _ = tokio::time::sleep(self.work_duration) => Ok(()),
        }
    }
}

impl JobBuilder {
    /// Builds the Job with all configured values.
    pub fn build(self) -> Job {
        self.build_internal()
            .expect("All fields have defaults, build should never fail")
    }
}

impl Runnable for Job {
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
        self.execute(ctx).boxed()
    }
}
