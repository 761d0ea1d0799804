//! Concurrent fan-out/fan-in execution of independent jobs under a shared,
//! cancellable context.
//!
//! A caller builds a set of [`Runnable`]s (usually [`Job`] records), creates a
//! [`RunContext`] with a deadline, and hands both to [`JobRunner::run_all`].
//! Every runnable is activated concurrently; the runner waits for all of them
//! and returns the failures in completion order.
//!
//! ```no_run
//! use std::time::Duration;
//! use job_runner::{run_all, Job, JobAttributes, JobState, RunContext};
//!
//! # async fn example() {
//! let mut jobs = vec![
//!     Job::new(1, "ok", JobAttributes::default()),
//!     Job::new(2, "broken", JobAttributes::new().with_force_error(true)),
//! ];
//! let ctx = RunContext::with_timeout(Duration::from_secs(1));
//!
//! let failures = run_all(&ctx, &mut jobs).await;
//! assert_eq!(failures.len(), 1);
//! assert_eq!(jobs[0].state(), JobState::Done);
//! assert_eq!(jobs[1].state(), JobState::Failed);
//! # }
//! ```

mod builder;
pub mod errors;
mod runner;

pub use builder::RunnerOptions;
pub use errors::RunFailure;
pub use runner::{run_all, JobRunner};

pub use job_runner_ctx::{ContextError, RunContext};
pub use job_runner_job::{Job, JobAttributes, JobBuilder, JobState, DEFAULT_WORK_DURATION};
pub use job_runner_lifecycle_hooks::*;
pub use job_runner_runnable::{
    panic_message, run_contained, RunError, RunOutcome, Runnable, RunnableFn,
};
pub use job_runner_shutdown_signal::{shutdown_signal, ShutdownSignal};
