use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use getset::CopyGetters;
use job_runner_ctx::{ContextError, RunContext};
use job_runner_lifecycle_hooks::{
    Emittable, HookRegistry, RunnableCompleteContext, RunnableFailContext, RunnableStartContext,
    RunnerFinishContext, RunnerStartContext,
};
use job_runner_runnable::{panic_message, run_contained, RunError, RunOutcome, Runnable};
use tokio::task::JoinError;
use tokio::time::Instant;
use tokio_util::task::AbortOnDropHandle;
use tracing::{debug, info, warn, Instrument, Span};

use crate::builder::RunnerOptions;
use crate::errors::RunFailure;

/// Runs a set of runnables concurrently and collects their failures.
///
/// Every call to [`JobRunner::run_all`] fans out one activation per runnable
/// and joins all of them before returning. The runner never retries, never
/// aborts early and never cancels siblings when one fails; cancellation is
/// left to the shared [`RunContext`].
#[derive(CopyGetters)]
pub struct JobRunner {
    /// Maximum number of activations running at once, `None` for one per runnable
    #[getset(get_copy = "pub")]
    pub(crate) concurrency: Option<usize>,
    /// Lifecycle hooks for observing activations
    pub(crate) hooks: Arc<HookRegistry>,
}

impl Default for JobRunner {
    fn default() -> Self {
        RunnerOptions::default().init()
    }
}

type Settled<R> = (usize, String, Result<(R, RunOutcome), JoinError>);

impl JobRunner {
    /// Creates a new `RunnerOptions` builder with default settings.
    pub fn options() -> RunnerOptions {
        RunnerOptions::default()
    }

    /// Activates every runnable under `ctx` and waits for all of them.
    ///
    /// Each activation runs on its own tokio task, so a runnable that blocks
    /// its thread does not hold back its siblings on a multi-threaded
    /// runtime. The runnables are moved into their tasks and put back into
    /// `runnables`, in their original order, once every activation settled.
    /// If the returned future is dropped, in-flight activations are aborted.
    ///
    /// Exactly one outcome is collected per runnable; the returned failures
    /// are in completion order, not input order. An empty input returns at
    /// once.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::time::Duration;
    /// use job_runner::{Job, JobAttributes, JobRunner, RunContext};
    ///
    /// # async fn example() {
    /// let mut jobs = vec![
    ///     Job::new(1, "resize", JobAttributes::default()),
    ///     Job::new(2, "upload", JobAttributes::new().with_force_error(true)),
    /// ];
    /// let ctx = RunContext::with_timeout(Duration::from_secs(2));
    ///
    /// let failures = JobRunner::default().run_all(&ctx, &mut jobs).await;
    /// assert_eq!(failures.len(), 1);
    /// # }
    /// ```
    #[tracing::instrument(
        "run_all",
        skip_all,
        fields(runnable_count = tracing::field::Empty, concurrency = tracing::field::Empty)
    )]
    pub async fn run_all<R>(&self, ctx: &RunContext, runnables: &mut Vec<R>) -> Vec<RunFailure>
    where
        R: Runnable + 'static,
    {
        let runnable_count = runnables.len();

        let span = Span::current();
        span.record("runnable_count", runnable_count);

        if runnable_count == 0 {
            debug!("No runnables submitted");
            return Vec::new();
        }

        let concurrency = self
            .concurrency
            .map_or(runnable_count, |limit| limit.clamp(1, runnable_count));
        span.record("concurrency", concurrency);

        emit_contained(
            &self.hooks,
            RunnerStartContext {
                runnable_count,
                concurrency,
            },
        )
        .await;

        let start = Instant::now();
        let mut slots: Vec<Option<R>> = Vec::with_capacity(runnable_count);
        slots.resize_with(runnable_count, || None);

        let mut outcomes = stream::iter(std::mem::take(runnables).into_iter().enumerate())
            .map(|(index, runnable)| self.spawn_activation(ctx, index, runnable))
            .buffer_unordered(concurrency);

        let mut settled = 0;
        let mut failures = Vec::new();
        while let Some((index, name, joined)) = outcomes.next().await {
            settled += 1;
            let result = match joined {
                Ok((runnable, outcome)) => {
                    slots[index] = Some(runnable);
                    outcome.result
                }
                Err(e) => {
                    warn!(
                        runnable = %name,
                        error = %e,
                        "Activation task did not return its runnable"
                    );
                    Err(lost_activation(e))
                }
            };
            if let Err(error) = result {
                failures.push(RunFailure {
                    runnable: name,
                    error,
                });
            }
        }
        debug_assert_eq!(settled, runnable_count);
        runnables.extend(slots.into_iter().flatten());

        let duration = start.elapsed();
        debug!(
            runnable_count,
            failure_count = failures.len(),
            duration = duration.as_millis(),
            "All runnables settled"
        );

        emit_contained(
            &self.hooks,
            RunnerFinishContext {
                runnable_count,
                failure_count: failures.len(),
                duration,
            },
        )
        .await;

        failures
    }

    /// Spawns the activation right away and returns a future resolving to
    /// its input position, its name and the joined task.
    fn spawn_activation<R>(
        &self,
        ctx: &RunContext,
        index: usize,
        runnable: R,
    ) -> impl Future<Output = Settled<R>>
    where
        R: Runnable + 'static,
    {
        let name = runnable.name().to_owned();
        let handle = AbortOnDropHandle::new(tokio::spawn(
            activate(self.hooks.clone(), ctx.clone(), runnable).in_current_span(),
        ));
        async move { (index, name, handle.await) }
    }
}

async fn activate<R>(hooks: Arc<HookRegistry>, ctx: RunContext, mut runnable: R) -> (R, RunOutcome)
where
    R: Runnable,
{
    emit_contained(
        &hooks,
        RunnableStartContext {
            name: runnable.name().to_owned(),
        },
    )
    .await;

    let outcome = run_contained(&mut runnable, &ctx).await;

    match &outcome.result {
        Ok(()) => {
            info!(
                runnable = %outcome.name,
                duration = outcome.duration.as_millis(),
                "Completed runnable with success"
            );
            emit_contained(
                &hooks,
                RunnableCompleteContext {
                    name: outcome.name.clone(),
                    duration: outcome.duration,
                },
            )
            .await;
        }
        Err(e) => {
            warn!(
                runnable = %outcome.name,
                error = %e,
                duration = outcome.duration.as_millis(),
                "Failed runnable"
            );
            emit_contained(
                &hooks,
                RunnableFailContext {
                    name: outcome.name.clone(),
                    error: e.clone(),
                    duration: outcome.duration,
                },
            )
            .await;
        }
    }

    (runnable, outcome)
}

/// Emits `ctx` and logs, instead of propagating, a panic raised by a handler.
async fn emit_contained<C: Emittable>(hooks: &HookRegistry, ctx: C) {
    if let Err(payload) = AssertUnwindSafe(hooks.emit(ctx)).catch_unwind().await {
        warn!(
            panic = %panic_message(&*payload),
            "Lifecycle hook handler panicked"
        );
    }
}

fn lost_activation(error: JoinError) -> RunError {
    match error.try_into_panic() {
        Ok(payload) => RunError::Panic(panic_message(&*payload)),
        Err(_) => RunError::Context(ContextError::Canceled),
    }
}

/// Runs every runnable with a default [`JobRunner`] and returns the failures.
pub async fn run_all<R>(ctx: &RunContext, runnables: &mut Vec<R>) -> Vec<RunFailure>
where
    R: Runnable + 'static,
{
    JobRunner::default().run_all(ctx, runnables).await
}
