use std::future::Future;
use std::sync::Arc;

use job_runner_lifecycle_hooks::{Event, HookRegistry, Plugin};

use crate::runner::JobRunner;

/// Configuration options for a [`JobRunner`].
///
/// # Example
///
/// ```
/// use job_runner::{RunnerOptions, RunnableFail, RunnableFailContext};
///
/// let runner = RunnerOptions::default()
///     .concurrency(4)
///     .on(RunnableFail, |ctx: RunnableFailContext| async move {
///         eprintln!("{} failed: {}", ctx.name, ctx.error);
///     })
///     .init();
///
/// assert_eq!(runner.concurrency(), Some(4));
/// ```
#[derive(Default)]
pub struct RunnerOptions {
    /// Maximum number of activations running at once
    concurrency: Option<usize>,

    /// Lifecycle hooks for observing activations
    hooks: HookRegistry,
}

impl RunnerOptions {
    /// Builds the runner. Never fails.
    pub fn init(self) -> JobRunner {
        JobRunner {
            concurrency: self.concurrency,
            hooks: Arc::new(self.hooks),
        }
    }

    /// Bounds how many activations run at the same time.
    ///
    /// # Default
    /// If not specified, every runnable passed to `run_all` is activated at
    /// once.
    ///
    /// # Panics
    /// Panics if the value is 0, as at least one activation must be able to
    /// make progress.
    pub fn concurrency(mut self, value: usize) -> Self {
        assert!(value > 0, "Concurrency must be greater than 0");
        self.concurrency = Some(value);
        self
    }

    /// Registers a handler for a lifecycle event.
    pub fn on<E, F, Fut>(mut self, event: E, handler: F) -> Self
    where
        E: Event,
        F: Fn(E::Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.hooks.on(event, handler);
        self
    }

    /// Installs every handler of a [`Plugin`].
    pub fn add_plugin<P: Plugin>(mut self, plugin: P) -> Self {
        self.hooks = self.hooks.with_plugin(plugin);
        self
    }
}
