use std::fmt::Debug;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;
use job_runner_ctx::RunContext;

use crate::run_result::RunError;

/// A unit of work the runner can activate.
///
/// This is the only thing the runner knows about the work it drives: a stable
/// name for diagnostics and a cancellable `run`. Implementations observe `ctx`
/// cooperatively; the runner never forcibly stops an activation.
///
/// `run` takes `&mut self`, so a runnable cannot be driven by two activations
/// at once.
pub trait Runnable: Send {
    /// Stable, side-effect-free identifier used in logs and failures.
    fn name(&self) -> &str;

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>>;
}

impl<R: Runnable + ?Sized> Runnable for &mut R {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
        (**self).run(ctx)
    }
}

impl<R: Runnable + ?Sized> Runnable for Box<R> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
        (**self).run(ctx)
    }
}

/// Adapts a name and a closure into a [`Runnable`].
///
/// The closure receives its own clone of the context. Errors of any `Debug`
/// type are rendered into [`RunError::Task`].
pub struct RunnableFn<F> {
    name: String,
    func: F,
}

impl<F> RunnableFn<F> {
    pub fn new<Fut>(name: impl Into<String>, func: F) -> Self
    where
        F: FnMut(RunContext) -> Fut,
    {
        RunnableFn {
            name: name.into(),
            func,
        }
    }
}

impl<F, Fut, E> Runnable for RunnableFn<F>
where
    F: FnMut(RunContext) -> Fut + Send,
    Fut: Future<Output = Result<(), E>> + Send + 'static,
    E: Debug + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
        let res = (self.func)(ctx.clone());
        async move { res.await.map_err(|e| RunError::Task(format!("{:?}", e))) }.boxed()
    }
}
