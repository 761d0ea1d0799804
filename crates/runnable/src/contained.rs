use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use job_runner_ctx::RunContext;
use tokio::time::Instant;

use crate::handler::Runnable;
use crate::run_result::{RunError, RunOutcome};

/// Runs `runnable` under `ctx` and turns any panic into [`RunError::Panic`].
///
/// This is the activation boundary: nothing unwinds past it, so a faulting
/// runnable cannot take down its siblings or the caller.
pub async fn run_contained<R>(runnable: &mut R, ctx: &RunContext) -> RunOutcome
where
    R: Runnable + ?Sized,
{
    let name = runnable.name().to_owned();
    let start = Instant::now();

    let result = AssertUnwindSafe(runnable.run(ctx))
        .catch_unwind()
        .await
        .unwrap_or_else(|payload| Err(RunError::Panic(panic_message(payload.as_ref()))));

    RunOutcome {
        name,
        duration: start.elapsed(),
        result,
    }
}

/// Renders a panic payload the way the default panic hook does.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "Box<dyn Any>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::future::BoxFuture;

    use super::*;
    use crate::handler::RunnableFn;

    struct Faulty;

    impl Runnable for Faulty {
        fn name(&self) -> &str {
            "faulty"
        }

        fn run<'a>(&'a mut self, _ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
            async move {
                tokio::task::yield_now().await;
                panic!("worker exploded");
            }
            .boxed()
        }
    }

    #[tokio::test]
    async fn panic_is_contained() {
        let outcome = run_contained(&mut Faulty, &RunContext::new()).await;
        assert_eq!(outcome.name(), "faulty");
        assert_eq!(
            outcome.result,
            Err(RunError::Panic("worker exploded".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn outcome_records_duration() {
        let mut task = RunnableFn::new("sleepy", |_ctx| async {
            tokio::time::sleep(Duration::from_millis(30)).await;
            Ok::<(), ()>(())
        });
        let outcome = run_contained(&mut task, &RunContext::new()).await;
        assert!(outcome.is_success());
        assert!(outcome.duration() >= Duration::from_millis(30));
    }

    #[test]
    fn panic_messages() {
        let formatted: Box<dyn Any + Send> = Box::new(format!("code {}", 7));
        assert_eq!(panic_message(formatted.as_ref()), "code 7");

        let literal: Box<dyn Any + Send> = Box::new("literal");
        assert_eq!(panic_message(literal.as_ref()), "literal");

        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(other.as_ref()), "Box<dyn Any>");
    }
}
