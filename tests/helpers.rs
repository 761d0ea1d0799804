#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use job_runner::{Job, JobAttributes, RunContext, RunError, Runnable};
use tokio::sync::OnceCell;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

pub async fn enable_logs() {
    static ONCE: OnceCell<()> = OnceCell::const_new();

    ONCE.get_or_init(|| async {
        let fmt_layer = tracing_subscriber::fmt::layer().with_test_writer();
        let filter_layer = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("debug"));

        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    })
    .await;
}

pub fn job(id: i64, work: Duration) -> Job {
    Job::builder()
        .id(id)
        .name(format!("job-{id}"))
        .work_duration(work)
        .build()
}

pub fn failing_job(id: i64, work: Duration) -> Job {
    Job::builder()
        .id(id)
        .name(format!("job-{id}"))
        .attributes(JobAttributes::new().with_force_error(true))
        .work_duration(work)
        .build()
}

/// Tracks how many probes are running right now and the highest count seen.
#[derive(Default)]
pub struct InFlight {
    current: AtomicUsize,
    max: AtomicUsize,
}

impl InFlight {
    fn enter(&self) {
        let current = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.max.fetch_max(current, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.current.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn max(&self) -> usize {
        self.max.load(Ordering::SeqCst)
    }
}

/// A runnable that sleeps for `delay`, then succeeds or fails.
pub struct Probe {
    name: String,
    delay: Duration,
    fail: bool,
    tracker: Arc<InFlight>,
    pub runs: usize,
}

impl Probe {
    pub fn new(name: &str, delay: Duration, tracker: Arc<InFlight>) -> Self {
        Probe {
            name: name.to_string(),
            delay,
            fail: false,
            tracker,
            runs: 0,
        }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Runnable for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn run<'a>(&'a mut self, ctx: &'a RunContext) -> BoxFuture<'a, Result<(), RunError>> {
        async move {
            self.runs += 1;
            self.tracker.enter();
            let result = tokio::select! {
                reason = ctx.done() => Err(RunError::from(reason)),
                _ = tokio::time::sleep(self.delay) => {
                    if self.fail {
                        Err(RunError::Task(format!("{} failed", self.name)))
                    } else {
                        Ok(())
                    }
                }
            };
            self.tracker.exit();
            result
        }
        .boxed()
    }
}
