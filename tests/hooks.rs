use std::sync::Arc;
use std::time::Duration;

use job_runner::{
    HookRegistry, JobRunner, JobState, Plugin, RunContext, RunnableComplete,
    RunnableCompleteContext, RunnableFail, RunnableFailContext, RunnableStart,
    RunnableStartContext, RunnerFinish, RunnerFinishContext, RunnerStart, RunnerStartContext,
};
use tokio::sync::Mutex;

use crate::helpers::{enable_logs, failing_job, job};

mod helpers;

#[derive(Debug, Default)]
struct HookEvents {
    runner_started: Vec<RunnerStartContext>,
    started: Vec<String>,
    completed: Vec<String>,
    failed: Vec<RunnableFailContext>,
    finished: Vec<RunnerFinishContext>,
}

#[derive(Clone, Default)]
struct RecordingPlugin {
    events: Arc<Mutex<HookEvents>>,
}

impl Plugin for RecordingPlugin {
    fn register(self, hooks: &mut HookRegistry) {
        let events = self.events.clone();
        hooks.on(RunnerStart, move |ctx: RunnerStartContext| {
            let events = events.clone();
            async move { events.lock().await.runner_started.push(ctx) }
        });

        let events = self.events.clone();
        hooks.on(RunnableStart, move |ctx: RunnableStartContext| {
            let events = events.clone();
            async move { events.lock().await.started.push(ctx.name) }
        });

        let events = self.events.clone();
        hooks.on(RunnableComplete, move |ctx: RunnableCompleteContext| {
            let events = events.clone();
            async move { events.lock().await.completed.push(ctx.name) }
        });

        let events = self.events.clone();
        hooks.on(RunnableFail, move |ctx: RunnableFailContext| {
            let events = events.clone();
            async move { events.lock().await.failed.push(ctx) }
        });

        let events = self.events;
        hooks.on(RunnerFinish, move |ctx: RunnerFinishContext| {
            let events = events.clone();
            async move { events.lock().await.finished.push(ctx) }
        });
    }
}

#[tokio::test(start_paused = true)]
async fn hooks_fire_for_every_activation() {
    enable_logs().await;

    let plugin = RecordingPlugin::default();
    let runner = JobRunner::options().add_plugin(plugin.clone()).init();
    let mut jobs = vec![
        job(1, Duration::from_millis(20)),
        failing_job(2, Duration::from_millis(20)),
        job(3, Duration::from_millis(20)),
    ];

    let failures = runner
        .run_all(&RunContext::with_timeout(Duration::from_secs(1)), &mut jobs)
        .await;
    assert_eq!(failures.len(), 1);

    let events = plugin.events.lock().await;
    assert_eq!(events.runner_started.len(), 1);
    assert_eq!(events.runner_started[0].runnable_count, 3);
    assert_eq!(events.runner_started[0].concurrency, 3);

    let mut started = events.started.clone();
    started.sort();
    assert_eq!(started, vec!["job-1", "job-2", "job-3"]);

    let mut completed = events.completed.clone();
    completed.sort();
    assert_eq!(completed, vec!["job-1", "job-3"]);

    assert_eq!(events.failed.len(), 1);
    assert_eq!(events.failed[0].name, "job-2");
    assert!(events.failed[0].error.is_task_error());

    assert_eq!(events.finished.len(), 1);
    assert_eq!(events.finished[0].runnable_count, 3);
    assert_eq!(events.finished[0].failure_count, 1);
    assert_eq!(jobs[1].state(), JobState::Failed);
}

#[tokio::test]
async fn no_events_for_empty_input() {
    let plugin = RecordingPlugin::default();
    let runner = JobRunner::options().add_plugin(plugin.clone()).init();

    let failures = runner
        .run_all(&RunContext::new(), &mut Vec::<job_runner::Job>::new())
        .await;
    assert!(failures.is_empty());

    let events = plugin.events.lock().await;
    assert!(events.runner_started.is_empty());
    assert!(events.finished.is_empty());
}

#[tokio::test]
async fn closure_handlers_see_bounded_concurrency() {
    let seen = Arc::new(Mutex::new(None));
    let runner = {
        let seen = seen.clone();
        JobRunner::options()
            .concurrency(1)
            .on(RunnerStart, move |ctx: RunnerStartContext| {
                let seen = seen.clone();
                async move {
                    *seen.lock().await = Some(ctx.concurrency);
                }
            })
            .init()
    };
    let mut jobs = vec![
        job(1, Duration::from_millis(1)),
        job(2, Duration::from_millis(1)),
    ];

    assert!(runner
        .run_all(&RunContext::new(), &mut jobs)
        .await
        .is_empty());
    assert_eq!(*seen.lock().await, Some(1));
}

#[tokio::test(start_paused = true)]
async fn panicking_handler_does_not_stop_the_batch() {
    enable_logs().await;

    let runner = JobRunner::options()
        .on(RunnableFail, |_ctx: RunnableFailContext| async {
            panic!("observer bug")
        })
        .on(RunnerStart, |_ctx: RunnerStartContext| async {
            panic!("observer bug")
        })
        .init();
    let mut jobs = vec![
        failing_job(1, Duration::from_millis(5)),
        job(2, Duration::from_millis(5)),
    ];

    let failures = runner.run_all(&RunContext::new(), &mut jobs).await;

    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].runnable(), "job-1");
    assert!(failures[0].error().is_task_error());
    assert_eq!(jobs[0].state(), JobState::Failed);
    assert_eq!(jobs[1].state(), JobState::Done);
}
