use std::time::Duration;

use job_runner_runnable::RunError;

#[derive(Debug, Clone)]
pub struct RunnerStartContext {
    pub runnable_count: usize,
    /// Maximum number of activations polled at once
    pub concurrency: usize,
}

#[derive(Debug, Clone)]
pub struct RunnableStartContext {
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RunnableCompleteContext {
    pub name: String,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RunnableFailContext {
    pub name: String,
    pub error: RunError,
    pub duration: Duration,
}

#[derive(Debug, Clone)]
pub struct RunnerFinishContext {
    pub runnable_count: usize,
    pub failure_count: usize,
    pub duration: Duration,
}
