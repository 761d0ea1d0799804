use std::num::NonZeroUsize;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use job_runner::{shutdown_signal, Job, JobAttributes, JobRunner, RunContext};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Runs a batch of simulated jobs concurrently under a shared deadline and reports the failures"
)]
struct Cli {
    /// Number of jobs to run
    #[arg(short, long, env = "JOB_RUNNER_JOBS", default_value_t = 3)]
    jobs: u32,

    /// Deadline for the whole batch, in milliseconds
    #[arg(short, long, env = "JOB_RUNNER_TIMEOUT_MS", default_value_t = 1_000)]
    timeout_ms: u64,

    /// Simulated work per job, in milliseconds
    #[arg(short, long, env = "JOB_RUNNER_WORK_MS", default_value_t = 100)]
    work_ms: u64,

    /// Maximum number of jobs running at once (default: all of them)
    #[arg(short, long, env = "JOB_RUNNER_CONCURRENCY")]
    concurrency: Option<NonZeroUsize>,

    /// Id of a job that should fail with a domain error (repeatable)
    #[arg(long = "fail", value_name = "ID", env = "JOB_RUNNER_FAIL", value_delimiter = ',')]
    fail: Vec<i64>,

    /// Id of a job whose work should panic (repeatable)
    #[arg(long = "fault", value_name = "ID", env = "JOB_RUNNER_FAULT", value_delimiter = ',')]
    fault: Vec<i64>,

    /// Print the final job records as JSON
    #[arg(long, env = "JOB_RUNNER_JSON")]
    json: bool,
}

impl Cli {
    fn jobs(&self) -> Vec<Job> {
        (1..=i64::from(self.jobs))
            .map(|id| {
                let attributes = JobAttributes::new()
                    .with_force_error(self.fail.contains(&id))
                    .with_force_fault(self.fault.contains(&id));
                Job::builder()
                    .id(id)
                    .name(format!("job-{id}"))
                    .attributes(attributes)
                    .work_duration(Duration::from_millis(self.work_ms))
                    .build()
            })
            .collect()
    }

    fn runner(&self) -> JobRunner {
        let mut options = JobRunner::options();
        if let Some(concurrency) = self.concurrency {
            options = options.concurrency(concurrency.get());
        }
        options.init()
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let mut jobs = cli.jobs();
    let runner = cli.runner();

    let ctx = RunContext::with_timeout(Duration::from_millis(cli.timeout_ms));
    let watcher = ctx.cancel_on(shutdown_signal());

    let failures = runner.run_all(&ctx, &mut jobs).await;
    watcher.abort();

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&jobs)?);
    } else {
        for job in &jobs {
            println!("{:>6} {:<12} {}", job.id(), job.name(), job.state());
        }
    }

    if failures.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }

    eprintln!("{} of {} jobs failed:", failures.len(), jobs.len());
    for failure in &failures {
        eprintln!("  {failure}");
    }
    Ok(ExitCode::FAILURE)
}
