mod contained;
mod handler;
mod run_result;

pub use contained::{panic_message, run_contained};
pub use handler::{Runnable, RunnableFn};
pub use run_result::{RunError, RunOutcome};
