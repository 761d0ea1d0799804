use std::future::Future;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Reason a [`RunContext`] is done.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    /// The owner called [`RunContext::cancel`] (or a bound signal fired).
    #[error("context canceled")]
    Canceled,
    /// The deadline elapsed before the work finished.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cooperative cancellation signal with an optional deadline.
///
/// A `RunContext` is created once per top-level invocation and handed to every
/// activation by reference. Clones share the same state, so cancelling any
/// clone cancels them all. Activations only observe the context; they never
/// cancel it.
///
/// The first reason observed (explicit cancellation or deadline) is latched and
/// reported by every later call to [`RunContext::err`].
#[derive(Debug, Clone)]
pub struct RunContext {
    token: CancellationToken,
    deadline: Option<Instant>,
    reason: Arc<OnceLock<ContextError>>,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RunContext {
    /// Creates a context without a deadline. It is only done once cancelled.
    pub fn new() -> Self {
        RunContext {
            token: CancellationToken::new(),
            deadline: None,
            reason: Arc::new(OnceLock::new()),
        }
    }

    /// Creates a context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// Creates a context that expires at `deadline`.
    pub fn with_deadline(deadline: Instant) -> Self {
        RunContext {
            deadline: Some(deadline),
            ..Self::new()
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancels the context. Has no effect if the context is already done.
    pub fn cancel(&self) {
        self.reason.get_or_init(|| ContextError::Canceled);
        self.token.cancel();
    }

    /// Returns why the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<ContextError> {
        if let Some(reason) = self.reason.get() {
            return Some(*reason);
        }
        if self.token.is_cancelled() {
            return Some(*self.reason.get_or_init(|| ContextError::Canceled));
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                Some(*self.reason.get_or_init(|| ContextError::DeadlineExceeded))
            }
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Waits until the context is cancelled or its deadline elapses.
    pub async fn done(&self) -> ContextError {
        if let Some(reason) = self.err() {
            return reason;
        }

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }

        // Both branches above leave the context observably done.
        self.err().unwrap_or(ContextError::Canceled)
    }

    /// Cancels this context as soon as `signal` resolves.
    ///
    /// The spawned watcher exits on its own once the context is done, so a
    /// signal that never fires does not keep the task alive past the deadline.
    pub fn cancel_on<F>(&self, signal: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = self.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = signal => {
                    debug!("Cancel signal received, cancelling run context");
                    ctx.cancel();
                }
                reason = ctx.done() => {
                    debug!(%reason, "Run context done before cancel signal");
                }
            }
        })
    }
}
