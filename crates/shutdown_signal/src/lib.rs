use std::future::Future;
use std::io;
use std::pin::Pin;

use cfg_if::cfg_if;
use futures::{future::Shared, FutureExt};
use tracing::{info, warn};

cfg_if! {
    if #[cfg(windows)] {
        use tokio::signal::windows::{ctrl_break, ctrl_c, ctrl_close};

        async fn wait_for_os_signal() -> io::Result<()> {
            let mut ctrl_c = ctrl_c()?;
            let mut ctrl_break = ctrl_break()?;
            let mut ctrl_close = ctrl_close()?;
            tokio::select! {
                _ = ctrl_c.recv() => (),
                _ = ctrl_break.recv() => (),
                _ = ctrl_close.recv() => (),
            }
            Ok(())
        }
    } else if #[cfg(unix)] {
        use tokio::signal::unix::{signal, SignalKind};

        async fn wait_for_os_signal() -> io::Result<()> {
            let mut interrupt = signal(SignalKind::interrupt())?;
            let mut terminate = signal(SignalKind::terminate())?;
            let mut hangup = signal(SignalKind::hangup())?;
            tokio::select! {
                _ = interrupt.recv() => (),
                _ = terminate.recv() => (),
                _ = hangup.recv() => (),
            }
            Ok(())
        }
    } else {
        compile_error!("Shutdown signals are only supported on unix and windows targets");
    }
}

/// A cloneable future that resolves once the process is asked to stop.
pub type ShutdownSignal = Shared<Pin<Box<dyn Future<Output = ()> + Send>>>;

/// Listens for the platform's termination signals (Ctrl-C, SIGTERM, ...).
///
/// If the handlers cannot be installed the returned future never resolves, so
/// callers keep running until their own deadline instead of stopping at once.
pub fn shutdown_signal() -> ShutdownSignal {
    from_future(async {
        match wait_for_os_signal().await {
            Ok(()) => info!("Shutdown signal detected, cancelling outstanding jobs..."),
            Err(e) => {
                warn!(error = %e, "Failed to listen for shutdown signals");
                std::future::pending::<()>().await;
            }
        }
    })
}

/// Wraps any future as a [`ShutdownSignal`]. Useful to trigger shutdown
/// programmatically.
pub fn from_future<F>(fut: F) -> ShutdownSignal
where
    F: Future<Output = ()> + Send + 'static,
{
    let boxed: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(fut);
    boxed.shared()
}
