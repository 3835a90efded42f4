//! # Exit hook: stop the supervisor when the process is told to terminate.
//!
//! Spawned once by `start()` when [`Config::stop_on_signal`] is set.
//!
//! ```text
//! SIGINT / SIGTERM / SIGQUIT (Ctrl-C elsewhere)
//!   └─► Supervisor::stop()                     (once; the hook never re-arms)
//!        └─► exit_on_signal?
//!             ├─ no  → task ends, the host decides what happens next
//!             └─ yes → wait: engine-run returned | second signal
//!                       └─► process::exit(128 + signo)
//! ```
//!
//! Registering a handler replaces the default "terminate" action for the whole
//! process, so with `exit_on_signal` the hook ends the process itself. A second
//! signal skips the wait for an engine that does not shut down.
//!
//! [`Config::stop_on_signal`]: crate::Config::stop_on_signal

use std::io;
use std::sync::Weak;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::{
    core::supervisor::Supervisor,
    error::TaskError,
    tasks::{TaskFn, TaskRef},
};

/// Builds the `exit-hook` task for `sup`.
pub(crate) fn task(sup: Weak<Supervisor>, exit_process: bool) -> TaskRef {
    TaskFn::arc("exit-hook", move |ctx: CancellationToken| {
        let sup = sup.clone();
        async move {
            let mut signals = match Signals::register() {
                Ok(signals) => signals,
                Err(e) => {
                    return Err(TaskError::Fail {
                        error: format!("signal registration failed: {e}"),
                    });
                }
            };
            let code = tokio::select! {
                _ = ctx.cancelled() => return Err(TaskError::Canceled),
                code = signals.recv() => code,
            };

            let Some(sup) = sup.upgrade() else {
                return Ok(());
            };
            info!(exit_code = code, "termination signal received");
            let mut engine_done = sup.stop_on_exit_signal();
            drop(sup);

            if !exit_process {
                return Ok(());
            }
            tokio::select! {
                _ = engine_done.wait_for(|done| *done) => {
                    info!("router engine stopped; exiting");
                }
                again = signals.recv() => {
                    warn!(exit_code = again, "second termination signal; exiting now");
                }
            }
            std::process::exit(code)
        }
    })
}

/// The termination signals the hook listens for.
#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
    quit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn register() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
            quit: signal(SignalKind::quit())?,
        })
    }

    /// Waits for the next signal and returns the conventional exit code for it.
    async fn recv(&mut self) -> i32 {
        tokio::select! {
            _ = self.interrupt.recv() => 130,
            _ = self.terminate.recv() => 143,
            _ = self.quit.recv() => 131,
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn register() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> i32 {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
        130
    }
}
