//! # Run one background task to completion.
//!
//! Executes a [`Task`] once with a child cancellation token, isolates panics and
//! publishes its lifecycle to the [`Bus`]. Tasks are never restarted.
//!
//! ## Event flow
//!
//! ```text
//! publish TaskStarting
//!   task.spawn() → Ok(())           → publish TaskStopped
//!   task.spawn() → Err(Canceled)    → publish TaskStopped (graceful exit)
//!   task.spawn() → Err(Fail/Fatal)  → publish TaskFailed + warn!
//!   task.spawn() → panic            → publish TaskFailed + error!
//! ```
//!
//! ## Rules
//! - Always publishes **exactly one** terminal event: `TaskStopped` or `TaskFailed`
//! - Child cancellation does **not** affect the parent token

use futures::FutureExt;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use crate::{
    error::TaskError,
    events::{Bus, Event, EventKind},
    subscribers::panic_message,
    tasks::Task,
};

/// Executes `task` once, publishing lifecycle events to `bus`.
///
/// Panics inside the task are caught and reported as [`TaskError::Fatal`].
pub async fn run_once<T: Task + ?Sized>(
    task: &T,
    parent: &CancellationToken,
    bus: &Bus,
) -> Result<(), TaskError> {
    let name = task.name();
    let child = parent.child_token();
    bus.publish(Event::new(EventKind::TaskStarting).with_task(name));

    let res = match std::panic::AssertUnwindSafe(task.spawn(child)).catch_unwind().await {
        Ok(res) => res,
        Err(panic_err) => {
            let info = panic_message(&*panic_err);
            error!(task = name, panic = %info, "background task panicked");
            Err(TaskError::Fatal {
                error: format!("panicked: {info}"),
            })
        }
    };

    match res {
        Ok(()) => {
            publish_stopped(bus, name);
            Ok(())
        }
        Err(TaskError::Canceled) => {
            publish_stopped(bus, name);
            Err(TaskError::Canceled)
        }
        Err(e) => {
            warn!(task = name, error = %e, label = e.as_label(), "background task failed");
            bus.publish(
                Event::new(EventKind::TaskFailed)
                    .with_task(name)
                    .with_reason(e.to_string()),
            );
            Err(e)
        }
    }
}

fn publish_stopped(bus: &Bus, name: &str) {
    bus.publish(Event::new(EventKind::TaskStopped).with_task(name));
}
