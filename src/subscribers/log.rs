//! # LogWriter: renders runtime events through `tracing`.
//!
//! Enabled via the `logging` feature. Install a `tracing` subscriber in the
//! host application to see the output.
//!
//! ## Example output
//! ```text
//! INFO  [start-requested]
//! INFO  [readiness-pending] attempt=3
//! INFO  [proxy-started] dir="/var/lib/router/tunnel"
//! DEBUG [throttle-superseded] task="throttle-apply#1" rate=50
//! INFO  [throttle-applied] rate=80
//! WARN  [task-failed] task="readiness" err="configuration property `i2p.dir.config` is not set"
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::StartRequested => info!("[start-requested]"),
            EventKind::EngineCreated => info!("[engine-created]"),
            EventKind::ReadinessPending => {
                info!(attempt = e.attempt, "[readiness-pending]");
            }
            EventKind::EngineAlive => info!("[engine-alive]"),
            EventKind::ProxyStarted => info!(dir = reason, "[proxy-started]"),
            EventKind::StopRequested => info!("[stop-requested]"),
            EventKind::ProxyStopped => info!("[proxy-stopped]"),
            EventKind::ShutdownRequested => info!("[shutdown-requested]"),
            EventKind::EngineStopped => info!(reason, "[engine-stopped]"),
            EventKind::ExitSignal => info!("[exit-signal]"),
            EventKind::TaskStarting => debug!(task, "[task-starting]"),
            EventKind::TaskStopped => debug!(task, "[task-stopped]"),
            EventKind::TaskFailed => warn!(task, err = reason, "[task-failed]"),
            EventKind::ThrottleScheduled => {
                debug!(task, rate = e.rate_kbps, delay_ms = e.delay_ms, "[throttle-scheduled]");
            }
            EventKind::ThrottleSuperseded => {
                debug!(task, rate = e.rate_kbps, "[throttle-superseded]");
            }
            EventKind::ThrottleApplied => info!(rate = e.rate_kbps, "[throttle-applied]"),
            EventKind::ThrottleFailed => {
                error!(rate = e.rate_kbps, err = reason, "[throttle-failed]");
            }
            EventKind::SubscriberOverflow => {
                warn!(subscriber = task, reason, "[subscriber-overflow]");
            }
            EventKind::SubscriberPanicked => {
                error!(subscriber = task, info = reason, "[subscriber-panicked]");
            }
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
