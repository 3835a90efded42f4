//! # Runtime events emitted by the supervisor, its tasks and the throttle controller.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Lifecycle events**: engine start/readiness/stop flow
//! - **Task events**: background task execution (starting, stopped, failed)
//! - **Throttle events**: debounced bandwidth updates (scheduled, superseded, applied, failed)
//! - **Subscriber events**: fan-out health (overflow, panic)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! reasons, attempts and requested rates.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Use `seq` to restore the exact order when events are delivered out of order.
//!
//! ## Example
//! ```rust
//! use routervisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::ThrottleFailed)
//!     .with_task("throttle-apply#3")
//!     .with_reason("save failed")
//!     .with_rate(80);
//!
//! assert_eq!(ev.kind, EventKind::ThrottleFailed);
//! assert_eq!(ev.task.as_deref(), Some("throttle-apply#3"));
//! assert_eq!(ev.rate_kbps, Some(80));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(1);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `task`: subscriber name
    /// - `reason`: reason string (e.g., "full", "closed")
    SubscriberOverflow,

    // === Lifecycle events ===
    /// `start()` accepted; the engine is about to be created.
    StartRequested,

    /// The engine handle was created.
    EngineCreated,

    /// Readiness check found the engine not yet alive.
    ///
    /// Sets:
    /// - `attempt`: number of unsuccessful checks so far
    ReadinessPending,

    /// The engine reported itself alive.
    EngineAlive,

    /// The tunnel proxy was constructed and its run task spawned.
    ///
    /// Sets:
    /// - `reason`: proxy directory
    ProxyStarted,

    /// `stop()` accepted.
    StopRequested,

    /// The tunnel proxy was stopped.
    ProxyStopped,

    /// Graceful engine shutdown was requested.
    ShutdownRequested,

    /// The engine run loop returned.
    ///
    /// Sets:
    /// - `reason`: error message, if the run loop failed
    EngineStopped,

    /// A process termination signal was observed by the exit hook.
    ExitSignal,

    // === Task events ===
    /// A background task is starting.
    ///
    /// Sets:
    /// - `task`: task name
    TaskStarting,

    /// A background task finished (successfully **or** by graceful cancellation).
    ///
    /// Sets:
    /// - `task`: task name
    TaskStopped,

    /// A background task failed or panicked. It is not restarted.
    ///
    /// Sets:
    /// - `task`: task name
    /// - `reason`: failure message
    TaskFailed,

    // === Throttle events ===
    /// A debounced bandwidth update was scheduled.
    ///
    /// Sets:
    /// - `task`: apply-task name
    /// - `rate_kbps`: requested rate
    /// - `delay_ms`: quiescence window
    ThrottleScheduled,

    /// A scheduled update was superseded by a newer request and dropped.
    ///
    /// Sets:
    /// - `task`: apply-task name
    /// - `rate_kbps`: dropped rate
    ThrottleSuperseded,

    /// New bandwidth limits were persisted and the limiter reinitialized.
    ///
    /// Sets:
    /// - `rate_kbps`: applied rate
    ThrottleApplied,

    /// Persisting new bandwidth limits failed.
    ///
    /// Sets:
    /// - `rate_kbps`: rate that failed
    /// - `reason`: failure message
    ThrottleFailed,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Name of the task, if applicable.
    pub task: Option<Arc<str>>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Attempt count (starting from 1).
    pub attempt: Option<u32>,
    /// Requested bandwidth in KB/s.
    pub rate_kbps: Option<u32>,
    /// Delay in milliseconds (compact).
    pub delay_ms: Option<u32>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            reason: None,
            attempt: None,
            rate_kbps: None,
            delay_ms: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a task name.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches an attempt count.
    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Attaches a requested rate.
    #[inline]
    pub fn with_rate(mut self, kbps: u32) -> Self {
        self.rate_kbps = Some(kbps);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_task(subscriber)
            .with_reason(format!("subscriber={subscriber} reason={reason}"))
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_task(subscriber)
            .with_reason(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStopped);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_is_saturated_to_u32() {
        let ev = Event::new(EventKind::ThrottleScheduled).with_delay(Duration::from_secs(u64::MAX));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
