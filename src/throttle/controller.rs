//! # Debounced throttle controller.
//!
//! [`ThrottleController`] owns the debounce state shared by every pending
//! request: a monotonic generation counter and the latest [`ThrottleRequest`].
//!
//! ## Flow
//! ```text
//! request(kbps)
//!   ├─► gen = generation.fetch_add(1) + 1
//!   ├─► latest = ThrottleRequest { kbps, now, gen }
//!   ├─► publish ThrottleScheduled
//!   └─► Scheduler::spawn("throttle-apply#gen")
//!          sleep_until(requested_at + window)
//!          generation == gen ? apply(kbps) : publish ThrottleSuperseded
//!
//! apply(kbps)
//!   ├─► mirror desired rate (in memory)
//!   ├─► Engine::save_config(six keys)
//!   │     └─ false → publish ThrottleFailed, Err(Persist)   (limiter untouched)
//!   └─► Engine::reinitialize_bandwidth_limiter() → publish ThrottleApplied
//! ```
//!
//! ## Rules
//! - Last writer wins: only the request holding the newest generation is applied
//! - Stale delayed tasks wake up, see a newer generation and exit quietly
//! - A failure inside a delayed task never reaches the caller

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    core::Scheduler,
    engine::{Engine, Properties},
    error::{TaskError, ThrottleError},
    events::{Bus, Event, EventKind},
    tasks::{TaskFn, TaskRef},
    throttle::limits::DerivedLimits,
};

/// In-memory mirror of the desired inbound rate.
pub const PROP_INBOUND_DESIRED: &str = "i2np.inboundKBytesPerSecond";
/// In-memory mirror of the desired outbound rate.
pub const PROP_OUTBOUND_DESIRED: &str = "i2np.outboundKBytesPerSecond";

/// A debounced bandwidth request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRequest {
    /// Desired rate in KB/s, both directions.
    pub desired_kbps: u32,
    /// When the request was submitted.
    pub requested_at: Instant,
    /// Debounce generation; the highest one wins.
    pub generation: u64,
}

impl ThrottleRequest {
    /// Earliest instant the request may be applied.
    pub fn due_at(&self, window: Duration) -> Instant {
        self.requested_at + window
    }
}

/// Turns desired rates into engine rate limits, debouncing rapid requests.
pub struct ThrottleController {
    window: Duration,
    generation: AtomicU64,
    latest: Mutex<Option<ThrottleRequest>>,
    bus: Bus,
    mirror: Arc<RwLock<Properties>>,
}

impl ThrottleController {
    /// Creates a controller with the given quiescence `window`.
    ///
    /// `mirror` receives the desired rates on every [`apply`](Self::apply).
    pub fn new(window: Duration, bus: Bus, mirror: Arc<RwLock<Properties>>) -> Self {
        Self {
            window,
            generation: AtomicU64::new(0),
            latest: Mutex::new(None),
            bus,
            mirror,
        }
    }

    /// Quiescence window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Generation of the newest request (0 before the first one).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The newest request, if any.
    pub fn latest(&self) -> Option<ThrottleRequest> {
        *self.latest.lock()
    }

    /// Schedules `kbps` to be applied once the window passes without a newer request.
    pub fn request(
        self: &Arc<Self>,
        engine: Arc<dyn Engine>,
        kbps: u32,
        sched: &Scheduler,
    ) -> ThrottleRequest {
        let req = {
            let mut latest = self.latest.lock();
            let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
            let req = ThrottleRequest {
                desired_kbps: kbps,
                requested_at: Instant::now(),
                generation,
            };
            *latest = Some(req);
            req
        };

        let name = format!("throttle-apply#{}", req.generation);
        self.bus.publish(
            Event::new(EventKind::ThrottleScheduled)
                .with_task(name.as_str())
                .with_rate(kbps)
                .with_delay(self.window),
        );
        sched.spawn(self.apply_task(name, engine, req));
        req
    }

    fn apply_task(
        self: &Arc<Self>,
        name: String,
        engine: Arc<dyn Engine>,
        req: ThrottleRequest,
    ) -> TaskRef {
        let me = Arc::clone(self);
        let task_name = name.clone();
        TaskFn::arc(task_name, move |ctx: CancellationToken| {
            let me = Arc::clone(&me);
            let engine = Arc::clone(&engine);
            let name = name.clone();
            async move {
                tokio::select! {
                    _ = ctx.cancelled() => return Err(TaskError::Canceled),
                    _ = tokio::time::sleep_until(req.due_at(me.window)) => {}
                }

                if me.generation() != req.generation {
                    debug!(task = %name, kbps = req.desired_kbps, "bandwidth request superseded");
                    me.bus.publish(
                        Event::new(EventKind::ThrottleSuperseded)
                            .with_task(name.as_str())
                            .with_rate(req.desired_kbps),
                    );
                    return Ok(());
                }

                me.apply(engine.as_ref(), req.desired_kbps)
                    .map(|_| ())
                    .map_err(|e| TaskError::Fail {
                        error: e.to_string(),
                    })
            }
        })
    }

    /// Derives, persists and activates new limits for `kbps` right away.
    ///
    /// The limiter is reinitialized only after a successful save.
    pub fn apply(&self, engine: &dyn Engine, kbps: u32) -> Result<DerivedLimits, ThrottleError> {
        let limits = DerivedLimits::symmetric(kbps);
        {
            let mut mirror = self.mirror.write();
            mirror.insert(PROP_INBOUND_DESIRED.to_string(), kbps.to_string());
            mirror.insert(PROP_OUTBOUND_DESIRED.to_string(), kbps.to_string());
        }

        if !engine.save_config(&limits.to_properties()) {
            let err = ThrottleError::Persist { kbps };
            warn!(kbps, label = err.as_label(), "{err}");
            self.bus.publish(
                Event::new(EventKind::ThrottleFailed)
                    .with_rate(kbps)
                    .with_reason(err.to_string()),
            );
            return Err(err);
        }

        engine.reinitialize_bandwidth_limiter();
        info!(
            kbps,
            inbound_sustained = limits.inbound.sustained,
            inbound_burst = limits.inbound.burst,
            inbound_peak = limits.inbound.peak,
            "bandwidth limits applied"
        );
        self.bus.publish(Event::new(EventKind::ThrottleApplied).with_rate(kbps));
        Ok(limits)
    }
}
