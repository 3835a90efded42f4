//! # Supervisor: owns the engine lifecycle, the throttle controller and the event fan-out.
//!
//! The [`Supervisor`] creates the engine exactly once, waits for it to come
//! alive, brings up the tunnel proxy on top of it and tears both down on
//! `stop()`. Every piece of background work goes through its [`Scheduler`], so
//! it is visible on the [`Bus`] and in [`Supervisor::active_tasks`].
//!
//! ## Lifecycle
//! ```text
//! start()
//!   ├─► started.swap(true)            (second call → no-op)
//!   ├─► EngineFactory::create(props, AliveSignal)            state = Starting
//!   ├─► spawn "engine-run"   Engine::run() ──────────────► returns → state = Stopped
//!   ├─► spawn "readiness"    loop { is_alive? else log + wait(signal | interval) }
//!   │                          └─► dir = <config dir>/tunnel
//!   │                              TunnelProxyFactory::create(engine, dir)
//!   │                              spawn "tunnel-proxy"  TunnelProxy::run()
//!   │                                                            state = Running
//!   └─► spawn "exit-hook"    termination signal ─► stop() ─► engine exits ─► process exit
//!
//! stop()
//!   ├─► started.swap(false)           (not started → no-op)
//!   ├─► TunnelProxy::stop()                                  state = Stopping
//!   └─► Engine::shutdown_gracefully()      (non-blocking)
//! ```
//!
//! ## Rules
//! - The engine is never recreated; `start()` after a completed stop is an error
//! - Readiness faults (missing config dir, proxy construction, panics) end that
//!   task only; the engine keeps running and the state stays `Starting`
//! - `stop()` never interrupts background tasks; see [`Supervisor::cancel_background`]
//! - Dropping the last handle to the supervisor calls `stop()`

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::{
    core::{
        Config, Scheduler, exit_hook,
        state::{LifecycleState, StateCell},
    },
    engine::{AliveSignal, Engine, EngineFactory, Properties, TunnelProxy, TunnelProxyFactory},
    error::{EngineError, ProxyError, SupervisorError, TaskError},
    events::{Bus, Event, EventKind},
    rates::RateSampler,
    reachability::{self, NetworkState, ReachabilitySnapshot, StatusMessage},
    subscribers::SubscriberSet,
    tasks::{TaskFn, TaskRef},
    throttle::{DerivedLimits, ThrottleController, ThrottleRequest},
};

/// Lifecycle supervisor for the embedded routing engine.
///
/// Built with [`SupervisorBuilder`](crate::SupervisorBuilder).
pub struct Supervisor {
    cfg: Config,
    bus: Bus,
    subs: Arc<SubscriberSet>,
    scheduler: Scheduler,
    engines: Arc<dyn EngineFactory>,
    proxies: Arc<dyn TunnelProxyFactory>,
    properties: Arc<RwLock<Properties>>,

    started: AtomicBool,
    state: StateCell,
    engine: OnceLock<Arc<dyn Engine>>,
    engine_exited: watch::Sender<bool>,
    proxy: Mutex<Option<Arc<dyn TunnelProxy>>>,
    exit_hook: AtomicBool,
    throttle: Arc<ThrottleController>,
}

impl Supervisor {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new_internal(
        cfg: Config,
        bus: Bus,
        subs: Arc<SubscriberSet>,
        scheduler: Scheduler,
        engines: Arc<dyn EngineFactory>,
        proxies: Arc<dyn TunnelProxyFactory>,
        properties: Arc<RwLock<Properties>>,
    ) -> Self {
        let throttle = Arc::new(ThrottleController::new(
            cfg.debounce_window,
            bus.clone(),
            Arc::clone(&properties),
        ));
        Self {
            cfg,
            bus,
            subs,
            scheduler,
            engines,
            proxies,
            properties,
            started: AtomicBool::new(false),
            state: StateCell::new(LifecycleState::Stopped),
            engine: OnceLock::new(),
            engine_exited: watch::channel(false).0,
            proxy: Mutex::new(None),
            exit_hook: AtomicBool::new(false),
            throttle,
        }
    }

    /// Starts the engine in the background.
    ///
    /// Idempotent: a call while already started returns `Ok(())` and does nothing.
    /// Returns [`SupervisorError::AlreadyStopped`] once the engine has been created
    /// and stopped, and [`SupervisorError::EngineCreate`] if the factory fails.
    pub fn start(self: &Arc<Self>) -> Result<(), SupervisorError> {
        if self.started.swap(true, Ordering::AcqRel) {
            debug!("start ignored: already started");
            return Ok(());
        }
        if self.engine.get().is_some() {
            self.started.store(false, Ordering::Release);
            return Err(SupervisorError::AlreadyStopped);
        }

        self.state.set(LifecycleState::Starting);
        self.bus.publish(Event::new(EventKind::StartRequested));
        info!("starting router engine");

        let signal = AliveSignal::new();
        let props = self.properties.read().clone();
        let engine = match self.engines.create(props, signal.clone()) {
            Ok(engine) => engine,
            Err(e) => {
                error!(error = %e, "failed to create router engine");
                self.state.set(LifecycleState::Stopped);
                self.started.store(false, Ordering::Release);
                return Err(SupervisorError::EngineCreate(e));
            }
        };
        let _ = self.engine.set(Arc::clone(&engine));
        self.bus.publish(Event::new(EventKind::EngineCreated));

        self.scheduler.spawn(self.engine_run_task(Arc::clone(&engine)));
        self.scheduler.spawn(self.readiness_task(Arc::clone(&engine), signal));
        if self.cfg.stop_on_signal && !self.exit_hook.swap(true, Ordering::AcqRel) {
            let hook = exit_hook::task(Arc::downgrade(self), self.cfg.exit_on_signal);
            self.scheduler.spawn(hook);
        }

        // stop() may have raced in before the engine handle was published
        if !self.is_started() {
            engine.shutdown_gracefully();
        }
        Ok(())
    }

    /// Stops the tunnel proxy, then requests a graceful engine shutdown.
    ///
    /// Idempotent: a call while not started does nothing. Returns once the
    /// shutdown has been requested.
    pub fn stop(&self) {
        if !self.started.swap(false, Ordering::AcqRel) {
            debug!("stop ignored: not started");
            return;
        }
        self.bus.publish(Event::new(EventKind::StopRequested));
        self.state.set(LifecycleState::Stopping);

        let proxy = self.proxy.lock().take();
        if let Some(proxy) = proxy {
            proxy.stop();
            info!("tunnel proxy stopped");
            self.bus.publish(Event::new(EventKind::ProxyStopped));
        }
        if let Some(engine) = self.engine.get() {
            engine.shutdown_gracefully();
            info!("router engine will shut down gracefully");
            self.bus.publish(Event::new(EventKind::ShutdownRequested));
        }
        if *self.engine_exited.borrow() {
            self.state.set(LifecycleState::Stopped);
        }
    }

    /// True between a successful `start()` and the next `stop()`.
    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state.get()
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Engine handle, once created.
    pub fn engine(&self) -> Option<Arc<dyn Engine>> {
        self.engine.get().cloned()
    }

    /// Tunnel proxy handle while it is running.
    pub fn tunnel_proxy(&self) -> Option<Arc<dyn TunnelProxy>> {
        self.proxy.lock().clone()
    }

    /// Value of `key` in the supervisor's configuration set.
    ///
    /// Includes the desired rates mirrored by bandwidth updates.
    pub fn property(&self, key: &str) -> Option<String> {
        self.properties.read().get(key).cloned()
    }

    /// Sorted names of the background tasks currently running.
    pub fn active_tasks(&self) -> Vec<String> {
        self.scheduler.alive().snapshot()
    }

    /// Number of event subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subs.len()
    }

    /// Subscribes to runtime events published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Cancels every background task running now, including pending bandwidth
    /// updates, the readiness wait and the exit hook.
    ///
    /// Work scheduled afterwards (for example a new bandwidth request) runs
    /// normally. Does not stop the engine; call [`stop`](Self::stop) for that.
    pub fn cancel_background(&self) {
        self.scheduler.cancel_all();
    }

    /// The throttle controller.
    pub fn throttle(&self) -> &Arc<ThrottleController> {
        &self.throttle
    }

    /// Schedules a debounced bandwidth update to `kbps` (both directions).
    pub fn request_bandwidth_update(&self, kbps: u32) -> Result<ThrottleRequest, SupervisorError> {
        let engine = self.engine().ok_or(SupervisorError::NotStarted)?;
        Ok(self.throttle.request(engine, kbps, &self.scheduler))
    }

    /// Applies a bandwidth update to `kbps` (both directions) right away.
    pub fn apply_bandwidth_update(&self, kbps: u32) -> Result<DerivedLimits, SupervisorError> {
        let engine = self.engine.get().ok_or(SupervisorError::NotStarted)?;
        Ok(self.throttle.apply(engine.as_ref(), kbps)?)
    }

    /// Rate sampler over the current engine.
    pub fn rates(&self) -> RateSampler {
        RateSampler::new(self.engine())
    }

    /// One-second receive rate, KB/s.
    pub fn receive_rate_1s(&self) -> f64 {
        self.rates().receive_rate_1s()
    }

    /// One-second send rate, KB/s.
    pub fn send_rate_1s(&self) -> f64 {
        self.rates().send_rate_1s()
    }

    /// Five-minute average receive rate, KB/s.
    pub fn receive_rate_5m(&self) -> f64 {
        self.rates().receive_rate_5m()
    }

    /// Five-minute average send rate, KB/s.
    pub fn send_rate_5m(&self) -> f64 {
        self.rates().send_rate_5m()
    }

    /// Lifetime average receive rate, KB/s.
    pub fn receive_rate_lifetime_avg(&self) -> f64 {
        self.rates().receive_rate_lifetime_avg()
    }

    /// Lifetime average send rate, KB/s.
    pub fn send_rate_lifetime_avg(&self) -> f64 {
        self.rates().send_rate_lifetime_avg()
    }

    /// Total received, MB.
    pub fn total_received_mb(&self) -> f64 {
        self.rates().total_received_mb()
    }

    /// Total sent, MB.
    pub fn total_sent_mb(&self) -> f64 {
        self.rates().total_sent_mb()
    }

    /// Classifies the engine's current reachability.
    ///
    /// Before the engine exists this reports `Testing` ("Not started").
    pub fn classify_reachability(&self) -> StatusMessage {
        match self.engine.get() {
            Some(engine) => reachability::classify(&ReachabilitySnapshot::capture(engine.as_ref())),
            None => StatusMessage::new(NetworkState::Testing, "Not started"),
        }
    }

    fn engine_run_task(self: &Arc<Self>, engine: Arc<dyn Engine>) -> TaskRef {
        let weak = Arc::downgrade(self);
        TaskFn::arc("engine-run", move |ctx: CancellationToken| {
            let engine = Arc::clone(&engine);
            let weak = weak.clone();
            async move {
                let res = tokio::select! {
                    _ = ctx.cancelled() => return Err(TaskError::Canceled),
                    res = engine.run() => res,
                };
                if let Some(sup) = weak.upgrade() {
                    sup.on_engine_exit(res.as_ref().err());
                }
                res.map_err(|e| TaskError::Fatal {
                    error: e.to_string(),
                })
            }
        })
    }

    fn on_engine_exit(&self, err: Option<&EngineError>) {
        self.engine_exited.send_replace(true);
        self.state.set(LifecycleState::Stopped);

        let mut ev = Event::new(EventKind::EngineStopped);
        match err {
            Some(e) => {
                warn!(error = %e, "router engine exited with an error");
                ev = ev.with_reason(e.to_string());
            }
            None => info!("router engine stopped"),
        }
        self.bus.publish(ev);
    }

    fn readiness_task(self: &Arc<Self>, engine: Arc<dyn Engine>, signal: AliveSignal) -> TaskRef {
        let weak = Arc::downgrade(self);
        let interval = self.cfg.readiness_interval();
        TaskFn::arc("readiness", move |ctx: CancellationToken| {
            let engine = Arc::clone(&engine);
            let signal = signal.clone();
            let weak = weak.clone();
            async move {
                let mut pending = 0u32;
                loop {
                    if ctx.is_cancelled() {
                        return Err(TaskError::Canceled);
                    }
                    let Some(sup) = weak.upgrade() else {
                        return Ok(());
                    };
                    if !sup.is_started() {
                        debug!("stopped before the router engine came alive");
                        return Ok(());
                    }
                    if engine.is_alive() {
                        return sup.bring_up_proxy(engine);
                    }

                    pending = pending.saturating_add(1);
                    info!(attempt = pending, "waiting for router engine to start");
                    sup.bus
                        .publish(Event::new(EventKind::ReadinessPending).with_attempt(pending));
                    drop(sup);

                    tokio::select! {
                        _ = ctx.cancelled() => return Err(TaskError::Canceled),
                        _ = signal.wait(), if !signal.is_marked() => {}
                        _ = tokio::time::sleep(interval) => {}
                    }
                }
            }
        })
    }

    fn bring_up_proxy(self: &Arc<Self>, engine: Arc<dyn Engine>) -> Result<(), TaskError> {
        info!("router engine is alive");
        self.bus.publish(Event::new(EventKind::EngineAlive));

        let dir = self.tunnel_dir(engine.as_ref())?;
        let proxy = self.proxies.create(engine, &dir)?;

        {
            let mut slot = self.proxy.lock();
            if !self.is_started() {
                drop(slot);
                proxy.stop();
                debug!("stopped while the tunnel proxy was being created");
                return Ok(());
            }
            *slot = Some(Arc::clone(&proxy));
        }
        self.scheduler.spawn(proxy_run_task(proxy));

        self.state.transition(LifecycleState::Starting, LifecycleState::Running);
        info!(dir = %dir.display(), "tunnel proxy started");
        self.bus.publish(
            Event::new(EventKind::ProxyStarted).with_reason(dir.display().to_string()),
        );
        Ok(())
    }

    fn tunnel_dir(&self, engine: &dyn Engine) -> Result<PathBuf, ProxyError> {
        let key = self.cfg.config_dir_property.as_str();
        let base = engine
            .property(key)
            .or_else(|| self.property(key))
            .ok_or_else(|| ProxyError::MissingConfigDir(key.to_string()))?;
        Ok(PathBuf::from(base).join(&self.cfg.tunnel_subdir))
    }

    /// Stops on behalf of the exit hook and returns a receiver that turns
    /// `true` once the engine-run task has returned.
    pub(crate) fn stop_on_exit_signal(&self) -> watch::Receiver<bool> {
        self.bus.publish(Event::new(EventKind::ExitSignal));
        self.stop();
        self.engine_exited.subscribe()
    }
}

impl Drop for Supervisor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn proxy_run_task(proxy: Arc<dyn TunnelProxy>) -> TaskRef {
    TaskFn::arc("tunnel-proxy", move |ctx: CancellationToken| {
        let proxy = Arc::clone(&proxy);
        async move {
            tokio::select! {
                _ = ctx.cancelled() => Err(TaskError::Canceled),
                res = proxy.run() => res,
            }
        }
    })
}
