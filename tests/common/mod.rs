#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, watch};

use routervisor::{
    AliveSignal, CommStatus, Config, Direction, Engine, EngineError, EngineFactory, Event,
    EventKind, Properties, ProxyError, RateWindow, RouterInfo, Supervisor, SupervisorBuilder,
    TaskError, TunnelProxy, TunnelProxyFactory,
};

pub const CONFIG_DIR: &str = "/var/lib/router";

/// In-memory engine: becomes alive on demand and runs until asked to shut down.
pub struct MockEngine {
    props: Properties,
    signal: AliveSignal,
    alive: AtomicBool,
    shutdown: watch::Sender<bool>,
    save_ok: AtomicBool,
    saves: Mutex<Vec<Properties>>,
    reinits: AtomicUsize,
    rate_bps: Mutex<Result<f64, EngineError>>,
    allocated: Mutex<Result<u64, EngineError>>,
    panic_reads: AtomicBool,
    router_info: Mutex<Option<RouterInfo>>,
    status: Mutex<CommStatus>,
}

impl MockEngine {
    fn new(props: Properties, signal: AliveSignal) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            props,
            signal,
            alive: AtomicBool::new(false),
            shutdown,
            save_ok: AtomicBool::new(true),
            saves: Mutex::new(Vec::new()),
            reinits: AtomicUsize::new(0),
            rate_bps: Mutex::new(Ok(0.0)),
            allocated: Mutex::new(Ok(0)),
            panic_reads: AtomicBool::new(false),
            router_info: Mutex::new(None),
            status: Mutex::new(CommStatus::Unknown),
        }
    }

    pub fn mark_alive(&self) {
        self.alive.store(true, Ordering::SeqCst);
        self.signal.mark_alive();
    }

    pub fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    pub fn set_save_ok(&self, ok: bool) {
        self.save_ok.store(ok, Ordering::SeqCst);
    }

    pub fn saves(&self) -> Vec<Properties> {
        self.saves.lock().clone()
    }

    pub fn reinits(&self) -> usize {
        self.reinits.load(Ordering::SeqCst)
    }

    pub fn set_rate(&self, rate: Result<f64, EngineError>) {
        *self.rate_bps.lock() = rate;
    }

    pub fn set_allocated(&self, bytes: Result<u64, EngineError>) {
        *self.allocated.lock() = bytes;
    }

    /// Makes every rate accessor panic, like a stat manager torn down mid-read.
    pub fn set_panic_reads(&self, panic: bool) {
        self.panic_reads.store(panic, Ordering::SeqCst);
    }

    fn check_reads(&self) {
        if self.panic_reads.load(Ordering::SeqCst) {
            panic!("rate stat missing");
        }
    }

    pub fn publish(&self, status: CommStatus, info: RouterInfo) {
        *self.status.lock() = status;
        *self.router_info.lock() = Some(info);
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn run(&self) -> Result<(), EngineError> {
        let mut rx = self.shutdown.subscribe();
        let _ = rx.wait_for(|stop| *stop).await;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn shutdown_gracefully(&self) {
        self.shutdown.send_replace(true);
    }

    fn save_config(&self, changes: &Properties) -> bool {
        if !self.save_ok.load(Ordering::SeqCst) {
            return false;
        }
        self.saves.lock().push(changes.clone());
        true
    }

    fn reinitialize_bandwidth_limiter(&self) {
        self.reinits.fetch_add(1, Ordering::SeqCst);
    }

    fn current_rate(&self, _dir: Direction) -> Result<f64, EngineError> {
        self.check_reads();
        self.rate_bps.lock().clone()
    }

    fn average_rate(&self, _dir: Direction, _window: RateWindow) -> Result<f64, EngineError> {
        self.check_reads();
        self.rate_bps.lock().clone()
    }

    fn total_allocated_bytes(&self, _dir: Direction) -> Result<u64, EngineError> {
        self.check_reads();
        self.allocated.lock().clone()
    }

    fn uptime(&self) -> Duration {
        Duration::from_secs(10)
    }

    fn is_hidden(&self) -> bool {
        false
    }

    fn graceful_shutdown_in_progress(&self) -> bool {
        self.shutdown_requested()
    }

    fn client_manager_alive(&self) -> bool {
        true
    }

    fn has_comm_system(&self) -> bool {
        true
    }

    fn comm_status(&self) -> CommStatus {
        *self.status.lock()
    }

    fn peer_clock_skew_ms(&self) -> i64 {
        0
    }

    fn active_peer_count(&self) -> u32 {
        3
    }

    fn router_info(&self) -> Option<RouterInfo> {
        self.router_info.lock().clone()
    }

    fn floodfill_enabled(&self) -> bool {
        false
    }

    fn property(&self, key: &str) -> Option<String> {
        self.props.get(key).cloned()
    }
}

#[derive(Default)]
pub struct MockEngineFactory {
    created: AtomicUsize,
    last: Mutex<Option<Arc<MockEngine>>>,
    fail: AtomicBool,
}

impl MockEngineFactory {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn engine(&self) -> Arc<MockEngine> {
        self.last.lock().clone().expect("engine not created yet")
    }
}

impl EngineFactory for MockEngineFactory {
    fn create(
        &self,
        properties: Properties,
        alive: AliveSignal,
    ) -> Result<Arc<dyn Engine>, EngineError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(EngineError::new("router identity unavailable"));
        }
        self.created.fetch_add(1, Ordering::SeqCst);
        let engine = Arc::new(MockEngine::new(properties, alive));
        *self.last.lock() = Some(Arc::clone(&engine));
        Ok(engine)
    }
}

/// Tunnel proxy that serves until stopped.
pub struct MockProxy {
    stop: watch::Sender<bool>,
}

impl MockProxy {
    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }
}

#[async_trait]
impl TunnelProxy for MockProxy {
    async fn run(&self) -> Result<(), TaskError> {
        let mut rx = self.stop.subscribe();
        let _ = rx.wait_for(|stop| *stop).await;
        Ok(())
    }

    fn stop(&self) {
        self.stop.send_replace(true);
    }
}

#[derive(Default)]
pub struct MockProxyFactory {
    dirs: Mutex<Vec<PathBuf>>,
    last: Mutex<Option<Arc<MockProxy>>>,
    fail: AtomicBool,
}

impl MockProxyFactory {
    pub fn created(&self) -> usize {
        self.dirs.lock().len()
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.dirs.lock().clone()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn proxy(&self) -> Arc<MockProxy> {
        self.last.lock().clone().expect("proxy not created yet")
    }
}

impl TunnelProxyFactory for MockProxyFactory {
    fn create(
        &self,
        _engine: Arc<dyn Engine>,
        dir: &Path,
    ) -> Result<Arc<dyn TunnelProxy>, ProxyError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProxyError::Create {
                dir: dir.to_path_buf(),
                reason: "keystore locked".into(),
            });
        }
        self.dirs.lock().push(dir.to_path_buf());
        let (stop, _) = watch::channel(false);
        let proxy = Arc::new(MockProxy { stop });
        *self.last.lock() = Some(Arc::clone(&proxy));
        Ok(proxy)
    }
}

pub struct Harness {
    pub sup: Arc<Supervisor>,
    pub engines: Arc<MockEngineFactory>,
    pub proxies: Arc<MockProxyFactory>,
}

impl Harness {
    /// Supervisor whose configuration names a config directory.
    pub fn new() -> Self {
        Self::with_properties(router_properties())
    }

    pub fn with_properties(props: Properties) -> Self {
        let cfg = Config {
            stop_on_signal: false,
            ..Config::default()
        };
        Self::with_config(cfg, props)
    }

    pub fn with_config(cfg: Config, props: Properties) -> Self {
        let engines = Arc::new(MockEngineFactory::default());
        let proxies = Arc::new(MockProxyFactory::default());
        let sup = SupervisorBuilder::new(cfg)
            .with_properties(props)
            .build(engines.clone(), proxies.clone());
        Self {
            sup,
            engines,
            proxies,
        }
    }

    pub fn engine(&self) -> Arc<MockEngine> {
        self.engines.engine()
    }
}

/// Properties naming [`CONFIG_DIR`].
pub fn router_properties() -> Properties {
    let mut props = Properties::new();
    props.insert("i2p.dir.config".into(), CONFIG_DIR.into());
    props
}

/// Polls `cond` every 10ms, failing after 10s of (virtual) time.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..1000 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

/// Drains every event already published.
pub fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

pub fn count(events: &[Event], kind: EventKind, task: Option<&str>) -> usize {
    events
        .iter()
        .filter(|e| e.kind == kind)
        .filter(|e| task.is_none_or(|t| e.task.as_deref() == Some(t)))
        .count()
}
