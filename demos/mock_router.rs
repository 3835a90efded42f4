//! # Demo: mock_router
//!
//! Supervises a simulated routing engine end to end.
//!
//! Demonstrates how to:
//! - Implement [`Engine`] / [`EngineFactory`] and [`TunnelProxy`] / [`TunnelProxyFactory`].
//! - Start the engine and watch readiness, then proxy bring-up, through [`LogWriter`].
//! - Send a burst of bandwidth requests and see only the last one applied.
//! - Poll reachability and throughput while running.
//!
//! ## Flow
//! ```text
//! start()
//!   ├─► engine-run    (SimEngine marks itself alive after 3s)
//!   ├─► readiness     ("waiting for router engine to start" x3)
//!   └─► tunnel-proxy  (<config dir>/tunnel)
//! request(256), request(512), request(1024) ──► 2s later: apply(1024) once
//! stop() ──► proxy stopped ──► engine shuts down ──► Stopped
//! ```
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example mock_router --features logging
//! ```

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use routervisor::{
    AliveSignal, CommStatus, Config, Direction, Engine, EngineError, EngineFactory,
    LifecycleState, LogWriter, Properties, ProxyError, PublishedAddress, RateWindow, RouterInfo,
    Subscribe, SupervisorBuilder, TaskError, Transport, TunnelProxy, TunnelProxyFactory,
};

const STARTUP: Duration = Duration::from_secs(3);

struct SimEngine {
    props: Properties,
    alive_signal: AliveSignal,
    alive: AtomicBool,
    started_at: Instant,
    shutdown: watch::Sender<bool>,
    saved: Mutex<Properties>,
    allocated: AtomicU64,
}

#[async_trait]
impl Engine for SimEngine {
    async fn run(&self) -> Result<(), EngineError> {
        let mut stop = self.shutdown.subscribe();
        tokio::select! {
            _ = tokio::time::sleep(STARTUP) => {
                self.alive.store(true, Ordering::Release);
                self.alive_signal.mark_alive();
            }
            _ = stop.wait_for(|s| *s) => return Ok(()),
        }
        let _ = stop.wait_for(|s| *s).await;
        Ok(())
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    fn shutdown_gracefully(&self) {
        self.shutdown.send_replace(true);
    }

    fn save_config(&self, changes: &Properties) -> bool {
        self.saved.lock().extend(changes.clone());
        true
    }

    fn reinitialize_bandwidth_limiter(&self) {}

    fn current_rate(&self, dir: Direction) -> Result<f64, EngineError> {
        let secs = self.started_at.elapsed().as_secs_f64();
        Ok(match dir {
            Direction::Inbound => 40_960.0 + 1024.0 * secs,
            Direction::Outbound => 20_480.0,
        })
    }

    fn average_rate(&self, dir: Direction, _window: RateWindow) -> Result<f64, EngineError> {
        self.current_rate(dir).map(|r| r * 0.9)
    }

    fn total_allocated_bytes(&self, _dir: Direction) -> Result<u64, EngineError> {
        Ok(self.allocated.fetch_add(512 * 1024, Ordering::Relaxed))
    }

    fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn is_hidden(&self) -> bool {
        false
    }

    fn graceful_shutdown_in_progress(&self) -> bool {
        *self.shutdown.borrow()
    }

    fn client_manager_alive(&self) -> bool {
        true
    }

    fn has_comm_system(&self) -> bool {
        true
    }

    fn comm_status(&self) -> CommStatus {
        if self.is_alive() {
            CommStatus::Ok
        } else {
            CommStatus::Unknown
        }
    }

    fn peer_clock_skew_ms(&self) -> i64 {
        120
    }

    fn active_peer_count(&self) -> u32 {
        if self.is_alive() { 12 } else { 0 }
    }

    fn router_info(&self) -> Option<RouterInfo> {
        self.is_alive().then(|| {
            RouterInfo::new().with_address(
                Transport::Primary,
                PublishedAddress::resolved([93, 184, 216, 34].into(), 23_456),
            )
        })
    }

    fn floodfill_enabled(&self) -> bool {
        false
    }

    fn property(&self, key: &str) -> Option<String> {
        self.props.get(key).cloned()
    }
}

struct SimEngineFactory;

impl EngineFactory for SimEngineFactory {
    fn create(
        &self,
        properties: Properties,
        alive: AliveSignal,
    ) -> Result<Arc<dyn Engine>, EngineError> {
        let (shutdown, _) = watch::channel(false);
        Ok(Arc::new(SimEngine {
            props: properties,
            alive_signal: alive,
            alive: AtomicBool::new(false),
            started_at: Instant::now(),
            shutdown,
            saved: Mutex::new(Properties::new()),
            allocated: AtomicU64::new(0),
        }))
    }
}

struct SimProxy {
    stop: watch::Sender<bool>,
}

#[async_trait]
impl TunnelProxy for SimProxy {
    async fn run(&self) -> Result<(), TaskError> {
        let _ = self.stop.subscribe().wait_for(|s| *s).await;
        Ok(())
    }

    fn stop(&self) {
        self.stop.send_replace(true);
    }
}

struct SimProxyFactory;

impl TunnelProxyFactory for SimProxyFactory {
    fn create(
        &self,
        _engine: Arc<dyn Engine>,
        dir: &Path,
    ) -> Result<Arc<dyn TunnelProxy>, ProxyError> {
        tracing::info!(dir = %dir.display(), "proxy would keep its keys here");
        let (stop, _) = watch::channel(false);
        Ok(Arc::new(SimProxy { stop }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut props = Properties::new();
    props.insert(
        "i2p.dir.config".into(),
        std::env::temp_dir().join("mock-router").display().to_string(),
    );
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    let sup = SupervisorBuilder::new(Config::default())
        .with_subscribers(subs)
        .with_properties(props)
        .build(Arc::new(SimEngineFactory), Arc::new(SimProxyFactory));

    sup.start()?;
    while sup.state() != LifecycleState::Running {
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    for kbps in [256, 512, 1024] {
        sup.request_bandwidth_update(kbps)?;
        tokio::time::sleep(Duration::from_millis(300)).await;
    }

    for _ in 0..4 {
        tokio::time::sleep(Duration::from_secs(1)).await;
        tracing::info!(
            status = %sup.classify_reachability(),
            in_kbps = %format!("{:.1}", sup.receive_rate_1s()),
            out_kbps = %format!("{:.1}", sup.send_rate_1s()),
            total_in_mb = %format!("{:.2}", sup.total_received_mb()),
            tasks = ?sup.active_tasks(),
            "router status"
        );
    }
    tracing::info!(
        desired = ?sup.property(routervisor::throttle::PROP_INBOUND_DESIRED),
        "bandwidth after the burst"
    );

    sup.stop();
    while sup.state() != LifecycleState::Stopped {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    Ok(())
}
