//! # Engine boundary.
//!
//! The routing engine and the tunnel proxy are opaque collaborators. This
//! module describes the capability set the supervisor consumes from them:
//!
//! - [`Engine`] / [`EngineFactory`] - the embedded router and how to build it
//! - [`TunnelProxy`] / [`TunnelProxyFactory`] - the proxy started once the engine is alive
//! - [`AliveSignal`] - one-shot liveness notification from the engine
//! - [`CommStatus`], [`RouterInfo`], [`Transport`] - reachability inputs
//!
//! ## Wiring
//! ```text
//! Supervisor::start()
//!   └─► EngineFactory::create(properties, AliveSignal) ─► Arc<dyn Engine>
//!         ├─► Engine::run()            (engine-run task, process lifetime)
//!         └─► AliveSignal::mark_alive  (observed by the readiness task)
//!               └─► TunnelProxyFactory::create(engine, dir) ─► TunnelProxy::run()
//! ```

mod proxy;
mod signal;
mod status;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::EngineError;

pub use proxy::{TunnelProxy, TunnelProxyFactory};
pub use signal::AliveSignal;
pub use status::{CommStatus, PublishedAddress, RouterInfo, Transport};

/// String-keyed engine configuration.
pub type Properties = BTreeMap<String, String>;

/// Traffic direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Traffic received by the engine.
    Inbound,
    /// Traffic sent by the engine.
    Outbound,
}

/// Averaging window for engine rate statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateWindow {
    /// Rolling five-minute average.
    FiveMinutes,
    /// Average over the engine's lifetime.
    Lifetime,
}

/// The embedded routing engine.
///
/// All accessors are called from arbitrary tasks; implementations must be
/// cheap and non-blocking. Rate accessors report bytes per second.
#[async_trait]
pub trait Engine: Send + Sync + 'static {
    /// Runs the engine until it stops. Must call [`AliveSignal::mark_alive`] once operational.
    async fn run(&self) -> Result<(), EngineError>;

    /// True once the engine is operational.
    fn is_alive(&self) -> bool;

    /// Begins a graceful shutdown and returns immediately; `run` returns once it completes.
    fn shutdown_gracefully(&self);

    /// Persists configuration changes in one save. Returns `false` on failure.
    fn save_config(&self, changes: &Properties) -> bool;

    /// Reloads the rate limiter from the saved configuration.
    fn reinitialize_bandwidth_limiter(&self);

    /// Current (one-second) throughput.
    fn current_rate(&self, dir: Direction) -> Result<f64, EngineError>;

    /// Average throughput over `window`.
    fn average_rate(&self, dir: Direction, window: RateWindow) -> Result<f64, EngineError>;

    /// Total bytes allocated by the rate limiter since start.
    fn total_allocated_bytes(&self, dir: Direction) -> Result<u64, EngineError>;

    /// Time since the engine started.
    fn uptime(&self) -> Duration;

    /// True when the engine runs in hidden mode.
    fn is_hidden(&self) -> bool;

    /// True while a graceful shutdown is in progress.
    fn graceful_shutdown_in_progress(&self) -> bool;

    /// True when the local client manager is serving.
    fn client_manager_alive(&self) -> bool;

    /// False when the engine runs with a non-networked (test) comm system.
    fn has_comm_system(&self) -> bool;

    /// Comm-system reachability status.
    fn comm_status(&self) -> CommStatus;

    /// Average clock skew reported by peers, in milliseconds (signed).
    fn peer_clock_skew_ms(&self) -> i64;

    /// Number of currently active peers.
    fn active_peer_count(&self) -> u32;

    /// Published router info, once the engine has one.
    fn router_info(&self) -> Option<RouterInfo>;

    /// True when the engine participates as a floodfill.
    fn floodfill_enabled(&self) -> bool;

    /// Configuration lookup.
    fn property(&self, key: &str) -> Option<String>;
}

/// Builds the engine from a configuration set.
pub trait EngineFactory: Send + Sync + 'static {
    /// Creates a new engine. `alive` is the engine's one-shot liveness notifier.
    fn create(
        &self,
        properties: Properties,
        alive: AliveSignal,
    ) -> Result<Arc<dyn Engine>, EngineError>;
}
