//! # routervisor
//!
//! **Routervisor** supervises an embedded packet-routing engine.
//!
//! It starts the engine in the background, waits for it to come alive before
//! bringing up the tunnel proxy that depends on it, applies bandwidth limits
//! with debounce semantics and classifies the engine's live reachability into
//! a small set of operator-facing states. The engine and the proxy themselves
//! are consumed through the [`Engine`] and [`TunnelProxy`] traits.
//!
//! ## Architecture
//! ### Overview
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Supervisor (lifecycle owner)                                     │
//! │  - EngineFactory / TunnelProxyFactory                             │
//! │  - ThrottleController (debounced bandwidth updates)               │
//! │  - Scheduler (background tasks under one cancellation root)       │
//! │  - AliveTracker (updated by the Scheduler around every task run)  │
//! └──────┬──────────────────┬──────────────────┬───────────────┬──────┘
//!        ▼                  ▼                  ▼               ▼
//!   ┌────────────┐   ┌──────────────┐   ┌──────────────┐  ┌──────────────────┐
//!   │ engine-run │   │  readiness   │   │ tunnel-proxy │  │ throttle-apply#N │
//!   │ Engine::run│   │ alive? proxy │   │ Proxy::run   │  │ sleep, gen check │
//!   └─────┬──────┘   └──────┬───────┘   └──────┬───────┘  └────────┬─────────┘
//!         │ TaskStarting / TaskStopped / TaskFailed + lifecycle and throttle events
//!         ▼                 ▼                  ▼                   ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        Bus (broadcast channel)                    │
//! │                    (capacity: Config::bus_capacity)               │
//! └─────────────────────────────────┬─────────────────────────────────┘
//!                                   ▼
//!                            SubscriberSet
//!                          (per-sub queues)
//!                              ┌────┴────┐
//!                              ▼         ▼
//!                          LogWriter   custom
//! ```
//!
//! ### Reachability
//! ```text
//! Engine ──► ReachabilitySnapshot::capture() ──► classify() ──► StatusMessage { NetworkState, text }
//! ```
//!
//! ## Features
//! | Area              | Description                                                 | Key types / traits                          |
//! |-------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Lifecycle**     | Idempotent start/stop, readiness wait, proxy bring-up.      | [`Supervisor`], [`LifecycleState`]          |
//! | **Throttle**      | Desired rate → six limits, debounced application.           | [`ThrottleController`], [`DerivedLimits`]   |
//! | **Reachability**  | Ordered multi-signal classification.                        | [`NetworkState`], [`StatusMessage`]         |
//! | **Rates**         | Throughput counters that degrade to zero.                   | [`RateSampler`]                             |
//! | **Subscriber API**| Hook into runtime events (logging, metrics, custom).        | [`Subscribe`], [`Event`]                    |
//! | **Errors**        | Typed errors for supervision, throttling and tasks.         | [`SupervisorError`], [`TaskError`]          |
//! | **Configuration** | Centralize runtime settings.                                | [`Config`]                                  |
//!
//! ## Optional features
//! - `logging`: exports a built-in [`LogWriter`] that renders events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::{path::Path, sync::Arc};
//! use routervisor::{
//!     AliveSignal, Config, Engine, EngineError, EngineFactory, NetworkState, Properties,
//!     ProxyError, SupervisorBuilder, SupervisorError, TunnelProxy, TunnelProxyFactory,
//! };
//!
//! struct NoEngine;
//! impl EngineFactory for NoEngine {
//!     fn create(&self, _: Properties, _: AliveSignal) -> Result<Arc<dyn Engine>, EngineError> {
//!         Err(EngineError::new("no engine in this example"))
//!     }
//! }
//!
//! struct NoProxy;
//! impl TunnelProxyFactory for NoProxy {
//!     fn create(&self, _: Arc<dyn Engine>, dir: &Path) -> Result<Arc<dyn TunnelProxy>, ProxyError> {
//!         Err(ProxyError::Create { dir: dir.to_path_buf(), reason: "unused".into() })
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.stop_on_signal = false;
//!
//!     let sup = SupervisorBuilder::new(cfg).build(Arc::new(NoEngine), Arc::new(NoProxy));
//!
//!     assert_eq!(sup.classify_reachability().state(), NetworkState::Testing);
//!     assert!(matches!(sup.start(), Err(SupervisorError::EngineCreate(_))));
//!     assert!(!sup.is_started());
//!     assert_eq!(sup.receive_rate_1s(), 0.0);
//! }
//! ```
mod core;
mod error;
mod events;
mod rates;
mod subscribers;
mod tasks;

pub mod engine;
pub mod reachability;
pub mod throttle;

// ---- Public re-exports ----

pub use crate::core::{
    AliveTracker, Config, LifecycleState, Scheduler, Supervisor, SupervisorBuilder,
};
pub use engine::{
    AliveSignal, CommStatus, Direction, Engine, EngineFactory, Properties, PublishedAddress,
    RateWindow, RouterInfo, Transport, TunnelProxy, TunnelProxyFactory,
};
pub use error::{EngineError, ProxyError, SupervisorError, TaskError, ThrottleError};
pub use events::{Bus, Event, EventKind};
pub use rates::RateSampler;
pub use reachability::{NetworkState, ReachabilitySnapshot, StatusMessage};
pub use subscribers::{Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Task, TaskFn, TaskRef};
pub use throttle::{DerivedLimits, DirectionLimits, ThrottleController, ThrottleRequest};

// Optional: expose a simple built-in logger subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
