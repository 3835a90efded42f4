//! # Event subscribers for the routervisor runtime.
//!
//! This module provides the [`Subscribe`] trait, the fan-out [`SubscriberSet`]
//! and the built-in `LogWriter` (feature `logging`).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor/Runner/Throttle ── publish(Event) ──► Bus ──► listener ──► SubscriberSet
//!                                                                          │
//!                                                               ┌──────────┴──────────┐
//!                                                               ▼                     ▼
//!                                                           LogWriter              Custom
//!                                                           (tracing)       (metrics, alerts)
//! ```
//!
//! Delivery is best effort: a lagging listener skips events and a full
//! subscriber queue drops them. Nothing in the runtime relies on a subscriber
//! seeing every event.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub(crate) use set::panic_message;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
