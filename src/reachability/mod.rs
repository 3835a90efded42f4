//! # Reachability classification.
//!
//! Reduces the engine's asynchronous, partially-overlapping status signals into
//! one deterministic [`StatusMessage`]:
//!
//! ```text
//! Engine ──► ReachabilitySnapshot::capture() ──► classify() ──► StatusMessage { state, text }
//! ```
//!
//! - [`ReachabilitySnapshot`] read-only bundle of signals sampled at one instant
//! - [`classify`] pure, total decision function over a snapshot
//! - [`NetworkState`], [`StatusMessage`] operator-facing result
//! - [`is_publicly_routable`] address check used for the primary transport

mod classifier;
mod routable;
mod snapshot;
mod state;

pub use classifier::classify;
pub use routable::is_publicly_routable;
pub use snapshot::ReachabilitySnapshot;
pub use state::{NetworkState, StatusMessage};
