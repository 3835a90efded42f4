//! # Bandwidth throttling.
//!
//! One desired rate (KB/s) is turned into the engine's six rate-limit settings
//! and saved in one call. Rapid repeated requests are debounced: only the last
//! request of a burst is applied, once the quiescence window has passed.
//!
//! ```text
//! request(50) ─┐ gen=1 ── sleep(window) ── gen != 2 → superseded
//! request(80) ─┴ gen=2 ── sleep(window) ── gen == 2 → apply(80)
//!                                                      ├─► DerivedLimits::symmetric(80)
//!                                                      ├─► Engine::save_config(six keys)
//!                                                      └─► Engine::reinitialize_bandwidth_limiter()
//! ```

mod controller;
mod limits;

pub use controller::{
    PROP_INBOUND_DESIRED, PROP_OUTBOUND_DESIRED, ThrottleController, ThrottleRequest,
};
pub use limits::{
    DerivedLimits, DirectionLimits, PROP_INBOUND_BANDWIDTH, PROP_INBOUND_BANDWIDTH_PEAK,
    PROP_INBOUND_BURST_BANDWIDTH, PROP_OUTBOUND_BANDWIDTH, PROP_OUTBOUND_BANDWIDTH_PEAK,
    PROP_OUTBOUND_BURST_BANDWIDTH,
};
