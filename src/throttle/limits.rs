//! Rate-limit derivation.
//!
//! Per direction, from a desired rate `n` in KB/s:
//!
//! ```text
//! rate      = n / 1.024                      (KB/s → engine units)
//! burst     = round(rate)
//! peak      = round(20 * rate)               (20 s burst window)
//! sustained = round(rate - min(rate * 10%, 50))
//! ```

use crate::engine::{Direction, Properties};

/// Sustained inbound bandwidth.
pub const PROP_INBOUND_BANDWIDTH: &str = "i2np.bandwidth.inboundKBytesPerSecond";
/// Inbound burst bandwidth.
pub const PROP_INBOUND_BURST_BANDWIDTH: &str = "i2np.bandwidth.inboundBurstKBytesPerSecond";
/// Inbound burst size.
pub const PROP_INBOUND_BANDWIDTH_PEAK: &str = "i2np.bandwidth.inboundBurstKBytes";
/// Sustained outbound bandwidth.
pub const PROP_OUTBOUND_BANDWIDTH: &str = "i2np.bandwidth.outboundKBytesPerSecond";
/// Outbound burst bandwidth.
pub const PROP_OUTBOUND_BURST_BANDWIDTH: &str = "i2np.bandwidth.outboundBurstKBytesPerSecond";
/// Outbound burst size.
pub const PROP_OUTBOUND_BANDWIDTH_PEAK: &str = "i2np.bandwidth.outboundBurstKBytes";

const UNIT_DIVISOR: f32 = 1.024;
const BURST_SECONDS: f32 = 20.0;
const BURST_PCT: f32 = 10.0;
const MAX_REDUCTION: f32 = 50.0;

/// Limits for one traffic direction, in engine units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionLimits {
    /// Long-term rate.
    pub sustained: u32,
    /// Short-term rate.
    pub burst: u32,
    /// Burst size.
    pub peak: u32,
}

impl DirectionLimits {
    /// Derives the limits for one direction from `kbps`.
    pub fn derive(kbps: u32) -> Self {
        let rate = kbps as f32 / UNIT_DIVISOR;
        let burst = round_half_up(rate);
        let peak = round_half_up(BURST_SECONDS * rate);
        let reduction = (rate * BURST_PCT / 100.0).min(MAX_REDUCTION);
        let sustained = round_half_up(rate - reduction);
        Self {
            sustained,
            burst,
            peak,
        }
    }
}

/// All six rate-limit settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedLimits {
    /// Inbound limits.
    pub inbound: DirectionLimits,
    /// Outbound limits.
    pub outbound: DirectionLimits,
}

impl DerivedLimits {
    /// Derives each direction independently from its own desired rate.
    pub fn derive(inbound_kbps: u32, outbound_kbps: u32) -> Self {
        Self {
            inbound: DirectionLimits::derive(inbound_kbps),
            outbound: DirectionLimits::derive(outbound_kbps),
        }
    }

    /// Same desired rate in both directions.
    pub fn symmetric(kbps: u32) -> Self {
        Self::derive(kbps, kbps)
    }

    /// Limits for one direction.
    pub fn direction(&self, dir: Direction) -> DirectionLimits {
        match dir {
            Direction::Inbound => self.inbound,
            Direction::Outbound => self.outbound,
        }
    }

    /// The engine configuration changes carrying these limits.
    pub fn to_properties(&self) -> Properties {
        let pairs = [
            (PROP_INBOUND_BANDWIDTH, self.inbound.sustained),
            (PROP_INBOUND_BURST_BANDWIDTH, self.inbound.burst),
            (PROP_INBOUND_BANDWIDTH_PEAK, self.inbound.peak),
            (PROP_OUTBOUND_BANDWIDTH, self.outbound.sustained),
            (PROP_OUTBOUND_BURST_BANDWIDTH, self.outbound.burst),
            (PROP_OUTBOUND_BANDWIDTH_PEAK, self.outbound.peak),
        ];
        pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

fn round_half_up(x: f32) -> u32 {
    (x + 0.5).floor() as u32
}
