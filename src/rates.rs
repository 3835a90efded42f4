//! Read-only throughput and allocation counters.
//!
//! Every getter degrades to `0.0` when the engine is absent, an accessor
//! fails or panics, or the reading is not finite.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tracing::debug;

use crate::engine::{Direction, Engine, RateWindow};
use crate::error::EngineError;
use crate::subscribers::panic_message;

const BYTES_PER_KB: f64 = 1024.0;
const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Samples the engine's rate counters in KB/s and MB.
#[derive(Clone, Default)]
pub struct RateSampler {
    engine: Option<Arc<dyn Engine>>,
}

impl RateSampler {
    /// Sampler over `engine`; `None` yields zeros everywhere.
    pub fn new(engine: Option<Arc<dyn Engine>>) -> Self {
        Self { engine }
    }

    /// One-second receive rate, KB/s.
    pub fn receive_rate_1s(&self) -> f64 {
        self.sample("receive_rate_1s", BYTES_PER_KB, |e| e.current_rate(Direction::Inbound))
    }

    /// One-second send rate, KB/s.
    pub fn send_rate_1s(&self) -> f64 {
        self.sample("send_rate_1s", BYTES_PER_KB, |e| e.current_rate(Direction::Outbound))
    }

    /// Five-minute average receive rate, KB/s.
    pub fn receive_rate_5m(&self) -> f64 {
        self.sample("receive_rate_5m", BYTES_PER_KB, |e| {
            e.average_rate(Direction::Inbound, RateWindow::FiveMinutes)
        })
    }

    /// Five-minute average send rate, KB/s.
    pub fn send_rate_5m(&self) -> f64 {
        self.sample("send_rate_5m", BYTES_PER_KB, |e| {
            e.average_rate(Direction::Outbound, RateWindow::FiveMinutes)
        })
    }

    /// Lifetime average receive rate, KB/s.
    pub fn receive_rate_lifetime_avg(&self) -> f64 {
        self.sample("receive_rate_lifetime_avg", BYTES_PER_KB, |e| {
            e.average_rate(Direction::Inbound, RateWindow::Lifetime)
        })
    }

    /// Lifetime average send rate, KB/s.
    pub fn send_rate_lifetime_avg(&self) -> f64 {
        self.sample("send_rate_lifetime_avg", BYTES_PER_KB, |e| {
            e.average_rate(Direction::Outbound, RateWindow::Lifetime)
        })
    }

    /// Total bytes allocated for receiving, MB.
    pub fn total_received_mb(&self) -> f64 {
        self.sample("total_received_mb", BYTES_PER_MB, |e| {
            e.total_allocated_bytes(Direction::Inbound).map(|b| b as f64)
        })
    }

    /// Total bytes allocated for sending, MB.
    pub fn total_sent_mb(&self) -> f64 {
        self.sample("total_sent_mb", BYTES_PER_MB, |e| {
            e.total_allocated_bytes(Direction::Outbound).map(|b| b as f64)
        })
    }

    fn sample<F>(&self, what: &'static str, divisor: f64, read: F) -> f64
    where
        F: FnOnce(&dyn Engine) -> Result<f64, EngineError>,
    {
        let Some(engine) = self.engine.as_deref() else {
            return 0.0;
        };
        match catch_unwind(AssertUnwindSafe(|| read(engine))) {
            Ok(Ok(v)) if v.is_finite() => v / divisor,
            Ok(Ok(v)) => {
                debug!(sensor = what, value = v, "non-finite reading; reporting 0");
                0.0
            }
            Ok(Err(e)) => {
                debug!(sensor = what, error = %e, "sensor read failed; reporting 0");
                0.0
            }
            Err(panic_err) => {
                let info = panic_message(&*panic_err);
                debug!(sensor = what, panic = %info, "sensor read panicked; reporting 0");
                0.0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_engine_reads_zero() {
        let s = RateSampler::default();
        assert_eq!(s.receive_rate_1s(), 0.0);
        assert_eq!(s.send_rate_5m(), 0.0);
        assert_eq!(s.total_sent_mb(), 0.0);
    }
}
