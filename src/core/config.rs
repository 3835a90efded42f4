//! # Supervisor runtime configuration.
//!
//! Provides [`Config`] centralized settings for the supervisor runtime.
//!
//! ## Sentinel values
//! - `readiness_interval = 0s` → clamped to 1ms by [`Config::readiness_interval`]
//! - `bus_capacity = 0` → clamped to 1 by [`Config::bus_capacity_clamped`]
//! - `debounce_window = 0s` → debounced requests apply on the next scheduler tick

use std::time::Duration;

/// Global configuration for the supervisor runtime.
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Cadence of the readiness check while the engine is not yet alive.
    ///
    /// Each unsuccessful check is logged. The engine's alive signal can end the
    /// wait early.
    pub readiness_interval: Duration,

    /// Quiescence window for debounced bandwidth requests.
    pub debounce_window: Duration,

    /// Capacity of the event bus broadcast channel ring buffer.
    pub bus_capacity: usize,

    /// Engine property naming the configuration directory.
    pub config_dir_property: String,

    /// Subdirectory of the configuration directory handed to the tunnel proxy.
    pub tunnel_subdir: String,

    /// Stop the supervisor when the process receives a termination signal.
    pub stop_on_signal: bool,

    /// After a signal-triggered stop, end the process once the engine has
    /// exited (or a second signal arrives).
    ///
    /// Only meaningful with `stop_on_signal`. Turn it off when the host wants
    /// to handle process exit itself.
    pub exit_on_signal: bool,
}

impl Config {
    /// Returns the readiness interval, never zero.
    #[inline]
    pub fn readiness_interval(&self) -> Duration {
        self.readiness_interval.max(Duration::from_millis(1))
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `readiness_interval = 1s`
    /// - `debounce_window = 2000ms`
    /// - `bus_capacity = 1024`
    /// - `config_dir_property = "i2p.dir.config"`
    /// - `tunnel_subdir = "tunnel"`
    /// - `stop_on_signal = true`
    /// - `exit_on_signal = true`
    fn default() -> Self {
        Self {
            readiness_interval: Duration::from_secs(1),
            debounce_window: Duration::from_millis(2000),
            bus_capacity: 1024,
            config_dir_property: "i2p.dir.config".to_string(),
            tunnel_subdir: "tunnel".to_string(),
            stop_on_signal: true,
            exit_on_signal: true,
        }
    }
}
