//! Signals sampled from the engine at classification time.

use std::time::Duration;

use crate::engine::{CommStatus, Engine, RouterInfo};

/// Manually configured hostname for the primary transport.
pub const PROP_PRIMARY_HOSTNAME: &str = "i2np.ntcp.hostname";
/// Manually configured port for the primary transport.
pub const PROP_PRIMARY_PORT: &str = "i2np.ntcp.port";

/// Read-only bundle of engine status signals.
///
/// Built with [`capture`](Self::capture) from a live engine, or directly
/// (all fields are public) when testing the classifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReachabilitySnapshot {
    /// False when the engine runs a non-networked comm system.
    pub comm_system_present: bool,
    /// Engine uptime.
    pub uptime: Duration,
    /// Graceful shutdown in progress.
    pub graceful_shutdown: bool,
    /// Local client manager liveness.
    pub client_manager_alive: bool,
    /// Peer-reported clock skew in milliseconds (signed).
    pub clock_skew_ms: i64,
    /// Hidden mode.
    pub hidden: bool,
    /// Published router info, if any.
    pub router_info: Option<RouterInfo>,
    /// Comm-system status code.
    pub status: CommStatus,
    /// Floodfill participation.
    pub floodfill: bool,
    /// Active peer count.
    pub active_peers: u32,
    /// Both primary-transport hostname and port are configured manually.
    pub primary_host_port_configured: bool,
}

impl ReachabilitySnapshot {
    /// Samples every signal from `engine`.
    pub fn capture(engine: &dyn Engine) -> Self {
        Self {
            comm_system_present: engine.has_comm_system(),
            uptime: engine.uptime(),
            graceful_shutdown: engine.graceful_shutdown_in_progress(),
            client_manager_alive: engine.client_manager_alive(),
            clock_skew_ms: engine.peer_clock_skew_ms(),
            hidden: engine.is_hidden(),
            router_info: engine.router_info(),
            status: engine.comm_status(),
            floodfill: engine.floodfill_enabled(),
            active_peers: engine.active_peer_count(),
            primary_host_port_configured: engine.property(PROP_PRIMARY_HOSTNAME).is_some()
                && engine.property(PROP_PRIMARY_PORT).is_some(),
        }
    }
}

impl Default for ReachabilitySnapshot {
    /// A healthy, freshly started engine that is still testing and has no router info.
    fn default() -> Self {
        Self {
            comm_system_present: true,
            uptime: Duration::ZERO,
            graceful_shutdown: false,
            client_manager_alive: true,
            clock_skew_ms: 0,
            hidden: false,
            router_info: None,
            status: CommStatus::Unknown,
            floodfill: false,
            active_peers: 0,
            primary_host_port_configured: false,
        }
    }
}
