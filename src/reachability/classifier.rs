//! # Reachability decision procedure.
//!
//! Checks run in a fixed order; the first that matches decides the result:
//!
//! ```text
//! no comm system ─────────────────────────────► NoCommSystem
//! up > 60s, not shutting down, I2CP dead ──────► Error
//! |skew| > 30s ────────────────────────────────► ClockSkew
//! hidden ──────────────────────────────────────► Hidden
//! no router info ──────────────────────────────► Testing
//! otherwise dispatch on CommStatus:
//!   OK variants ──────► primary address: none → Running, unresolved/private → Error, public → Running
//!   SNAT / Different ─► Error
//!   RejectUnsolicited ─(Firewalled)─┐
//!   Ipv4DisabledIpv6Firewalled ─────┴─► primary published → Warn ─┐
//!   Ipv4Firewalled* ────────────────────────────────────────────────┴─► floodfill → Warn, else tentative
//!   Disconnected ─────► Testing
//!   Hosed ────────────► Error
//!   Unknown / rest ───► secondary missing after 5 min → Error/Warn, else tentative
//! ```

use std::time::Duration;

use crate::engine::{CommStatus, RouterInfo, Transport};
use crate::reachability::routable::is_publicly_routable;
use crate::reachability::snapshot::ReachabilitySnapshot;
use crate::reachability::state::{NetworkState, StatusMessage};

/// Uptime after which a dead client manager is reported.
const CLIENT_MANAGER_GRACE: Duration = Duration::from_secs(60);
/// Largest tolerated peer clock skew.
const MAX_CLOCK_SKEW_MS: i64 = 30_000;
/// Uptime after which a missing secondary-transport address is reported.
const SECONDARY_ADDRESS_GRACE: Duration = Duration::from_secs(5 * 60);

/// Classifies a snapshot into exactly one [`StatusMessage`].
///
/// # Example
/// ```
/// use routervisor::{NetworkState, ReachabilitySnapshot};
/// use routervisor::reachability::classify;
///
/// let snap = ReachabilitySnapshot { hidden: true, ..Default::default() };
/// assert_eq!(classify(&snap).state(), NetworkState::Hidden);
/// ```
pub fn classify(snap: &ReachabilitySnapshot) -> StatusMessage {
    if !snap.comm_system_present {
        return StatusMessage::new(NetworkState::NoCommSystem, "VM Comm System");
    }
    if snap.uptime > CLIENT_MANAGER_GRACE && !snap.graceful_shutdown && !snap.client_manager_alive {
        // a local fault, reported through the same channel
        return StatusMessage::new(
            NetworkState::Error,
            "ERR-Client Manager I2CP Error - check logs",
        );
    }
    if snap.clock_skew_ms.unsigned_abs() > MAX_CLOCK_SKEW_MS as u64 {
        return StatusMessage::new(NetworkState::ClockSkew, "ERR-Clock Skew");
    }
    if snap.hidden {
        return StatusMessage::new(NetworkState::Hidden, "Hidden");
    }
    let Some(info) = snap.router_info.as_ref() else {
        return StatusMessage::new(NetworkState::Testing, "Testing");
    };

    let status = snap.status;
    match status {
        CommStatus::Ok
        | CommStatus::Ipv4OkIpv6Unknown
        | CommStatus::Ipv4OkIpv6Firewalled
        | CommStatus::Ipv4UnknownIpv6Ok
        | CommStatus::Ipv4DisabledIpv6Ok
        | CommStatus::Ipv4SnatIpv6Ok => reachable(info, status),

        CommStatus::Ipv4SnatIpv6Unknown | CommStatus::Different => {
            StatusMessage::new(NetworkState::Error, "ERR-SymmetricNAT")
        }

        CommStatus::RejectUnsolicited => {
            firewalled_with_primary(info, snap, status, NetworkState::Firewalled)
        }
        CommStatus::Ipv4DisabledIpv6Firewalled => {
            firewalled_with_primary(info, snap, status, NetworkState::Running)
        }
        CommStatus::Ipv4FirewalledIpv6Ok | CommStatus::Ipv4FirewalledIpv6Unknown => {
            firewalled(snap, status, NetworkState::Running)
        }

        CommStatus::Disconnected => StatusMessage::new(
            NetworkState::Testing,
            "Disconnected - check network connection",
        ),

        CommStatus::Hosed => StatusMessage::new(
            NetworkState::Error,
            "ERR-UDP Port In Use - Set i2np.udp.internalPort=xxxx in advanced config and restart",
        ),

        CommStatus::Unknown => untested(info, snap, status, NetworkState::Testing),
        CommStatus::Ipv4UnknownIpv6Firewalled | CommStatus::Ipv4DisabledIpv6Unknown => {
            untested(info, snap, status, NetworkState::Running)
        }
    }
}

/// OK variants: judged by the published primary-transport address.
fn reachable(info: &RouterInfo, status: CommStatus) -> StatusMessage {
    let Some(addr) = info.target_address(Transport::Primary) else {
        return StatusMessage::new(NetworkState::Running, status.status_text());
    };
    match addr.ip {
        None => StatusMessage::new(NetworkState::Error, "ERR-Unresolved TCP Address"),
        Some(ip) if is_publicly_routable(ip) => {
            StatusMessage::new(NetworkState::Running, status.status_text())
        }
        Some(_) => StatusMessage::new(NetworkState::Error, "ERR-Private TCP Address"),
    }
}

/// Firewalled, but an inbound primary-transport address is still published.
fn firewalled_with_primary(
    info: &RouterInfo,
    snap: &ReachabilitySnapshot,
    status: CommStatus,
    tentative: NetworkState,
) -> StatusMessage {
    if info.target_address(Transport::Primary).is_some() {
        return StatusMessage::new(
            NetworkState::Warn,
            "WARN-Firewalled with Inbound TCP Enabled",
        );
    }
    firewalled(snap, status, tentative)
}

fn firewalled(
    snap: &ReachabilitySnapshot,
    status: CommStatus,
    tentative: NetworkState,
) -> StatusMessage {
    if snap.floodfill {
        return StatusMessage::new(NetworkState::Warn, "WARN-Firewalled and Floodfill");
    }
    StatusMessage::new(tentative, status.status_text())
}

/// Unknown and remaining codes: judged by the secondary-transport address once the engine has settled.
fn untested(
    info: &RouterInfo,
    snap: &ReachabilitySnapshot,
    status: CommStatus,
    tentative: NetworkState,
) -> StatusMessage {
    if info.target_address(Transport::Secondary).is_none() && snap.uptime > SECONDARY_ADDRESS_GRACE
    {
        if snap.active_peers == 0 {
            return StatusMessage::new(
                NetworkState::Error,
                "ERR-No Active Peers, Check Network Connection and Firewall",
            );
        }
        if !snap.primary_host_port_configured {
            return StatusMessage::new(
                NetworkState::Error,
                "ERR-UDP Disabled and Inbound TCP host/port not set",
            );
        }
        return StatusMessage::new(NetworkState::Warn, "WARN-Firewalled with UDP Disabled");
    }
    StatusMessage::new(tentative, status.status_text())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::PublishedAddress;
    use std::net::IpAddr;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    fn published(status: CommStatus, info: RouterInfo) -> ReachabilitySnapshot {
        ReachabilitySnapshot {
            uptime: Duration::from_secs(10),
            router_info: Some(info),
            status,
            active_peers: 12,
            ..Default::default()
        }
    }

    fn primary(addr: PublishedAddress) -> RouterInfo {
        RouterInfo::new().with_address(Transport::Primary, addr)
    }

    #[test]
    fn no_comm_system_wins_over_everything() {
        let snap = ReachabilitySnapshot {
            comm_system_present: false,
            hidden: true,
            clock_skew_ms: 40_000,
            client_manager_alive: false,
            uptime: Duration::from_secs(3600),
            ..Default::default()
        };
        assert_eq!(classify(&snap).state(), NetworkState::NoCommSystem);
    }

    #[test]
    fn client_manager_failure_needs_uptime_and_no_shutdown() {
        let mut snap = ReachabilitySnapshot {
            client_manager_alive: false,
            uptime: Duration::from_secs(61),
            hidden: true,
            ..Default::default()
        };
        let msg = classify(&snap);
        assert_eq!(msg.state(), NetworkState::Error);
        assert!(msg.text().contains("Client Manager"));

        snap.graceful_shutdown = true;
        assert_eq!(classify(&snap).state(), NetworkState::Hidden);

        snap.graceful_shutdown = false;
        snap.uptime = Duration::from_secs(60);
        assert_eq!(classify(&snap).state(), NetworkState::Hidden);
    }

    #[test]
    fn clock_skew_either_direction() {
        for skew in [30_001, -30_001, 40_000] {
            let snap = ReachabilitySnapshot {
                clock_skew_ms: skew,
                hidden: true,
                ..Default::default()
            };
            assert_eq!(classify(&snap).state(), NetworkState::ClockSkew);
        }
        let snap = ReachabilitySnapshot {
            clock_skew_ms: -30_000,
            ..Default::default()
        };
        assert_eq!(classify(&snap).state(), NetworkState::Testing);
    }

    #[test]
    fn hidden_before_router_info() {
        let snap = ReachabilitySnapshot {
            hidden: true,
            ..Default::default()
        };
        assert_eq!(classify(&snap), StatusMessage::new(NetworkState::Hidden, "Hidden"));
    }

    #[test]
    fn no_router_info_is_testing() {
        let msg = classify(&ReachabilitySnapshot::default());
        assert_eq!(msg, StatusMessage::new(NetworkState::Testing, "Testing"));
    }

    #[test]
    fn ok_with_public_primary_is_running() {
        let snap = published(
            CommStatus::Ok,
            primary(PublishedAddress::resolved(ip("93.184.216.34"), 12345)),
        );
        assert_eq!(classify(&snap), StatusMessage::new(NetworkState::Running, "OK"));
    }

    #[test]
    fn ok_with_private_primary_is_error() {
        let snap = published(
            CommStatus::Ipv4OkIpv6Firewalled,
            primary(PublishedAddress::resolved(ip("192.168.0.10"), 12345)),
        );
        let msg = classify(&snap);
        assert_eq!(msg.state(), NetworkState::Error);
        assert_eq!(msg.text(), "ERR-Private TCP Address");
    }

    #[test]
    fn ok_with_unresolved_primary_is_error() {
        let snap = published(CommStatus::Ok, primary(PublishedAddress::unresolved()));
        assert_eq!(classify(&snap).text(), "ERR-Unresolved TCP Address");
    }

    #[test]
    fn ok_without_primary_is_running_with_status_text() {
        let snap = published(CommStatus::Ipv4UnknownIpv6Ok, RouterInfo::new());
        assert_eq!(
            classify(&snap),
            StatusMessage::new(NetworkState::Running, "IPv4: Testing; IPv6: OK")
        );
    }

    #[test]
    fn symmetric_nat_is_error() {
        for status in [CommStatus::Different, CommStatus::Ipv4SnatIpv6Unknown] {
            let msg = classify(&published(status, RouterInfo::new()));
            assert_eq!(msg.state(), NetworkState::Error);
            assert_eq!(msg.text(), "ERR-SymmetricNAT");
        }
    }

    #[test]
    fn reject_unsolicited_paths() {
        let with_primary = published(
            CommStatus::RejectUnsolicited,
            primary(PublishedAddress::resolved(ip("8.8.8.8"), 1)),
        );
        assert_eq!(classify(&with_primary).state(), NetworkState::Warn);
        assert!(classify(&with_primary).text().contains("Inbound TCP"));

        let mut bare = published(CommStatus::RejectUnsolicited, RouterInfo::new());
        assert_eq!(
            classify(&bare),
            StatusMessage::new(NetworkState::Firewalled, "Firewalled")
        );

        bare.floodfill = true;
        assert_eq!(classify(&bare).text(), "WARN-Firewalled and Floodfill");
    }

    #[test]
    fn disabled_v4_firewalled_v6_carries_running() {
        let snap = published(CommStatus::Ipv4DisabledIpv6Firewalled, RouterInfo::new());
        assert_eq!(classify(&snap).state(), NetworkState::Running);

        let snap = published(
            CommStatus::Ipv4DisabledIpv6Firewalled,
            primary(PublishedAddress::unresolved()),
        );
        assert_eq!(classify(&snap).state(), NetworkState::Warn);
    }

    #[test]
    fn firewalled_via_secondary_ignores_primary() {
        let mut snap = published(
            CommStatus::Ipv4FirewalledIpv6Ok,
            primary(PublishedAddress::resolved(ip("8.8.8.8"), 1)),
        );
        assert_eq!(
            classify(&snap),
            StatusMessage::new(NetworkState::Running, "IPv4: Firewalled; IPv6: OK")
        );
        snap.floodfill = true;
        assert_eq!(classify(&snap).state(), NetworkState::Warn);
    }

    #[test]
    fn disconnected_and_hosed() {
        let msg = classify(&published(CommStatus::Disconnected, RouterInfo::new()));
        assert_eq!(msg.state(), NetworkState::Testing);
        assert!(msg.text().contains("check network connection"));

        let msg = classify(&published(CommStatus::Hosed, RouterInfo::new()));
        assert_eq!(msg.state(), NetworkState::Error);
        assert!(msg.text().contains("restart"));
    }

    #[test]
    fn unknown_settles_after_five_minutes() {
        let mut snap = published(CommStatus::Unknown, RouterInfo::new());
        assert_eq!(
            classify(&snap),
            StatusMessage::new(NetworkState::Testing, "Testing")
        );

        snap.uptime = Duration::from_secs(301);
        snap.active_peers = 0;
        assert!(classify(&snap).text().starts_with("ERR-No Active Peers"));

        snap.active_peers = 3;
        assert!(classify(&snap).text().starts_with("ERR-UDP Disabled"));

        snap.primary_host_port_configured = true;
        assert_eq!(
            classify(&snap),
            StatusMessage::new(NetworkState::Warn, "WARN-Firewalled with UDP Disabled")
        );
    }

    #[test]
    fn secondary_address_keeps_tentative_state() {
        let info = RouterInfo::new()
            .with_address(Transport::Secondary, PublishedAddress::resolved(ip("8.8.4.4"), 2));
        let mut snap = published(CommStatus::Ipv4DisabledIpv6Unknown, info);
        snap.uptime = Duration::from_secs(3600);
        assert_eq!(
            classify(&snap),
            StatusMessage::new(NetworkState::Running, "IPv4: Disabled; IPv6: Testing")
        );
    }

    #[test]
    fn every_status_yields_a_message() {
        let infos = [
            RouterInfo::new(),
            primary(PublishedAddress::unresolved()),
            primary(PublishedAddress::resolved(ip("10.0.0.1"), 1)),
            primary(PublishedAddress::resolved(ip("8.8.8.8"), 1)),
        ];
        for status in CommStatus::ALL {
            for info in &infos {
                for uptime in [0, 120, 600] {
                    for floodfill in [false, true] {
                        for active_peers in [0, 5] {
                            let snap = ReachabilitySnapshot {
                                uptime: Duration::from_secs(uptime),
                                router_info: Some(info.clone()),
                                status,
                                floodfill,
                                active_peers,
                                ..Default::default()
                            };
                            assert!(!classify(&snap).text().is_empty());
                        }
                    }
                }
            }
        }
    }
}
