//! Comm-system status codes and published router info.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Reachability status reported by the engine's comm system.
///
/// The per-family variants combine the IPv4 and IPv6 test results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommStatus {
    Ok,
    Ipv4OkIpv6Unknown,
    Ipv4OkIpv6Firewalled,
    Ipv4UnknownIpv6Ok,
    Ipv4FirewalledIpv6Ok,
    Ipv4DisabledIpv6Ok,
    Ipv4SnatIpv6Ok,
    /// Peers disagree about our address (symmetric NAT).
    Different,
    Ipv4FirewalledIpv6Unknown,
    /// Inbound connections are rejected.
    RejectUnsolicited,
    Ipv4UnknownIpv6Firewalled,
    Ipv4DisabledIpv6Unknown,
    Ipv4DisabledIpv6Firewalled,
    /// No network connectivity.
    Disconnected,
    /// The secondary transport could not bind its port.
    Hosed,
    /// Still testing.
    Unknown,
    Ipv4SnatIpv6Unknown,
}

impl CommStatus {
    /// Every status code, in declaration order.
    pub const ALL: [CommStatus; 17] = [
        CommStatus::Ok,
        CommStatus::Ipv4OkIpv6Unknown,
        CommStatus::Ipv4OkIpv6Firewalled,
        CommStatus::Ipv4UnknownIpv6Ok,
        CommStatus::Ipv4FirewalledIpv6Ok,
        CommStatus::Ipv4DisabledIpv6Ok,
        CommStatus::Ipv4SnatIpv6Ok,
        CommStatus::Different,
        CommStatus::Ipv4FirewalledIpv6Unknown,
        CommStatus::RejectUnsolicited,
        CommStatus::Ipv4UnknownIpv6Firewalled,
        CommStatus::Ipv4DisabledIpv6Unknown,
        CommStatus::Ipv4DisabledIpv6Firewalled,
        CommStatus::Disconnected,
        CommStatus::Hosed,
        CommStatus::Unknown,
        CommStatus::Ipv4SnatIpv6Unknown,
    ];

    /// Operator-facing status text.
    pub fn status_text(self) -> &'static str {
        match self {
            CommStatus::Ok => "OK",
            CommStatus::Ipv4OkIpv6Unknown => "IPv4: OK; IPv6: Testing",
            CommStatus::Ipv4OkIpv6Firewalled => "IPv4: OK; IPv6: Firewalled",
            CommStatus::Ipv4UnknownIpv6Ok => "IPv4: Testing; IPv6: OK",
            CommStatus::Ipv4FirewalledIpv6Ok => "IPv4: Firewalled; IPv6: OK",
            CommStatus::Ipv4DisabledIpv6Ok => "IPv4: Disabled; IPv6: OK",
            CommStatus::Ipv4SnatIpv6Ok => "IPv4: Symmetric NAT; IPv6: OK",
            CommStatus::Different => "Symmetric NAT",
            CommStatus::Ipv4FirewalledIpv6Unknown => "IPv4: Firewalled; IPv6: Testing",
            CommStatus::RejectUnsolicited => "Firewalled",
            CommStatus::Ipv4UnknownIpv6Firewalled => "IPv4: Testing; IPv6: Firewalled",
            CommStatus::Ipv4DisabledIpv6Unknown => "IPv4: Disabled; IPv6: Testing",
            CommStatus::Ipv4DisabledIpv6Firewalled => "IPv4: Disabled; IPv6: Firewalled",
            CommStatus::Disconnected => "Disconnected",
            CommStatus::Hosed => "Port Conflict",
            CommStatus::Unknown => "Testing",
            CommStatus::Ipv4SnatIpv6Unknown => "IPv4: Symmetric NAT; IPv6: Testing",
        }
    }
}

impl fmt::Display for CommStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status_text())
    }
}

/// Transport under which the engine publishes an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Transport {
    /// Stream transport (TCP based).
    Primary,
    /// Datagram transport (UDP based).
    Secondary,
}

/// Address published for one transport.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishedAddress {
    /// Resolved IP, if the published host resolved.
    pub ip: Option<IpAddr>,
    /// Published port.
    pub port: Option<u16>,
}

impl PublishedAddress {
    /// An address with a resolved IP.
    pub fn resolved(ip: IpAddr, port: u16) -> Self {
        Self {
            ip: Some(ip),
            port: Some(port),
        }
    }

    /// An address whose host did not resolve.
    pub fn unresolved() -> Self {
        Self::default()
    }
}

/// The engine's published router info, reduced to what reachability needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouterInfo {
    addresses: BTreeMap<Transport, PublishedAddress>,
}

impl RouterInfo {
    /// Router info with no published addresses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy publishing `addr` for `transport`.
    pub fn with_address(mut self, transport: Transport, addr: PublishedAddress) -> Self {
        self.addresses.insert(transport, addr);
        self
    }

    /// Published address for `transport`, if any.
    pub fn target_address(&self, transport: Transport) -> Option<&PublishedAddress> {
        self.addresses.get(&transport)
    }
}
