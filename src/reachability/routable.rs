//! Public routability check for published addresses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// True if `ip` can be reached from the public internet.
///
/// Rejects private, loopback, link-local, shared (CGNAT), documentation,
/// benchmarking, multicast and reserved ranges. IPv6 must be global unicast
/// (`2000::/3`); Teredo is rejected, and 6to4 and IPv4-mapped addresses are
/// judged by their embedded IPv4 address.
///
/// # Example
/// ```
/// use routervisor::reachability::is_publicly_routable;
///
/// assert!(is_publicly_routable("93.184.216.34".parse().unwrap()));
/// assert!(!is_publicly_routable("192.168.1.20".parse().unwrap()));
/// ```
pub fn is_publicly_routable(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => v4_routable(v4),
        IpAddr::V6(v6) => v6_routable(v6),
    }
}

fn v4_routable(ip: Ipv4Addr) -> bool {
    let [a, b, c, _] = ip.octets();
    if ip.is_unspecified()
        || ip.is_loopback()
        || ip.is_private()
        || ip.is_link_local()
        || ip.is_broadcast()
        || ip.is_documentation()
    {
        return false;
    }
    match (a, b, c) {
        (0, _, _) => false,
        // shared address space, 100.64.0.0/10
        (100, 64..=127, _) => false,
        // IETF protocol assignments, 192.0.0.0/24
        (192, 0, 0) => false,
        // benchmarking, 198.18.0.0/15
        (198, 18 | 19, _) => false,
        // multicast and reserved
        (224..=255, _, _) => false,
        _ => true,
    }
}

fn v6_routable(ip: Ipv6Addr) -> bool {
    if let Some(v4) = ip.to_ipv4_mapped() {
        return v4_routable(v4);
    }
    let seg = ip.segments();
    // global unicast only
    if seg[0] & 0xe000 != 0x2000 {
        return false;
    }
    match seg[0] {
        // Teredo 2001::/32, documentation 2001:db8::/32
        0x2001 if seg[1] == 0 || seg[1] == 0x0db8 => false,
        // 6to4
        0x2002 => {
            let [hi, lo] = seg[1].to_be_bytes();
            let [hi2, lo2] = seg[2].to_be_bytes();
            v4_routable(Ipv4Addr::new(hi, lo, hi2, lo2))
        }
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn routable(s: &str) -> bool {
        is_publicly_routable(s.parse().unwrap())
    }

    #[test]
    fn public_v4() {
        assert!(routable("8.8.8.8"));
        assert!(routable("93.184.216.34"));
        assert!(routable("172.32.0.1"));
        assert!(routable("100.128.0.1"));
    }

    #[test]
    fn non_routable_v4() {
        for ip in [
            "0.0.0.0",
            "0.1.2.3",
            "10.0.0.1",
            "100.64.0.1",
            "127.0.0.1",
            "169.254.10.10",
            "172.16.5.4",
            "172.31.255.255",
            "192.0.0.8",
            "192.0.2.1",
            "192.168.1.1",
            "198.18.0.1",
            "198.51.100.7",
            "203.0.113.9",
            "224.0.0.1",
            "240.0.0.1",
            "255.255.255.255",
        ] {
            assert!(!routable(ip), "{ip} should not be routable");
        }
    }

    #[test]
    fn v6_ranges() {
        assert!(routable("2a01:4f8::1"));
        assert!(routable("2002:5db8:d822::1"));
        assert!(routable("::ffff:8.8.8.8"));

        for ip in [
            "::",
            "::1",
            "fe80::1",
            "fd00::1",
            "ff02::1",
            "2001:db8::1",
            "2001:0:4136:e378::1",
            "2002:c0a8:0101::1",
            "::ffff:192.168.0.1",
        ] {
            assert!(!routable(ip), "{ip} should not be routable");
        }
    }
}
