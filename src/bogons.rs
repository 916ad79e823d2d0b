//! Bogon filtering for IP addresses and AS numbers
//!
//! The bgpstuff.net collector only knows about the public routing table, so
//! lookups for private, reserved or documentation resources are rejected
//! locally before they cost a rate-limit slot.

use ipnet::{Ipv4Net, Ipv6Net};
use once_cell::sync::Lazy;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

/// IPv4 ranges that never appear in the global routing table
static IPV4_BOGONS: Lazy<Vec<Ipv4Net>> = Lazy::new(|| {
    [
        "0.0.0.0/8",
        "10.0.0.0/8",
        "100.64.0.0/10",
        "127.0.0.0/8",
        "169.254.0.0/16",
        "172.16.0.0/12",
        "192.0.0.0/24",
        "192.0.2.0/24",
        "192.168.0.0/16",
        "198.18.0.0/15",
        "198.51.100.0/24",
        "203.0.113.0/24",
        "224.0.0.0/4",
        "240.0.0.0/4",
    ]
    .iter()
    .filter_map(|prefix| prefix.parse().ok())
    .collect()
});

/// Global unicast space for IPv6
static IPV6_GLOBAL_UNICAST: Lazy<Option<Ipv6Net>> = Lazy::new(|| "2000::/3".parse().ok());

/// Special-purpose blocks carved out of 2000::/3
static IPV6_BOGONS: Lazy<Vec<Ipv6Net>> = Lazy::new(|| {
    [
        "2001::/32",
        "2001:2::/48",
        "2001:10::/28",
        "2001:db8::/32",
        "2002::/16",
        "3ffe::/16",
        "3fff::/20",
    ]
    .iter()
    .filter_map(|prefix| prefix.parse().ok())
    .collect()
});

/// AS_TRANS, used by 2-byte speakers to stand in for a 4-byte ASN
pub const AS_TRANS: u32 = 23456;

/// Checks whether an IPv4 address is publicly routable
pub fn is_public_ipv4(ip: &Ipv4Addr) -> bool {
    !IPV4_BOGONS.iter().any(|net| net.contains(ip))
}

/// Checks whether an IPv6 address is publicly routable
pub fn is_public_ipv6(ip: &Ipv6Addr) -> bool {
    let in_global = IPV6_GLOBAL_UNICAST
        .as_ref()
        .is_some_and(|net| net.contains(ip));
    in_global && !IPV6_BOGONS.iter().any(|net| net.contains(ip))
}

/// Checks whether an IP address is publicly routable
pub fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => is_public_ipv4(v4),
        IpAddr::V6(v6) => is_public_ipv6(v6),
    }
}

/// Checks whether an AS number may appear in the public routing table
///
/// Rejects AS0, AS_TRANS, the documentation, private and reserved ranges of
/// both the 2-byte and 4-byte spaces.
pub fn is_public_asn(asn: u32) -> bool {
    !matches!(
        asn,
        0 | AS_TRANS | 64496..=131_071 | 4_200_000_000..=u32::MAX
    )
}
