//! Host address discovery
//!
//! Collects the external IPv4 addresses of each network interface once at
//! startup so indicator displays can show where the service is reachable.

use std::collections::BTreeMap;
use std::net::Ipv4Addr;
use tracing::{debug, warn};

/// Interface name → IPv4 addresses, in discovery order.
pub type HostAddresses = BTreeMap<String, Vec<Ipv4Addr>>;

/// Discover non-loopback IPv4 addresses. Never fails: errors yield an empty map.
pub fn discover_host_addresses() -> HostAddresses {
    match interface_addresses() {
        Ok(entries) => {
            let addresses = group_external_ipv4(entries);
            if addresses.is_empty() {
                warn!("No external IPv4 address found on any interface");
            }
            for (name, ips) in &addresses {
                debug!("Interface {}: {:?}", name, ips);
            }
            addresses
        }
        Err(e) => {
            warn!("Address discovery failed: {}", e);
            HostAddresses::new()
        }
    }
}

/// Group `(interface, address, is_loopback)` entries, dropping loopback ones.
pub(crate) fn group_external_ipv4<I>(entries: I) -> HostAddresses
where
    I: IntoIterator<Item = (String, Ipv4Addr, bool)>,
{
    let mut grouped = HostAddresses::new();
    for (name, ip, loopback) in entries {
        if loopback || ip.is_loopback() {
            continue;
        }
        let ips = grouped.entry(name).or_default();
        if !ips.contains(&ip) {
            ips.push(ip);
        }
    }
    grouped
}

#[cfg(unix)]
fn interface_addresses() -> nix::Result<Vec<(String, Ipv4Addr, bool)>> {
    use nix::ifaddrs::getifaddrs;
    use nix::net::if_::InterfaceFlags;
    use std::net::SocketAddrV4;

    let entries = getifaddrs()?
        .filter_map(|ifa| {
            let sin = *ifa.address.as_ref()?.as_sockaddr_in()?;
            let loopback = ifa.flags.contains(InterfaceFlags::IFF_LOOPBACK);
            Some((ifa.interface_name, *SocketAddrV4::from(sin).ip(), loopback))
        })
        .collect();
    Ok(entries)
}

#[cfg(not(unix))]
fn interface_addresses() -> std::io::Result<Vec<(String, Ipv4Addr, bool)>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interface enumeration is only implemented on unix",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, ip: [u8; 4], loopback: bool) -> (String, Ipv4Addr, bool) {
        (name.to_string(), Ipv4Addr::from(ip), loopback)
    }

    #[test]
    fn test_group_skips_loopback() {
        let grouped = group_external_ipv4(vec![
            entry("lo", [127, 0, 0, 1], true),
            entry("eth0", [192, 168, 1, 20], false),
        ]);
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped["eth0"], vec![Ipv4Addr::new(192, 168, 1, 20)]);
    }

    #[test]
    fn test_group_skips_loopback_address_without_flag() {
        let grouped = group_external_ipv4(vec![entry("weird0", [127, 0, 1, 1], false)]);
        assert!(grouped.is_empty());
    }

    #[test]
    fn test_group_multiple_addresses_per_interface() {
        let grouped = group_external_ipv4(vec![
            entry("eth0", [10, 0, 0, 5], false),
            entry("wlan0", [192, 168, 1, 30], false),
            entry("eth0", [10, 0, 1, 5], false),
            entry("eth0", [10, 0, 0, 5], false),
        ]);
        assert_eq!(
            grouped["eth0"],
            vec![Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 1, 5)]
        );
        assert_eq!(grouped["wlan0"], vec![Ipv4Addr::new(192, 168, 1, 30)]);
    }

    #[test]
    fn test_group_empty() {
        assert!(group_external_ipv4(Vec::new()).is_empty());
    }

    #[test]
    fn test_discover_never_panics() {
        let addresses = discover_host_addresses();
        for ips in addresses.values() {
            assert!(ips.iter().all(|ip| !ip.is_loopback()));
        }
    }
}
