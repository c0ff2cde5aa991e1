//! Host network identity shown on the status line

use std::net::{IpAddr, ToSocketAddrs};

/// Placeholder when a lookup fails
pub const UNKNOWN: &str = "unknown";

/// Host name and the address it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip_address: String,
}

impl HostIdentity {
    pub fn new(hostname: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            ip_address: ip_address.into(),
        }
    }

    /// Looks up this machine's host name and resolves it.
    ///
    /// Resolution goes through the system resolver and may block. Either part
    /// falls back to `unknown`.
    pub fn resolve() -> Self {
        let hostname = gethostname::gethostname()
            .into_string()
            .unwrap_or_else(|_| UNKNOWN.to_string());
        let ip_address = resolve_ip(&hostname)
            .map(|ip| ip.to_string())
            .unwrap_or_else(|| UNKNOWN.to_string());

        tracing::debug!(%hostname, %ip_address, "Resolved host identity");
        Self {
            hostname,
            ip_address,
        }
    }
}

/// First IPv4 address for `hostname`, or the first address of any family
fn resolve_ip(hostname: &str) -> Option<IpAddr> {
    if hostname.is_empty() || hostname == UNKNOWN {
        return None;
    }
    let addrs: Vec<IpAddr> = (hostname, 0)
        .to_socket_addrs()
        .ok()?
        .map(|addr| addr.ip())
        .collect();
    addrs
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
}
