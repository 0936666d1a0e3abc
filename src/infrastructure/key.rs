//! Client key extraction.
//!
//! Requests are tracked by a string identity derived from the connection:
//! a trusted forwarded-address header value when present, else the raw
//! transport peer address. The hosting protocol layer decides which header
//! is trustworthy; this module only turns its value into a lookup key.

use std::net::SocketAddr;

/// Derive the client key for a request.
///
/// Prefers the forwarded-address value: the first entry of a
/// comma-separated list, trimmed (proxies append, so the first entry is the
/// originating client). Falls back to the peer address with any port
/// stripped, so one client is not tracked as many across ephemeral ports.
pub fn client_key(forwarded_for: Option<&str>, peer_addr: &str) -> String {
    if let Some(forwarded) = forwarded_for {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    strip_port(peer_addr)
}

/// Drop the port from a socket address, falling back to the raw string for
/// addresses that do not parse.
fn strip_port(peer_addr: &str) -> String {
    match peer_addr.parse::<SocketAddr>() {
        Ok(addr) => addr.ip().to_string(),
        Err(_) => peer_addr.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forwarded_address_preferred() {
        let key = client_key(Some("198.51.100.7"), "10.0.0.1:43210");
        assert_eq!(key, "198.51.100.7");
    }

    #[test]
    fn test_forwarded_list_uses_first_entry() {
        let key = client_key(Some("198.51.100.7, 203.0.113.4, 192.0.2.1"), "10.0.0.1:80");
        assert_eq!(key, "198.51.100.7");
    }

    #[test]
    fn test_forwarded_entry_is_trimmed() {
        let key = client_key(Some("  198.51.100.7  "), "10.0.0.1:80");
        assert_eq!(key, "198.51.100.7");
    }

    #[test]
    fn test_empty_forwarded_falls_back_to_peer() {
        let key = client_key(Some(""), "10.0.0.1:43210");
        assert_eq!(key, "10.0.0.1");
    }

    #[test]
    fn test_peer_port_stripped() {
        assert_eq!(client_key(None, "192.0.2.10:8080"), "192.0.2.10");
    }

    #[test]
    fn test_ipv6_peer_port_stripped() {
        assert_eq!(client_key(None, "[2001:db8::1]:443"), "2001:db8::1");
    }

    #[test]
    fn test_unparseable_peer_used_verbatim() {
        assert_eq!(client_key(None, "unix:/tmp/sock"), "unix:/tmp/sock");
    }

    #[test]
    fn test_same_client_different_ports_share_key() {
        let a = client_key(None, "192.0.2.10:50001");
        let b = client_key(None, "192.0.2.10:50002");
        assert_eq!(a, b);
    }
}
