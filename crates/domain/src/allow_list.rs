use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::IpAddr;

pub const DEFAULT_LISTEN_PORT: u16 = 5335;

/// Filter-service side of the preference: the addresses it routes
/// preferentially and whether that feature is switched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListState {
    pub cloudflare_ip: Vec<IpAddr>,
    pub cloudflare_enabled: bool,
    pub listen_port: u16,
}

impl Default for AllowListState {
    fn default() -> Self {
        Self {
            cloudflare_ip: Vec::new(),
            cloudflare_enabled: false,
            listen_port: DEFAULT_LISTEN_PORT,
        }
    }
}

impl AllowListState {
    pub fn local_dns_target(&self) -> String {
        local_dns_target(self.listen_port)
    }
}

/// `127.0.0.1#<port>`, the proxy subsystem's notation for the local filter.
pub fn local_dns_target(port: u16) -> String {
    format!("127.0.0.1#{}", port)
}

/// Removes repeated addresses, keeping the first occurrence of each.
pub fn dedup_preserving_order(ips: &[IpAddr]) -> Vec<IpAddr> {
    let mut seen = HashSet::with_capacity(ips.len());
    ips.iter().copied().filter(|ip| seen.insert(*ip)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn test_dedup_preserves_first_seen_order() {
        let input = vec![
            ip("104.16.2.1"),
            ip("104.16.1.1"),
            ip("104.16.2.1"),
            ip("2606:4700::1"),
        ];
        assert_eq!(
            dedup_preserving_order(&input),
            vec![ip("104.16.2.1"), ip("104.16.1.1"), ip("2606:4700::1")]
        );
    }

    #[test]
    fn test_local_dns_target_uses_listen_port() {
        let state = AllowListState::default();
        assert_eq!(state.local_dns_target(), "127.0.0.1#5335");
        assert_eq!(local_dns_target(53), "127.0.0.1#53");
    }
}
