use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

pub const DEFAULT_DNS_PORT: u16 = 53;

const MAX_HOSTNAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Checks `domain` against the hostname rules the router UI enforces:
/// dot-separated labels of ASCII alphanumerics, hyphens and underscores,
/// no label starting or ending with a hyphen, at most one trailing dot.
pub fn validate_hostname(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("Domain cannot be empty".to_string());
    }

    let name = domain.strip_suffix('.').unwrap_or(domain);
    if name.is_empty() {
        return Err("Domain cannot be the root label".to_string());
    }
    if name.len() > MAX_HOSTNAME_LEN {
        return Err(format!(
            "Domain cannot exceed {} characters",
            MAX_HOSTNAME_LEN
        ));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(format!("Domain '{}' contains an empty label", domain));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(format!(
                "Label '{}' exceeds {} characters",
                label, MAX_LABEL_LEN
            ));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(format!(
                "Label '{}' cannot start or end with a hyphen",
                label
            ));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(format!("Label '{}' contains invalid characters", label));
        }
    }

    if name.parse::<IpAddr>().is_ok() {
        return Err(format!("'{}' is an IP address, not a hostname", domain));
    }

    Ok(())
}

/// Upstream resolver a domain is queried against.
///
/// Accepts `1.1.1.1`, `1.1.1.1:5353`, `1.1.1.1#5353`, `2606:4700::1111`
/// and `[2606:4700::1111]:5353`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolverAddress(SocketAddr);

impl ResolverAddress {
    pub fn new(addr: SocketAddr) -> Self {
        Self(addr)
    }

    pub fn socket_addr(&self) -> SocketAddr {
        self.0
    }

    pub fn ip(&self) -> IpAddr {
        self.0.ip()
    }

    pub fn parse_with_default_port(input: &str, default_port: u16) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err("DNS server cannot be empty".to_string());
        }

        if let Ok(ip) = trimmed.parse::<IpAddr>() {
            return Self::checked(SocketAddr::new(ip, default_port));
        }
        if let Ok(addr) = trimmed.parse::<SocketAddr>() {
            return Self::checked(addr);
        }
        if let Some((host, port)) = trimmed.rsplit_once('#') {
            let ip = host
                .parse::<IpAddr>()
                .map_err(|_| format!("'{}' is not an IP address", host))?;
            let port = port
                .parse::<u16>()
                .map_err(|_| format!("'{}' is not a valid port", port))?;
            return Self::checked(SocketAddr::new(ip, port));
        }

        Err(format!("'{}' is not a valid DNS server address", trimmed))
    }

    fn checked(addr: SocketAddr) -> Result<Self, String> {
        if addr.port() == 0 {
            return Err("DNS server port cannot be 0".to_string());
        }
        if addr.ip().is_unspecified() || addr.ip().is_multicast() {
            return Err(format!("{} cannot be used as a DNS server", addr.ip()));
        }
        Ok(Self(addr))
    }
}

impl FromStr for ResolverAddress {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_default_port(s, DEFAULT_DNS_PORT)
    }
}

impl fmt::Display for ResolverAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.port() == DEFAULT_DNS_PORT {
            write!(f, "{}", self.0.ip())
        } else {
            write!(f, "{}", self.0)
        }
    }
}
