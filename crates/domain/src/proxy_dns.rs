use crate::allow_list::local_dns_target;
use crate::hostname::ResolverAddress;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const DEFAULT_REMOTE_DNS_DOH: &str = "https://1.1.1.1/dns-query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DnsShunt {
    Dnsmasq,
    ChinadnsNg,
    Smartdns,
}

impl DnsShunt {
    pub const ALL: [DnsShunt; 3] = [DnsShunt::Dnsmasq, DnsShunt::ChinadnsNg, DnsShunt::Smartdns];

    pub fn to_str(&self) -> &'static str {
        match self {
            DnsShunt::Dnsmasq => "dnsmasq",
            DnsShunt::ChinadnsNg => "chinadns-ng",
            DnsShunt::Smartdns => "smartdns",
        }
    }
}

impl FromStr for DnsShunt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.to_str() == s.trim())
            .ok_or_else(|| {
                format!(
                    "Unknown DNS shunt '{}' (expected dnsmasq, chinadns-ng or smartdns)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DnsMode {
    Tcp,
    Udp,
    Dns2socks,
}

impl DnsMode {
    pub const ALL: [DnsMode; 3] = [DnsMode::Tcp, DnsMode::Udp, DnsMode::Dns2socks];

    pub fn to_str(&self) -> &'static str {
        match self {
            DnsMode::Tcp => "tcp",
            DnsMode::Udp => "udp",
            DnsMode::Dns2socks => "dns2socks",
        }
    }
}

impl FromStr for DnsMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|v| v.to_str() == s.trim())
            .ok_or_else(|| format!("Unknown filter mode '{}' (expected tcp, udp or dns2socks)", s))
    }
}

/// Global DNS section of the proxy subsystem.
///
/// `remote_dns` is `None` until someone writes it explicitly; readers fall
/// back to the filter service's local listener via [`effective_remote_dns`].
///
/// [`effective_remote_dns`]: ProxyDnsGlobal::effective_remote_dns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyDnsGlobal {
    pub dns_shunt: String,
    pub dns_mode: String,
    pub remote_dns: Option<String>,
    pub remote_dns_doh: String,
    pub remote_fakedns: bool,
    pub dns_redirect: bool,
}

impl ProxyDnsGlobal {
    /// The tuple a factory reset leaves behind.
    pub fn factory_defaults(listen_port: u16) -> Self {
        Self {
            dns_shunt: DnsShunt::Dnsmasq.to_str().to_string(),
            dns_mode: DnsMode::Tcp.to_str().to_string(),
            remote_dns: Some(local_dns_target(listen_port)),
            remote_dns_doh: DEFAULT_REMOTE_DNS_DOH.to_string(),
            remote_fakedns: false,
            dns_redirect: true,
        }
    }

    pub fn effective_remote_dns(&self, listen_port: u16) -> String {
        self.remote_dns
            .clone()
            .unwrap_or_else(|| local_dns_target(listen_port))
    }
}

pub fn validate_dns_shunt(value: &str) -> Result<(), String> {
    value.parse::<DnsShunt>().map(|_| ())
}

pub fn validate_dns_mode(value: &str) -> Result<(), String> {
    value.parse::<DnsMode>().map(|_| ())
}

/// Remote DNS is an IP with an optional `#port` suffix.
pub fn validate_remote_dns(value: &str) -> Result<(), String> {
    ResolverAddress::parse_with_default_port(value, crate::hostname::DEFAULT_DNS_PORT)
        .map(|_| ())
        .map_err(|e| format!("Invalid remote DNS '{}': {}", value, e))
}

/// DoH endpoint, optionally followed by `,bootstrap-ip`. Empty clears it.
pub fn validate_doh_url(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    let (url, bootstrap) = match value.split_once(',') {
        Some((url, ip)) => (url, Some(ip)),
        None => (value, None),
    };
    let rest = url
        .strip_prefix("https://")
        .ok_or_else(|| format!("DoH address must start with https://: '{}'", value))?;
    let host = rest.split('/').next().unwrap_or_default();
    if host.is_empty() {
        return Err(format!("DoH address has no host: '{}'", value));
    }
    if let Some(ip) = bootstrap {
        ip.trim()
            .parse::<std::net::IpAddr>()
            .map_err(|_| format!("Invalid DoH bootstrap address '{}'", ip))?;
    }
    Ok(())
}
