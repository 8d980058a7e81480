use crate::cron_schedule::CronSchedule;
use crate::hostname::ResolverAddress;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DNS_SERVER: &str = "119.29.29.29";

/// Public resolvers offered as upstream choices.
pub const KNOWN_RESOLVERS: &[(&str, &str)] = &[
    ("119.29.29.29", "Tencent Public DNS"),
    ("119.28.28.28", "Tencent Public DNS"),
    ("223.5.5.5", "Aliyun Public DNS"),
    ("223.6.6.6", "Aliyun Public DNS"),
    ("180.184.1.1", "TrafficRoute Public DNS"),
    ("180.184.2.2", "TrafficRoute Public DNS"),
    ("114.114.114.114", "Xinfeng Public DNS"),
    ("114.114.115.115", "Xinfeng Public DNS"),
    ("180.76.76.76", "Baidu Public DNS"),
    ("8.8.8.8", "Google Public DNS"),
    ("1.1.1.1", "CloudFlare Public DNS"),
];

pub fn known_resolver_label(server: &str) -> Option<&'static str> {
    KNOWN_RESOLVERS
        .iter()
        .find(|(addr, _)| *addr == server)
        .map(|(_, label)| *label)
}

/// Per-router preferences, persisted in the `pref_dns.config` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceConfig {
    pub domains: Vec<String>,
    pub dns_server: String,
    pub mosdns_enabled: bool,
    pub passwall_enabled: bool,
    pub cron_enabled: bool,
    pub cron_expression: CronSchedule,
}

impl Default for PreferenceConfig {
    fn default() -> Self {
        Self {
            domains: Vec::new(),
            dns_server: DEFAULT_DNS_SERVER.to_string(),
            mosdns_enabled: true,
            passwall_enabled: true,
            cron_enabled: false,
            cron_expression: CronSchedule::default(),
        }
    }
}

impl PreferenceConfig {
    /// Adds `domain` unless it is already present, keeping insertion order.
    pub fn add_domain(&mut self, domain: &str) -> bool {
        let normalized = normalize_domain(domain);
        if self.domains.iter().any(|d| normalize_domain(d) == normalized) {
            return false;
        }
        self.domains.push(normalized);
        true
    }

    pub fn resolver(&self, default_port: u16) -> Result<ResolverAddress, String> {
        ResolverAddress::parse_with_default_port(&self.dns_server, default_port)
    }
}

pub fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

/// Parses the store's boolean encoding (`1`/`0`, plus the usual spellings).
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "enabled" => Some(true),
        "0" | "false" | "no" | "off" | "disabled" => Some(false),
        _ => None,
    }
}

pub fn flag_value(enabled: bool) -> &'static str {
    if enabled {
        "1"
    } else {
        "0"
    }
}
