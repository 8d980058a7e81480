//! Fixed package/section/option names shared by every component that
//! touches the configuration store.

pub mod pref {
    pub const PACKAGE: &str = "pref_dns";
    pub const SECTION: &str = "config";
    pub const SECTION_TYPE: &str = "pref_dns";

    pub const DOMAIN: &str = "domain";
    pub const DNS_SERVER: &str = "dns_server";
    pub const MOSDNS_ENABLED: &str = "mosdns_enabled";
    pub const PASSWALL_ENABLED: &str = "passwall_enabled";
    pub const CRON_ENABLED: &str = "cron_enabled";
    pub const CRON_EXPRESSION: &str = "cron_expression";
}

pub mod filter {
    pub const PACKAGE: &str = "mosdns";
    pub const SECTION: &str = "config";

    pub const CLOUDFLARE_IP: &str = "cloudflare_ip";
    pub const CLOUDFLARE: &str = "cloudflare";
    pub const LISTEN_PORT: &str = "listen_port";
}

pub mod proxy {
    pub const PACKAGE: &str = "passwall";
    pub const SECTION: &str = "@global[0]";

    pub const DNS_SHUNT: &str = "dns_shunt";
    pub const DNS_MODE: &str = "dns_mode";
    pub const REMOTE_DNS: &str = "remote_dns";
    pub const REMOTE_DNS_DOH: &str = "remote_dns_doh";
    pub const REMOTE_FAKEDNS: &str = "remote_fakedns";
    pub const DNS_REDIRECT: &str = "dns_redirect";
}

/// Tag that marks scheduler jobs owned by this tool.
pub const CRON_TAG: &str = "pref_dns";
