use crate::ports::{ConfigChange, ConfigStore, ConfigValue};
use crate::schema::{filter, pref, proxy};
use pref_dns_domain::allow_list::DEFAULT_LISTEN_PORT;
use pref_dns_domain::cron_schedule::DEFAULT_CRON_EXPRESSION;
use pref_dns_domain::preference::{flag_value, normalize_domain, parse_flag, DEFAULT_DNS_SERVER};
use pref_dns_domain::proxy_dns::{
    validate_dns_mode, validate_dns_shunt, validate_doh_url, validate_remote_dns,
};
use pref_dns_domain::{
    local_dns_target, validate_hostname, CronPreset, CronSchedule, DomainError, ResolverAddress,
};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, instrument};

const CUSTOM_PRESET: &str = "custom";

/// Every option a binding may read, loaded once per `get`/`show`.
const SNAPSHOT_KEYS: &[(&str, &str, &str)] = &[
    (pref::PACKAGE, pref::SECTION, pref::DOMAIN),
    (pref::PACKAGE, pref::SECTION, pref::DNS_SERVER),
    (pref::PACKAGE, pref::SECTION, pref::MOSDNS_ENABLED),
    (pref::PACKAGE, pref::SECTION, pref::PASSWALL_ENABLED),
    (pref::PACKAGE, pref::SECTION, pref::CRON_ENABLED),
    (pref::PACKAGE, pref::SECTION, pref::CRON_EXPRESSION),
    (filter::PACKAGE, filter::SECTION, filter::LISTEN_PORT),
    (proxy::PACKAGE, proxy::SECTION, proxy::DNS_SHUNT),
    (proxy::PACKAGE, proxy::SECTION, proxy::DNS_MODE),
    (proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_DNS),
    (proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_DNS_DOH),
    (proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_FAKEDNS),
    (proxy::PACKAGE, proxy::SECTION, proxy::DNS_REDIRECT),
];

/// Stored values a binding's `read` works from.
#[derive(Debug, Default, Clone)]
pub struct FieldSnapshot {
    values: HashMap<(String, String, String), ConfigValue>,
}

impl FieldSnapshot {
    pub fn insert(&mut self, package: &str, section: &str, option: &str, value: ConfigValue) {
        self.values.insert(
            (package.to_string(), section.to_string(), option.to_string()),
            value,
        );
    }

    pub fn get(&self, package: &str, section: &str, option: &str) -> Option<&ConfigValue> {
        self.values
            .get(&(package.to_string(), section.to_string(), option.to_string()))
    }

    /// A non-empty single value.
    pub fn single(&self, package: &str, section: &str, option: &str) -> Option<&str> {
        self.get(package, section, option)
            .and_then(ConfigValue::as_single)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    fn listen_port(&self) -> u16 {
        self.single(filter::PACKAGE, filter::SECTION, filter::LISTEN_PORT)
            .and_then(|p| p.parse::<u16>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(DEFAULT_LISTEN_PORT)
    }

    fn flag(&self, package: &str, section: &str, option: &str, default: bool) -> String {
        let enabled = self
            .single(package, section, option)
            .and_then(parse_flag)
            .unwrap_or(default);
        flag_value(enabled).to_string()
    }
}

/// One editable field: how it is read, written and validated.
#[derive(Clone, Copy)]
pub struct FieldBinding {
    pub name: &'static str,
    pub description: &'static str,
    /// Package the field is written into.
    pub package: &'static str,
    pub read: fn(&FieldSnapshot) -> String,
    pub write: fn(&str) -> Vec<ConfigChange>,
    pub validate: fn(&str) -> Result<(), String>,
}

fn validate_flag(value: &str) -> Result<(), String> {
    parse_flag(value)
        .map(|_| ())
        .ok_or_else(|| format!("'{}' is not a flag (use 1 or 0)", value))
}

fn split_domains(value: &str) -> Vec<String> {
    value
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|d| !d.is_empty())
        .map(normalize_domain)
        .collect()
}

fn validate_domains(value: &str) -> Result<(), String> {
    let domains = split_domains(value);
    if domains.is_empty() {
        return Err("At least one domain is required".to_string());
    }
    domains.iter().try_for_each(|d| validate_hostname(d))
}

fn validate_cron_preset(value: &str) -> Result<(), String> {
    if value.trim() == CUSTOM_PRESET || value.parse::<CronPreset>().is_ok() {
        return Ok(());
    }
    let names: Vec<&str> = CronPreset::ALL.iter().map(|p| p.to_str()).collect();
    Err(format!(
        "Unknown schedule '{}' (expected {} or custom)",
        value,
        names.join(", ")
    ))
}

fn pref_set(option: &str, value: impl Into<String>) -> Vec<ConfigChange> {
    vec![
        ConfigChange::ensure_section(pref::SECTION, pref::SECTION_TYPE),
        ConfigChange::set(pref::SECTION, option, value),
    ]
}

fn pref_flag(option: &str, value: &str) -> Vec<ConfigChange> {
    pref_set(option, flag_value(parse_flag(value).unwrap_or(false)))
}

fn proxy_set(option: &str, value: &str) -> Vec<ConfigChange> {
    vec![ConfigChange::set(proxy::SECTION, option, value.trim())]
}

fn proxy_flag(option: &str, value: &str) -> Vec<ConfigChange> {
    proxy_set(option, flag_value(parse_flag(value).unwrap_or(false)))
}

fn default_bindings() -> Vec<FieldBinding> {
    vec![
        FieldBinding {
            name: "domain",
            description: "Domains resolved into the allow-list",
            package: pref::PACKAGE,
            read: |s| {
                s.get(pref::PACKAGE, pref::SECTION, pref::DOMAIN)
                    .cloned()
                    .map(ConfigValue::into_list)
                    .unwrap_or_default()
                    .join(", ")
            },
            write: |v| {
                let mut domains: Vec<String> = Vec::new();
                for d in split_domains(v) {
                    if !domains.contains(&d) {
                        domains.push(d);
                    }
                }
                vec![
                    ConfigChange::ensure_section(pref::SECTION, pref::SECTION_TYPE),
                    ConfigChange::set_list(pref::SECTION, pref::DOMAIN, domains),
                ]
            },
            validate: validate_domains,
        },
        FieldBinding {
            name: "dns_server",
            description: "Upstream resolver queried for the domains",
            package: pref::PACKAGE,
            read: |s| {
                s.single(pref::PACKAGE, pref::SECTION, pref::DNS_SERVER)
                    .unwrap_or(DEFAULT_DNS_SERVER)
                    .to_string()
            },
            write: |v| pref_set(pref::DNS_SERVER, v.trim()),
            validate: |v| v.parse::<ResolverAddress>().map(|_| ()),
        },
        FieldBinding {
            name: "mosdns_enabled",
            description: "Enable the filter-service feature",
            package: pref::PACKAGE,
            read: |s| s.flag(pref::PACKAGE, pref::SECTION, pref::MOSDNS_ENABLED, true),
            write: |v| pref_flag(pref::MOSDNS_ENABLED, v),
            validate: validate_flag,
        },
        FieldBinding {
            name: "passwall_enabled",
            description: "Enable the proxy-DNS feature",
            package: pref::PACKAGE,
            read: |s| s.flag(pref::PACKAGE, pref::SECTION, pref::PASSWALL_ENABLED, true),
            write: |v| pref_flag(pref::PASSWALL_ENABLED, v),
            validate: validate_flag,
        },
        FieldBinding {
            name: "cron_enabled",
            description: "Re-resolve the domains on a schedule",
            package: pref::PACKAGE,
            read: |s| s.flag(pref::PACKAGE, pref::SECTION, pref::CRON_ENABLED, false),
            write: |v| pref_flag(pref::CRON_ENABLED, v),
            validate: validate_flag,
        },
        FieldBinding {
            name: "cron_preset",
            description: "Preset schedule, or custom to keep cron_expression",
            package: pref::PACKAGE,
            read: |s| match s.single(pref::PACKAGE, pref::SECTION, pref::CRON_EXPRESSION) {
                None => CronPreset::Every6Hours.to_str().to_string(),
                Some(expr) => CronSchedule::parse(expr)
                    .ok()
                    .and_then(|schedule| schedule.preset())
                    .map(|p| p.to_str().to_string())
                    .unwrap_or_else(|| CUSTOM_PRESET.to_string()),
            },
            write: |v| match v.parse::<CronPreset>() {
                Ok(preset) => pref_set(pref::CRON_EXPRESSION, preset.expression()),
                Err(_) => Vec::new(),
            },
            validate: validate_cron_preset,
        },
        FieldBinding {
            name: "cron_expression",
            description: "5-field cron format: min hour day month weekday",
            package: pref::PACKAGE,
            read: |s| {
                s.single(pref::PACKAGE, pref::SECTION, pref::CRON_EXPRESSION)
                    .unwrap_or(DEFAULT_CRON_EXPRESSION)
                    .to_string()
            },
            write: |v| match CronSchedule::parse(v) {
                Ok(schedule) => pref_set(pref::CRON_EXPRESSION, schedule.as_str()),
                Err(_) => Vec::new(),
            },
            validate: |v| CronSchedule::parse(v).map(|_| ()),
        },
        FieldBinding {
            name: "dns_shunt",
            description: "Proxy DNS shunt",
            package: proxy::PACKAGE,
            read: |s| {
                s.single(proxy::PACKAGE, proxy::SECTION, proxy::DNS_SHUNT)
                    .unwrap_or("dnsmasq")
                    .to_string()
            },
            write: |v| proxy_set(proxy::DNS_SHUNT, v),
            validate: validate_dns_shunt,
        },
        FieldBinding {
            name: "dns_mode",
            description: "Proxy filter mode",
            package: proxy::PACKAGE,
            read: |s| {
                s.single(proxy::PACKAGE, proxy::SECTION, proxy::DNS_MODE)
                    .unwrap_or("tcp")
                    .to_string()
            },
            write: |v| proxy_set(proxy::DNS_MODE, v),
            validate: validate_dns_mode,
        },
        FieldBinding {
            name: "remote_dns",
            description: "Remote DNS, defaults to the filter's listen port",
            package: proxy::PACKAGE,
            read: |s| {
                s.single(proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_DNS)
                    .map(str::to_string)
                    .unwrap_or_else(|| local_dns_target(s.listen_port()))
            },
            write: |v| proxy_set(proxy::REMOTE_DNS, v),
            validate: validate_remote_dns,
        },
        FieldBinding {
            name: "remote_dns_doh",
            description: "DoH address for remote DNS resolution",
            package: proxy::PACKAGE,
            read: |s| {
                s.single(proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_DNS_DOH)
                    .unwrap_or_default()
                    .to_string()
            },
            write: |v| proxy_set(proxy::REMOTE_DNS_DOH, v),
            validate: validate_doh_url,
        },
        FieldBinding {
            name: "remote_fakedns",
            description: "FakeDNS; disable when the filter handles shunting",
            package: proxy::PACKAGE,
            read: |s| s.flag(proxy::PACKAGE, proxy::SECTION, proxy::REMOTE_FAKEDNS, false),
            write: |v| proxy_flag(proxy::REMOTE_FAKEDNS, v),
            validate: validate_flag,
        },
        FieldBinding {
            name: "dns_redirect",
            description: "Force redirect DNS for proxy devices",
            package: proxy::PACKAGE,
            read: |s| s.flag(proxy::PACKAGE, proxy::SECTION, proxy::DNS_REDIRECT, true),
            write: |v| proxy_flag(proxy::DNS_REDIRECT, v),
            validate: validate_flag,
        },
    ]
}

/// Generic get/set over the binding table.
pub struct FieldBindings {
    store: Arc<dyn ConfigStore>,
    bindings: Vec<FieldBinding>,
}

impl FieldBindings {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self {
            store,
            bindings: default_bindings(),
        }
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.bindings.iter().map(|b| b.name).collect()
    }

    pub fn binding(&self, name: &str) -> Result<&FieldBinding, DomainError> {
        self.bindings
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| {
                DomainError::InvalidInput(format!(
                    "Unknown field '{}' (expected one of: {})",
                    name,
                    self.names().join(", ")
                ))
            })
    }

    pub async fn snapshot(&self) -> Result<FieldSnapshot, DomainError> {
        let mut snapshot = FieldSnapshot::default();
        for (package, section, option) in SNAPSHOT_KEYS {
            if let Some(value) = self.store.get(package, section, option).await? {
                snapshot.insert(package, section, option, value);
            }
        }
        Ok(snapshot)
    }

    pub async fn get(&self, name: &str) -> Result<String, DomainError> {
        let binding = self.binding(name)?;
        let snapshot = self.snapshot().await?;
        Ok((binding.read)(&snapshot))
    }

    /// Every field with its effective value, read-time defaults applied.
    pub async fn show(&self) -> Result<BTreeMap<&'static str, String>, DomainError> {
        let snapshot = self.snapshot().await?;
        Ok(self
            .bindings
            .iter()
            .map(|b| (b.name, (b.read)(&snapshot)))
            .collect())
    }

    /// Validates, then writes. Nothing is written when validation fails.
    #[instrument(skip(self))]
    pub async fn set(&self, name: &str, value: &str) -> Result<(), DomainError> {
        let binding = self.binding(name)?;
        (binding.validate)(value)
            .map_err(|e| DomainError::InvalidInput(format!("{}: {}", name, e)))?;

        let changes = (binding.write)(value);
        if changes.is_empty() {
            return Ok(());
        }

        let needs_package = !changes
            .iter()
            .any(|c| matches!(c, ConfigChange::EnsureSection { .. }));
        if needs_package && !self.store.package_exists(binding.package).await? {
            return Err(DomainError::ConfigStore(format!(
                "configuration package '{}' not found",
                binding.package
            )));
        }

        self.store.apply(binding.package, &changes).await?;
        info!(field = %name, "Field updated");
        Ok(())
    }
}
