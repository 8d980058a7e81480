use crate::ports::{ConfigChange, ConfigStore, ConfigValue};
use crate::schema::pref;
use pref_dns_domain::preference::{flag_value, parse_flag};
use pref_dns_domain::{CronSchedule, DomainError, PreferenceConfig};
use std::sync::Arc;
use tracing::{info, warn};

/// Reads and writes the `pref_dns.config` section.
pub struct PreferenceStore {
    store: Arc<dyn ConfigStore>,
}

impl PreferenceStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    async fn get(&self, option: &str) -> Result<Option<ConfigValue>, DomainError> {
        self.store.get(pref::PACKAGE, pref::SECTION, option).await
    }

    async fn get_flag(&self, option: &str, default: bool) -> Result<bool, DomainError> {
        Ok(self
            .get(option)
            .await?
            .and_then(|v| v.as_single().and_then(parse_flag))
            .unwrap_or(default))
    }

    /// The stored preferences, with defaults for anything unset.
    pub async fn read(&self) -> Result<PreferenceConfig, DomainError> {
        let defaults = PreferenceConfig::default();

        let mut config = PreferenceConfig {
            domains: Vec::new(),
            dns_server: self
                .get(pref::DNS_SERVER)
                .await?
                .and_then(|v| v.as_single().map(|s| s.trim().to_string()))
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.dns_server),
            mosdns_enabled: self
                .get_flag(pref::MOSDNS_ENABLED, defaults.mosdns_enabled)
                .await?,
            passwall_enabled: self
                .get_flag(pref::PASSWALL_ENABLED, defaults.passwall_enabled)
                .await?,
            cron_enabled: self
                .get_flag(pref::CRON_ENABLED, defaults.cron_enabled)
                .await?,
            cron_expression: defaults.cron_expression,
        };

        if let Some(value) = self.get(pref::DOMAIN).await? {
            for domain in value.into_list() {
                config.add_domain(&domain);
            }
        }

        if let Some(raw) = self.get(pref::CRON_EXPRESSION).await? {
            let raw = raw.as_single().unwrap_or_default().to_string();
            match CronSchedule::parse(&raw) {
                Ok(schedule) => config.cron_expression = schedule,
                Err(e) => warn!(value = %raw, error = %e, "Stored cron expression is invalid"),
            }
        }

        Ok(config)
    }

    /// Raw stored expression, without falling back to the default.
    pub async fn stored_cron_expression(&self) -> Result<Option<String>, DomainError> {
        Ok(self
            .get(pref::CRON_EXPRESSION)
            .await?
            .and_then(|v| v.as_single().map(str::to_string)))
    }

    pub async fn exists(&self) -> Result<bool, DomainError> {
        if !self.store.package_exists(pref::PACKAGE).await? {
            return Ok(false);
        }
        Ok(self.get(pref::DNS_SERVER).await?.is_some())
    }

    /// Creates the section on first use and fills in defaults for options
    /// that are unset. Stored values, including invalid ones, are left as
    /// they are. Returns true when anything was written.
    pub async fn ensure_exists(&self) -> Result<bool, DomainError> {
        if self.exists().await? {
            return Ok(false);
        }

        let defaults = PreferenceConfig::default();
        let wanted = [
            (pref::DNS_SERVER, defaults.dns_server),
            (
                pref::MOSDNS_ENABLED,
                flag_value(defaults.mosdns_enabled).to_string(),
            ),
            (
                pref::PASSWALL_ENABLED,
                flag_value(defaults.passwall_enabled).to_string(),
            ),
            (
                pref::CRON_ENABLED,
                flag_value(defaults.cron_enabled).to_string(),
            ),
            (
                pref::CRON_EXPRESSION,
                defaults.cron_expression.as_str().to_string(),
            ),
        ];

        let mut changes = vec![ConfigChange::ensure_section(
            pref::SECTION,
            pref::SECTION_TYPE,
        )];
        for (option, value) in wanted {
            if self.get(option).await?.is_none() {
                changes.push(ConfigChange::set(pref::SECTION, option, value));
            }
        }

        self.store.apply(pref::PACKAGE, &changes).await?;
        info!(defaults = changes.len() - 1, "Preference section created");
        Ok(true)
    }
}
