use crate::ports::{ConfigChange, ConfigStore, ConfigValue};
use crate::schema::{filter, proxy};
use crate::use_cases::allow_list::AllowListStore;
use pref_dns_domain::allow_list::DEFAULT_LISTEN_PORT;
use pref_dns_domain::preference::{flag_value, parse_flag};
use pref_dns_domain::{local_dns_target, DomainError, ProxyDnsGlobal};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Keeps the proxy subsystem's remote DNS pointed at the filter's listener.
pub struct PortBridge {
    store: Arc<dyn ConfigStore>,
    allow_list: Arc<AllowListStore>,
}

impl PortBridge {
    pub fn new(store: Arc<dyn ConfigStore>, allow_list: Arc<AllowListStore>) -> Self {
        Self { store, allow_list }
    }

    async fn ensure_proxy(&self) -> Result<(), DomainError> {
        if self.store.package_exists(proxy::PACKAGE).await? {
            Ok(())
        } else {
            Err(DomainError::ConfigStore(format!(
                "configuration package '{}' not found",
                proxy::PACKAGE
            )))
        }
    }

    async fn get(&self, option: &str) -> Result<Option<String>, DomainError> {
        Ok(self
            .store
            .get(proxy::PACKAGE, proxy::SECTION, option)
            .await?
            .as_ref()
            .and_then(ConfigValue::as_single)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string))
    }

    /// Writes `127.0.0.1#<listen_port>` as the remote DNS. Returns the value
    /// written.
    #[instrument(skip(self))]
    pub async fn write_port(&self) -> Result<String, DomainError> {
        if !self.store.package_exists(filter::PACKAGE).await? {
            return Err(DomainError::SourceUnavailable(format!(
                "configuration package '{}' not found",
                filter::PACKAGE
            )));
        }
        let port = self.allow_list.listen_port().await?;
        self.ensure_proxy().await?;

        let target = local_dns_target(port);
        self.store
            .apply(
                proxy::PACKAGE,
                &[ConfigChange::set(proxy::SECTION, proxy::REMOTE_DNS, target.as_str())],
            )
            .await?;

        info!(remote_dns = %target, "Remote DNS follows filter listen port");
        Ok(target)
    }

    /// Overwrites every proxy DNS field with its factory default.
    #[instrument(skip(self))]
    pub async fn restore_defaults(&self) -> Result<ProxyDnsGlobal, DomainError> {
        self.ensure_proxy().await?;

        let port = match self.store.package_exists(filter::PACKAGE).await? {
            true => self.allow_list.listen_port().await.unwrap_or_else(|e| {
                warn!(error = %e, "Falling back to the default listen port");
                DEFAULT_LISTEN_PORT
            }),
            false => DEFAULT_LISTEN_PORT,
        };
        let defaults = ProxyDnsGlobal::factory_defaults(port);

        let changes = [
            ConfigChange::set(proxy::SECTION, proxy::DNS_SHUNT, defaults.dns_shunt.as_str()),
            ConfigChange::set(proxy::SECTION, proxy::DNS_MODE, defaults.dns_mode.as_str()),
            ConfigChange::set(
                proxy::SECTION,
                proxy::REMOTE_DNS,
                defaults.effective_remote_dns(port),
            ),
            ConfigChange::set(
                proxy::SECTION,
                proxy::REMOTE_DNS_DOH,
                defaults.remote_dns_doh.as_str(),
            ),
            ConfigChange::set(
                proxy::SECTION,
                proxy::REMOTE_FAKEDNS,
                flag_value(defaults.remote_fakedns),
            ),
            ConfigChange::set(
                proxy::SECTION,
                proxy::DNS_REDIRECT,
                flag_value(defaults.dns_redirect),
            ),
        ];
        self.store.apply(proxy::PACKAGE, &changes).await?;

        info!("Proxy DNS settings restored to defaults");
        Ok(defaults)
    }

    /// Stored values as-is; `remote_dns` stays `None` until written.
    pub async fn read(&self) -> Result<ProxyDnsGlobal, DomainError> {
        self.ensure_proxy().await?;
        let defaults = ProxyDnsGlobal::factory_defaults(0);

        let flag = |raw: Option<String>, default: bool| {
            raw.as_deref().and_then(parse_flag).unwrap_or(default)
        };

        Ok(ProxyDnsGlobal {
            dns_shunt: self.get(proxy::DNS_SHUNT).await?.unwrap_or(defaults.dns_shunt),
            dns_mode: self.get(proxy::DNS_MODE).await?.unwrap_or(defaults.dns_mode),
            remote_dns: self.get(proxy::REMOTE_DNS).await?,
            remote_dns_doh: self.get(proxy::REMOTE_DNS_DOH).await?.unwrap_or_default(),
            remote_fakedns: flag(self.get(proxy::REMOTE_FAKEDNS).await?, false),
            dns_redirect: flag(self.get(proxy::DNS_REDIRECT).await?, true),
        })
    }
}
