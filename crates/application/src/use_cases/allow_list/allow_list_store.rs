use crate::ports::{ConfigChange, ConfigStore, ConfigValue};
use crate::schema::filter;
use pref_dns_domain::allow_list::DEFAULT_LISTEN_PORT;
use pref_dns_domain::preference::{flag_value, parse_flag};
use pref_dns_domain::{dedup_preserving_order, AllowListState, DomainError};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Persists resolved addresses into the filter service's configuration.
pub struct AllowListStore {
    store: Arc<dyn ConfigStore>,
}

impl AllowListStore {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    async fn ensure_available(&self) -> Result<(), DomainError> {
        if self.store.package_exists(filter::PACKAGE).await? {
            Ok(())
        } else {
            Err(DomainError::ConfigStore(format!(
                "configuration package '{}' not found",
                filter::PACKAGE
            )))
        }
    }

    /// Writes the (deduplicated) address list and switches the feature on
    /// in a single commit. Returns the committed list.
    #[instrument(skip(self, ips), fields(count = ips.len()))]
    pub async fn apply(&self, ips: &[IpAddr]) -> Result<Vec<IpAddr>, DomainError> {
        if ips.is_empty() {
            return Err(DomainError::InvalidInput(
                "refusing to store an empty address list".to_string(),
            ));
        }
        self.ensure_available().await?;

        let committed = dedup_preserving_order(ips);
        let changes = [
            ConfigChange::set_list(
                filter::SECTION,
                filter::CLOUDFLARE_IP,
                committed.iter().map(ToString::to_string).collect(),
            ),
            ConfigChange::set(filter::SECTION, filter::CLOUDFLARE, flag_value(true)),
        ];
        self.store.apply(filter::PACKAGE, &changes).await?;

        info!(count = committed.len(), "Allow-list committed");
        Ok(committed)
    }

    pub async fn read(&self) -> Result<AllowListState, DomainError> {
        self.ensure_available().await?;

        let cloudflare_ip = self
            .store
            .get(filter::PACKAGE, filter::SECTION, filter::CLOUDFLARE_IP)
            .await?
            .map(ConfigValue::into_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|raw| match raw.trim().parse::<IpAddr>() {
                Ok(ip) => Some(ip),
                Err(_) => {
                    warn!(value = %raw, "Ignoring malformed allow-list entry");
                    None
                }
            })
            .collect();

        let cloudflare_enabled = self
            .store
            .get(filter::PACKAGE, filter::SECTION, filter::CLOUDFLARE)
            .await?
            .and_then(|v| v.as_single().and_then(parse_flag))
            .unwrap_or(false);

        let listen_port = self.listen_port().await?;

        Ok(AllowListState {
            cloudflare_ip,
            cloudflare_enabled,
            listen_port,
        })
    }

    /// The filter's listen port; the filter's own default when unset.
    pub async fn listen_port(&self) -> Result<u16, DomainError> {
        match self
            .store
            .get(filter::PACKAGE, filter::SECTION, filter::LISTEN_PORT)
            .await?
        {
            None => Ok(DEFAULT_LISTEN_PORT),
            Some(value) => {
                let raw = value.as_single().unwrap_or_default().trim().to_string();
                match raw.parse::<u16>() {
                    Ok(port) if port > 0 => Ok(port),
                    _ => Err(DomainError::SourceUnavailable(format!(
                        "{}.{}.{} holds an invalid port '{}'",
                        filter::PACKAGE,
                        filter::SECTION,
                        filter::LISTEN_PORT,
                        raw
                    ))),
                }
            }
        }
    }
}
