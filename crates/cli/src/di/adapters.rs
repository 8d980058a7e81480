use pref_dns_application::ports::{ConfigStore, CronTable, ServiceControl, UpstreamResolver};
use pref_dns_domain::config::StoreBackend;
use pref_dns_domain::Config;
use pref_dns_infrastructure::dns::UdpUpstreamResolver;
use pref_dns_infrastructure::store::{TomlFileStore, UciStore};
use pref_dns_infrastructure::system::{CrontabFile, InitdServiceControl};
use std::sync::Arc;

pub struct Adapters {
    pub store: Arc<dyn ConfigStore>,
    pub control: Arc<dyn ServiceControl>,
    pub upstream: Arc<dyn UpstreamResolver>,
    pub cron_table: Arc<dyn CronTable>,
}

impl Adapters {
    pub fn new(config: &Config) -> Self {
        let store: Arc<dyn ConfigStore> = match config.store.backend {
            StoreBackend::Uci => Arc::new(UciStore::new(&config.store.uci_bin)),
            StoreBackend::Toml => Arc::new(TomlFileStore::new(&config.store.toml_dir)),
        };

        Self {
            store,
            control: Arc::new(InitdServiceControl::new(&config.services.init_dir)),
            upstream: Arc::new(UdpUpstreamResolver::new()),
            cron_table: Arc::new(CrontabFile::new(&config.cron.crontab_path)),
        }
    }
}
