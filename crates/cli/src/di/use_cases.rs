use super::Adapters;
use pref_dns_application::use_cases::{
    AllowListStore, CronSyncer, DomainResolver, EngineComponents, FieldBindings, PortBridge,
    PreferenceStore, ReconciliationEngine, RestartCoordinator, ServiceProbe,
};
use pref_dns_domain::{Config, ServiceNames};
use std::sync::Arc;
use std::time::Duration;

pub struct UseCases {
    pub engine: Arc<ReconciliationEngine>,
    pub probe: Arc<ServiceProbe>,
    pub names: ServiceNames,
}

impl UseCases {
    pub fn new(adapters: &Adapters, config: &Config) -> Self {
        let names = ServiceNames::from(&config.services);
        let probe = Arc::new(ServiceProbe::new(
            adapters.control.clone(),
            Duration::from_millis(config.services.probe_timeout_ms),
        ));
        let allow_list = Arc::new(AllowListStore::new(adapters.store.clone()));

        let parts = EngineComponents {
            store: adapters.store.clone(),
            preferences: Arc::new(PreferenceStore::new(adapters.store.clone())),
            resolver: Arc::new(DomainResolver::new(
                adapters.upstream.clone(),
                Duration::from_secs(config.resolver.query_timeout),
                config.resolver.default_port,
            )),
            allow_list: allow_list.clone(),
            probe: probe.clone(),
            coordinator: Arc::new(RestartCoordinator::new(
                adapters.control.clone(),
                probe.clone(),
                names.clone(),
                Duration::from_secs(config.services.restart_timeout_secs),
            )),
            cron: Arc::new(CronSyncer::new(
                adapters.cron_table.clone(),
                adapters.control.clone(),
                probe.clone(),
                names.scheduler.clone(),
                config.cron.command.clone(),
            )),
            bridge: Arc::new(PortBridge::new(adapters.store.clone(), allow_list)),
            fields: Arc::new(FieldBindings::new(adapters.store.clone())),
        };

        Self {
            engine: Arc::new(ReconciliationEngine::new(parts)),
            probe,
            names,
        }
    }
}
