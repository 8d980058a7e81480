#![allow(dead_code)]

mod mock_ports;

pub use mock_ports::{MockConfigStore, MockCronTable, MockServiceControl, MockUpstreamResolver};

use pref_dns_application::use_cases::{
    AllowListStore, CronSyncer, DomainResolver, EngineComponents, FieldBindings, PortBridge,
    PreferenceStore, ReconciliationEngine, RestartCoordinator, ServiceProbe,
};
use pref_dns_domain::ServiceNames;
use std::sync::Arc;
use std::time::Duration;

pub const UPDATE_COMMAND: &str = "/usr/bin/pref-dns update";

/// Engine wired to in-memory collaborators.
pub struct TestEngine {
    pub store: Arc<MockConfigStore>,
    pub control: Arc<MockServiceControl>,
    pub upstream: Arc<MockUpstreamResolver>,
    pub cron_table: Arc<MockCronTable>,
    pub engine: ReconciliationEngine,
}

impl TestEngine {
    /// All three packages present, all three services installed and running.
    pub fn new() -> Self {
        let store = Arc::new(MockConfigStore::with_packages(&[
            "pref_dns", "mosdns", "passwall",
        ]));
        let control = Arc::new(MockServiceControl::new());
        for name in ["mosdns", "passwall", "cron"] {
            control.install(name, true);
        }
        Self::with(store, control)
    }

    pub fn with(store: Arc<MockConfigStore>, control: Arc<MockServiceControl>) -> Self {
        let upstream = Arc::new(MockUpstreamResolver::new());
        let cron_table = Arc::new(MockCronTable::new());

        let probe = Arc::new(ServiceProbe::new(control.clone(), Duration::from_millis(200)));
        let allow_list = Arc::new(AllowListStore::new(store.clone()));
        let engine = ReconciliationEngine::new(EngineComponents {
            store: store.clone(),
            preferences: Arc::new(PreferenceStore::new(store.clone())),
            resolver: Arc::new(DomainResolver::new(
                upstream.clone(),
                Duration::from_millis(300),
                53,
            )),
            allow_list: allow_list.clone(),
            probe: probe.clone(),
            coordinator: Arc::new(RestartCoordinator::new(
                control.clone(),
                probe.clone(),
                ServiceNames::default(),
                Duration::from_millis(300),
            )),
            cron: Arc::new(CronSyncer::new(
                cron_table.clone(),
                control.clone(),
                probe,
                "cron",
                UPDATE_COMMAND,
            )),
            bridge: Arc::new(PortBridge::new(store.clone(), allow_list)),
            fields: Arc::new(FieldBindings::new(store.clone())),
        });

        Self {
            store,
            control,
            upstream,
            cron_table,
            engine,
        }
    }
}
