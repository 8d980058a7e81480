pub mod allow_list;
pub mod cron;
pub mod engine;
pub mod port_bridge;
pub mod preferences;
pub mod resolve;
pub mod services;

pub use allow_list::AllowListStore;
pub use cron::{CronSyncOutcome, CronSyncer};
pub use engine::{
    ActionError, ActionState, CronAction, EngineComponents, ReconciliationEngine,
};
pub use port_bridge::PortBridge;
pub use preferences::{FieldBindings, PreferenceStore};
pub use resolve::DomainResolver;
pub use services::{ReconcileReport, RestartCoordinator, RestartMap, ServiceProbe};
