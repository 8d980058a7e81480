mod reconciliation_engine;
pub mod reports;

pub use reconciliation_engine::{
    ActionState, ActionTrace, CronAction, EngineComponents, ReconciliationEngine,
};
pub use reports::{
    ActionError, CommitReport, CronReport, CurrentReport, PortReport, ResolveReport, RestoreReport,
    StatusReport, UpdateReport,
};
