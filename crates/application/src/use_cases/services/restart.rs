use super::ServiceProbe;
use crate::ports::ServiceControl;
use pref_dns_domain::{DomainError, RestartOutcome, ServiceNames, ServiceRole};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

pub type RestartMap = BTreeMap<ServiceRole, RestartOutcome>;

/// Per-service results of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub outcomes: RestartMap,
    pub failures: BTreeMap<ServiceRole, String>,
}

impl ReconcileReport {
    pub fn outcome(&self, role: ServiceRole) -> Option<RestartOutcome> {
        self.outcomes.get(&role).copied()
    }

    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// The first failed restart as an error, if any.
    pub fn failure(&self) -> Option<DomainError> {
        self.failures
            .iter()
            .next()
            .map(|(role, detail)| DomainError::RestartFailed {
                service: role.key().to_string(),
                detail: detail.clone(),
            })
    }
}

/// Brings running services in line with freshly written configuration.
pub struct RestartCoordinator {
    control: Arc<dyn ServiceControl>,
    probe: Arc<ServiceProbe>,
    names: ServiceNames,
    restart_timeout: Duration,
}

impl RestartCoordinator {
    pub fn new(
        control: Arc<dyn ServiceControl>,
        probe: Arc<ServiceProbe>,
        names: ServiceNames,
        restart_timeout: Duration,
    ) -> Self {
        Self {
            control,
            probe,
            names,
            restart_timeout,
        }
    }

    pub fn names(&self) -> &ServiceNames {
        &self.names
    }

    /// Reconciles each role independently: install check, then run check,
    /// then restart. A failed restart is recorded in `failures` and never
    /// reported as an outcome.
    #[instrument(skip(self))]
    pub async fn reconcile(&self, changed: &[ServiceRole]) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        for role in changed {
            if report.outcomes.contains_key(role) || report.failures.contains_key(role) {
                continue;
            }
            match self.reconcile_one(*role).await {
                Ok(outcome) => {
                    info!(service = %role, outcome = %outcome, "Service reconciled");
                    report.outcomes.insert(*role, outcome);
                }
                Err(detail) => {
                    error!(service = %role, error = %detail, "Service restart failed");
                    report.failures.insert(*role, detail);
                }
            }
        }

        report
    }

    async fn reconcile_one(&self, role: ServiceRole) -> Result<RestartOutcome, String> {
        let name = self.names.name(role);
        let status = self.probe.probe(name).await;

        if !status.installed {
            return Ok(RestartOutcome::NotInstalled);
        }
        if !status.running {
            return Ok(RestartOutcome::SavedOnly);
        }

        match tokio::time::timeout(self.restart_timeout, self.control.restart(name)).await {
            Ok(Ok(())) => Ok(RestartOutcome::Restarted),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "restart did not finish within {}s",
                self.restart_timeout.as_secs()
            )),
        }
    }
}
