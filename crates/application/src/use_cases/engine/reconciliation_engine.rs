use super::reports::{
    ActionError, CommitReport, CronReport, CurrentReport, PortReport, ResolveReport, RestoreReport,
    StatusReport, UpdateReport, CODE_OK,
};
use crate::ports::ConfigStore;
use crate::schema::{filter, pref, proxy};
use crate::use_cases::allow_list::AllowListStore;
use crate::use_cases::cron::CronSyncer;
use crate::use_cases::port_bridge::PortBridge;
use crate::use_cases::preferences::{FieldBindings, PreferenceStore};
use crate::use_cases::resolve::DomainResolver;
use crate::use_cases::services::{RestartCoordinator, ServiceProbe};
use pref_dns_domain::cron_schedule::DEFAULT_CRON_EXPRESSION;
use pref_dns_domain::{CronSchedule, DomainError, RestartOutcome, ServiceRole};
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Lifecycle of one action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionState {
    Received,
    Validated,
    Resolved,
    Persisted,
    Reconciled,
    Reported,
    /// Validation failed before any side effect.
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CronAction {
    Enable,
    Disable,
}

impl FromStr for CronAction {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "enable" => Ok(CronAction::Enable),
            "disable" => Ok(CronAction::Disable),
            other => Err(DomainError::InvalidInput(format!(
                "Unknown cron action '{}' (expected enable or disable)",
                other
            ))),
        }
    }
}

/// States visited by the most recent action.
#[derive(Debug, Clone, Default)]
pub struct ActionTrace {
    action: &'static str,
    states: Vec<ActionState>,
}

impl ActionTrace {
    pub fn action(&self) -> &'static str {
        self.action
    }

    pub fn states(&self) -> &[ActionState] {
        &self.states
    }

    pub fn last(&self) -> Option<ActionState> {
        self.states.last().copied()
    }

    fn begin(&mut self, action: &'static str) {
        self.action = action;
        self.states = vec![ActionState::Received];
        debug!(action, "Action received");
    }

    fn advance(&mut self, state: ActionState) {
        debug!(action = self.action, state = ?state, "Action state");
        self.states.push(state);
    }

    fn reject<T>(&mut self, error: DomainError) -> Result<T, ActionError> {
        self.advance(ActionState::Rejected);
        Err(error.into())
    }

    fn fail<T>(&mut self, error: impl Into<ActionError>) -> Result<T, ActionError> {
        self.advance(ActionState::Reported);
        Err(error.into())
    }
}

/// Collaborators the engine sequences.
pub struct EngineComponents {
    pub store: Arc<dyn ConfigStore>,
    pub preferences: Arc<PreferenceStore>,
    pub resolver: Arc<DomainResolver>,
    pub allow_list: Arc<AllowListStore>,
    pub probe: Arc<ServiceProbe>,
    pub coordinator: Arc<RestartCoordinator>,
    pub cron: Arc<CronSyncer>,
    pub bridge: Arc<PortBridge>,
    pub fields: Arc<FieldBindings>,
}

/// Runs one user action to completion. Writing actions are serialized.
pub struct ReconciliationEngine {
    parts: EngineComponents,
    serial: Mutex<ActionTrace>,
}

impl ReconciliationEngine {
    pub fn new(parts: EngineComponents) -> Self {
        Self {
            parts,
            serial: Mutex::new(ActionTrace::default()),
        }
    }

    pub fn fields(&self) -> &FieldBindings {
        &self.parts.fields
    }

    /// Trace of the last writing action; waits for one in flight.
    pub async fn last_trace(&self) -> ActionTrace {
        self.serial.lock().await.clone()
    }

    async fn reconcile_one(&self, role: ServiceRole) -> Result<RestartOutcome, ActionError> {
        let report = self.parts.coordinator.reconcile(&[role]).await;
        if let Some(error) = report.failure() {
            return Err(ActionError::with_restart(error, report.outcomes));
        }
        report.outcome(role).ok_or_else(|| {
            ActionError::from(DomainError::IoError(format!(
                "no reconciliation outcome for {}",
                role
            )))
        })
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, domain: &str, server: &str) -> Result<ResolveReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("resolve");

        if let Err(e) = self.parts.resolver.validate(domain, server) {
            return trace.reject(e);
        }
        trace.advance(ActionState::Validated);

        let ips = match self.parts.resolver.resolve(domain, server).await {
            Ok(ips) => ips,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Resolved);

        let committed = match self.parts.allow_list.apply(&ips).await {
            Ok(committed) => committed,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Persisted);

        let restart = match self.reconcile_one(ServiceRole::Filter).await {
            Ok(outcome) => outcome,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Reconciled);

        info!(domain = %domain, count = committed.len(), restart = %restart, "Resolve completed");
        trace.advance(ActionState::Reported);
        Ok(ResolveReport {
            code: CODE_OK,
            count: committed.len(),
            ips: committed,
            restart,
        })
    }

    /// Re-resolves every stored domain. Domains that fail are skipped; when
    /// all fail the last failure is returned and nothing is written.
    #[instrument(skip(self))]
    pub async fn update(&self) -> Result<UpdateReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("update");

        let prefs = match self.parts.preferences.read().await {
            Ok(prefs) => prefs,
            Err(e) => return trace.fail(e),
        };
        if !prefs.mosdns_enabled {
            info!("MosDNS integration disabled, update skipped");
            trace.advance(ActionState::Reported);
            return Ok(UpdateReport::skipped());
        }
        if prefs.domains.is_empty() {
            return trace.reject(DomainError::InvalidInput(
                "No domain configured".to_string(),
            ));
        }
        for domain in &prefs.domains {
            if let Err(e) = self.parts.resolver.validate(domain, &prefs.dns_server) {
                return trace.reject(e);
            }
        }
        trace.advance(ActionState::Validated);

        let mut ips: Vec<IpAddr> = Vec::new();
        let mut failed = Vec::new();
        let mut last_error = None;
        for domain in &prefs.domains {
            match self.parts.resolver.resolve(domain, &prefs.dns_server).await {
                Ok(found) => ips.extend(found),
                Err(e) => {
                    warn!(domain = %domain, error = %e, "Skipping domain that failed to resolve");
                    failed.push(domain.clone());
                    last_error = Some(e);
                }
            }
        }
        if ips.is_empty() {
            let error = last_error.unwrap_or(DomainError::NoIpFound);
            return trace.fail(error);
        }
        trace.advance(ActionState::Resolved);

        let committed = match self.parts.allow_list.apply(&ips).await {
            Ok(committed) => committed,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Persisted);

        let restart = match self.reconcile_one(ServiceRole::Filter).await {
            Ok(outcome) => outcome,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Reconciled);

        info!(
            count = committed.len(),
            domains = prefs.domains.len(),
            failed = failed.len(),
            "Update completed"
        );
        trace.advance(ActionState::Reported);
        Ok(UpdateReport {
            code: CODE_OK,
            count: committed.len(),
            ips: committed,
            domains: prefs.domains.len() - failed.len(),
            failed,
            restart: Some(restart),
        })
    }

    /// Commits pending configuration, reconciles the filter and proxy
    /// services, then brings the scheduled job in line with the stored
    /// schedule.
    #[instrument(skip(self))]
    pub async fn commit_and_restart(&self) -> Result<CommitReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("commit_and_restart");
        trace.advance(ActionState::Validated);

        if let Err(e) = self.persist_all().await {
            return trace.fail(e);
        }
        trace.advance(ActionState::Persisted);

        let report = self
            .parts
            .coordinator
            .reconcile(&[ServiceRole::Filter, ServiceRole::Proxy])
            .await;
        if let Some(error) = report.failure() {
            return trace.fail(ActionError::with_restart(error, report.outcomes));
        }
        trace.advance(ActionState::Reconciled);

        let cron = match self.parts.preferences.read().await {
            Ok(prefs) => match self
                .parts
                .cron
                .sync(prefs.cron_enabled, prefs.cron_expression.as_str())
                .await
            {
                Ok(outcome) => Some(outcome),
                Err(e) => {
                    warn!(error = %e, "Scheduled job sync failed");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "Could not read schedule preference");
                None
            }
        };

        trace.advance(ActionState::Reported);
        Ok(CommitReport {
            code: CODE_OK,
            restart: report.outcomes,
            cron,
        })
    }

    async fn persist_all(&self) -> Result<(), DomainError> {
        if self.parts.preferences.ensure_exists().await? {
            info!("Preferences saved for the first time");
        }
        for package in [pref::PACKAGE, filter::PACKAGE, proxy::PACKAGE] {
            if self.parts.store.package_exists(package).await? {
                self.parts.store.commit(package).await?;
            }
        }
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn cron(&self, action: CronAction) -> Result<CronReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("cron");

        let expression = match action {
            CronAction::Disable => String::new(),
            CronAction::Enable => match self.parts.preferences.stored_cron_expression().await {
                Ok(stored) => stored.unwrap_or_else(|| DEFAULT_CRON_EXPRESSION.to_string()),
                Err(e) => return trace.fail(e),
            },
        };
        if action == CronAction::Enable {
            if let Err(e) = CronSchedule::parse(&expression) {
                return trace.reject(DomainError::InvalidCronFormat(e));
            }
        }
        trace.advance(ActionState::Validated);

        let outcome = match self
            .parts
            .cron
            .sync(action == CronAction::Enable, &expression)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Persisted);
        trace.advance(ActionState::Reported);

        Ok(CronReport::new(outcome))
    }

    #[instrument(skip(self))]
    pub async fn write_port(&self) -> Result<PortReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("write");
        trace.advance(ActionState::Validated);

        let remote_dns = match self.parts.bridge.write_port().await {
            Ok(target) => target,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Persisted);

        let restart = match self.reconcile_one(ServiceRole::Proxy).await {
            Ok(outcome) => outcome,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Reconciled);
        trace.advance(ActionState::Reported);

        Ok(PortReport {
            code: CODE_OK,
            remote_dns,
            restart,
        })
    }

    #[instrument(skip(self))]
    pub async fn restore(&self) -> Result<RestoreReport, ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("restore");
        trace.advance(ActionState::Validated);

        let settings = match self.parts.bridge.restore_defaults().await {
            Ok(settings) => settings,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Persisted);

        let restart = match self.reconcile_one(ServiceRole::Proxy).await {
            Ok(outcome) => outcome,
            Err(e) => return trace.fail(e),
        };
        trace.advance(ActionState::Reconciled);
        trace.advance(ActionState::Reported);

        Ok(RestoreReport {
            code: CODE_OK,
            settings,
            restart,
        })
    }

    /// Validates and writes one field under the action lock.
    #[instrument(skip(self))]
    pub async fn set_field(&self, name: &str, value: &str) -> Result<(), ActionError> {
        let mut trace = self.serial.lock().await;
        trace.begin("config_set");

        let binding = match self.parts.fields.binding(name) {
            Ok(binding) => binding,
            Err(e) => return trace.reject(e),
        };
        if let Err(e) = (binding.validate)(value) {
            return trace.reject(DomainError::InvalidInput(format!("{}: {}", name, e)));
        }
        trace.advance(ActionState::Validated);

        if let Err(e) = self.parts.fields.set(name, value).await {
            return trace.fail(e);
        }
        trace.advance(ActionState::Persisted);
        trace.advance(ActionState::Reported);
        Ok(())
    }

    /// Read-only view of the allow-list, the proxy's remote DNS and the
    /// registered scheduled job. Takes no lock.
    pub async fn current(&self) -> CurrentReport {
        let allow_list = match self.parts.allow_list.read().await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(error = %e, "Allow-list unavailable");
                None
            }
        };
        let proxy = match self.parts.bridge.read().await {
            Ok(settings) => Some(settings),
            Err(e) => {
                warn!(error = %e, "Proxy DNS settings unavailable");
                None
            }
        };
        let scheduled = match self.parts.cron.registered().await {
            Ok(jobs) => jobs.first().map(|job| job.schedule.to_string()),
            Err(e) => {
                warn!(error = %e, "Scheduled jobs unavailable");
                None
            }
        };
        CurrentReport {
            code: CODE_OK,
            allow_list,
            proxy,
            scheduled,
        }
    }

    /// Read-only; takes no lock.
    pub async fn status(&self) -> StatusReport {
        let names = self.parts.coordinator.names();
        let roles = [ServiceRole::Filter, ServiceRole::Proxy, ServiceRole::Scheduler];
        StatusReport {
            services: self
                .parts
                .probe
                .probe_roles(names, &roles)
                .await
                .into_iter()
                .collect(),
        }
    }
}
