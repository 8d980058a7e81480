use crate::use_cases::cron::CronSyncOutcome;
use crate::use_cases::services::RestartMap;
use pref_dns_domain::{
    AllowListState, DomainError, ProxyDnsGlobal, RestartOutcome, ServiceRole, ServiceStatus,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::IpAddr;

pub const CODE_OK: i32 = 0;
pub const CODE_INVALID_INPUT: i32 = 1;
pub const CODE_RESOLUTION: i32 = 2;
pub const CODE_RESTART: i32 = 3;
pub const CODE_STORE: i32 = 4;
pub const CODE_SCHEDULER: i32 = 5;
pub const CODE_EXECUTION: i32 = 6;
pub const CODE_IN_PROGRESS: i32 = 7;

/// Result code for a failed action, also used as the process exit code.
pub fn error_code(error: &DomainError) -> i32 {
    match error {
        DomainError::InvalidInput(_)
        | DomainError::InvalidDomainName(_)
        | DomainError::InvalidResolverAddress(_)
        | DomainError::InvalidCronFormat(_) => CODE_INVALID_INPUT,
        DomainError::QueryTimeout | DomainError::NoIpFound | DomainError::Transport(_) => {
            CODE_RESOLUTION
        }
        DomainError::RestartFailed { .. } => CODE_RESTART,
        DomainError::SourceUnavailable(_)
        | DomainError::ConfigStore(_)
        | DomainError::ConfigError(_) => CODE_STORE,
        DomainError::SchedulerUnavailable => CODE_SCHEDULER,
        DomainError::ActionInProgress => CODE_IN_PROGRESS,
        DomainError::ServiceNotInstalled(_) | DomainError::IoError(_) => CODE_EXECUTION,
    }
}

/// Phrase used after " - " in single-service status lines.
pub fn outcome_phrase(role: ServiceRole, outcome: RestartOutcome) -> String {
    let name = role.display_name();
    match outcome {
        RestartOutcome::Restarted => format!("{} restarted", name),
        RestartOutcome::SavedOnly => format!("Saved ({} not running)", name),
        RestartOutcome::NotInstalled => format!("Saved ({} not installed)", name),
    }
}

/// `MosDNS: saved and restarted; PassWall: saved (not installed)`.
pub fn restart_summary(restart: &RestartMap) -> String {
    restart
        .iter()
        .map(|(role, outcome)| {
            let detail = match outcome {
                RestartOutcome::Restarted => "saved and restarted",
                RestartOutcome::SavedOnly => "saved (not running, skip restart)",
                RestartOutcome::NotInstalled => "saved (not installed)",
            };
            format!("{}: {}", role.display_name(), detail)
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn join_ips(ips: &[IpAddr]) -> String {
    ips.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolveReport {
    pub code: i32,
    pub count: usize,
    pub ips: Vec<IpAddr>,
    pub restart: RestartOutcome,
}

impl ResolveReport {
    pub fn status_line(&self) -> String {
        format!(
            "Resolved {} IP(s): {} - {}",
            self.count,
            join_ips(&self.ips),
            outcome_phrase(ServiceRole::Filter, self.restart)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitReport {
    pub code: i32,
    pub restart: RestartMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<CronSyncOutcome>,
}

impl CommitReport {
    pub fn status_line(&self) -> String {
        if self.restart.is_empty() {
            "Configuration saved".to_string()
        } else {
            restart_summary(&self.restart)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    pub code: i32,
    pub count: usize,
    pub ips: Vec<IpAddr>,
    pub domains: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<String>,
    pub restart: Option<RestartOutcome>,
}

impl UpdateReport {
    pub fn skipped() -> Self {
        Self {
            code: CODE_OK,
            count: 0,
            ips: Vec::new(),
            domains: 0,
            failed: Vec::new(),
            restart: None,
        }
    }

    pub fn status_line(&self) -> String {
        let Some(restart) = self.restart else {
            return "MosDNS integration disabled, nothing to update".to_string();
        };
        let mut line = format!(
            "Updated {} IP(s) from {} domain(s): {} - {}",
            self.count,
            self.domains,
            join_ips(&self.ips),
            outcome_phrase(ServiceRole::Filter, restart)
        );
        if !self.failed.is_empty() {
            line.push_str(&format!(" (failed: {})", self.failed.join(", ")));
        }
        line
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CronReport {
    pub code: i32,
    #[serde(flatten)]
    pub outcome: CronSyncOutcome,
}

impl CronReport {
    /// Every sync outcome is a success. A missing scheduler only shows up in
    /// `status`.
    pub fn new(outcome: CronSyncOutcome) -> Self {
        Self {
            code: CODE_OK,
            outcome,
        }
    }

    pub fn status_line(&self) -> String {
        match &self.outcome {
            CronSyncOutcome::Registered { schedule } => {
                format!("Scheduled resolve registered: {}", schedule)
            }
            CronSyncOutcome::Removed => "Scheduled resolve removed".to_string(),
            CronSyncOutcome::Unchanged => "Scheduled resolve unchanged".to_string(),
            CronSyncOutcome::SchedulerUnavailable => {
                "Cron service is not installed. Scheduled resolve is unavailable.".to_string()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortReport {
    pub code: i32,
    pub remote_dns: String,
    pub restart: RestartOutcome,
}

impl PortReport {
    pub fn status_line(&self) -> String {
        format!(
            "Remote DNS set to {} - {}",
            self.remote_dns,
            outcome_phrase(ServiceRole::Proxy, self.restart)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RestoreReport {
    pub code: i32,
    pub settings: ProxyDnsGlobal,
    pub restart: RestartOutcome,
}

impl RestoreReport {
    pub fn status_line(&self) -> String {
        format!(
            "PassWall DNS settings restored to defaults - {}",
            outcome_phrase(ServiceRole::Proxy, self.restart)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct StatusReport {
    pub services: BTreeMap<ServiceRole, ServiceStatus>,
}

impl StatusReport {
    pub fn status_line(&self) -> String {
        self.services
            .iter()
            .map(|(role, status)| format!("{} {}", role.display_name(), status.label()))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// What the filter, proxy and scheduler hold right now. A part whose
/// source could not be read is `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentReport {
    pub code: i32,
    pub allow_list: Option<AllowListState>,
    pub proxy: Option<ProxyDnsGlobal>,
    pub scheduled: Option<String>,
}

impl CurrentReport {
    pub fn status_line(&self) -> String {
        let allow_list = match &self.allow_list {
            None => "Cloudflare IPs: unavailable".to_string(),
            Some(state) => format!(
                "Cloudflare IPs: {} (feature {})",
                if state.cloudflare_ip.is_empty() {
                    "none".to_string()
                } else {
                    join_ips(&state.cloudflare_ip)
                },
                if state.cloudflare_enabled { "enabled" } else { "disabled" }
            ),
        };
        let remote_dns = match &self.proxy {
            None => "unavailable",
            Some(proxy) => proxy.remote_dns.as_deref().unwrap_or("not set"),
        };
        format!(
            "{}; Remote DNS: {}; Scheduled update: {}",
            allow_list,
            remote_dns,
            self.scheduled.as_deref().unwrap_or("off")
        )
    }
}

/// A failed action. `restart` carries whatever was reconciled before a
/// restart failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionError {
    pub code: i32,
    pub message: &'static str,
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartMap>,
    #[serde(skip)]
    pub error: DomainError,
}

impl ActionError {
    pub fn with_restart(error: DomainError, restart: RestartMap) -> Self {
        Self {
            restart: Some(restart),
            ..Self::from(error)
        }
    }

    pub fn status_line(&self) -> String {
        match &self.error {
            DomainError::QueryTimeout => "Resolve failed: DNS query timed out".to_string(),
            DomainError::NoIpFound => {
                "Resolve failed: No IP address found in DNS response".to_string()
            }
            e if e.is_resolution_failure() => format!("Resolve failed: {}", e),
            e => format!("Error: {}", e),
        }
    }
}

impl From<DomainError> for ActionError {
    fn from(error: DomainError) -> Self {
        Self {
            code: error_code(&error),
            message: error.kind(),
            detail: error.to_string(),
            restart: None,
            error,
        }
    }
}

impl std::fmt::Display for ActionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.error)
    }
}

impl std::error::Error for ActionError {}
