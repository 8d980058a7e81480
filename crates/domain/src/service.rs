use crate::config::ServicesConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The three collaborating services, keyed the way results report them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ServiceRole {
    #[serde(rename = "mosdns")]
    Filter,
    #[serde(rename = "passwall")]
    Proxy,
    #[serde(rename = "cron")]
    Scheduler,
}

impl ServiceRole {
    pub fn key(&self) -> &'static str {
        match self {
            ServiceRole::Filter => "mosdns",
            ServiceRole::Proxy => "passwall",
            ServiceRole::Scheduler => "cron",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ServiceRole::Filter => "MosDNS",
            ServiceRole::Proxy => "PassWall",
            ServiceRole::Scheduler => "Cron",
        }
    }
}

impl fmt::Display for ServiceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Init script names behind each role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceNames {
    pub filter: String,
    pub proxy: String,
    pub scheduler: String,
}

impl ServiceNames {
    pub fn name(&self, role: ServiceRole) -> &str {
        match role {
            ServiceRole::Filter => &self.filter,
            ServiceRole::Proxy => &self.proxy,
            ServiceRole::Scheduler => &self.scheduler,
        }
    }
}

impl Default for ServiceNames {
    fn default() -> Self {
        Self::from(&ServicesConfig::default())
    }
}

impl From<&ServicesConfig> for ServiceNames {
    fn from(config: &ServicesConfig) -> Self {
        Self {
            filter: config.filter.clone(),
            proxy: config.proxy.clone(),
            scheduler: config.scheduler.clone(),
        }
    }
}

/// Snapshot of one service, recomputed on every probe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub installed: bool,
    pub running: bool,
}

impl ServiceStatus {
    pub fn not_installed() -> Self {
        Self {
            installed: false,
            running: false,
        }
    }

    pub fn label(&self) -> &'static str {
        match (self.installed, self.running) {
            (false, _) => "Not Installed",
            (true, true) => "RUNNING",
            (true, false) => "NOT RUNNING",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartOutcome {
    Restarted,
    SavedOnly,
    NotInstalled,
}

impl RestartOutcome {
    pub fn to_str(&self) -> &'static str {
        match self {
            RestartOutcome::Restarted => "restarted",
            RestartOutcome::SavedOnly => "saved_only",
            RestartOutcome::NotInstalled => "not_installed",
        }
    }

}

impl FromStr for RestartOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "restarted" => Ok(RestartOutcome::Restarted),
            "saved_only" => Ok(RestartOutcome::SavedOnly),
            "not_installed" => Ok(RestartOutcome::NotInstalled),
            other => Err(format!("Unknown restart outcome '{}'", other)),
        }
    }
}

impl fmt::Display for RestartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_keys() {
        assert_eq!(ServiceRole::Filter.key(), "mosdns");
        assert_eq!(ServiceRole::Proxy.key(), "passwall");
        assert_eq!(ServiceRole::Scheduler.to_string(), "cron");
    }

    #[test]
    fn test_outcome_str_round_trip() {
        for outcome in [
            RestartOutcome::Restarted,
            RestartOutcome::SavedOnly,
            RestartOutcome::NotInstalled,
        ] {
            assert_eq!(outcome.to_str().parse::<RestartOutcome>(), Ok(outcome));
        }
        assert!("partial".parse::<RestartOutcome>().is_err());
    }

    #[test]
    fn test_status_label() {
        assert_eq!(ServiceStatus::not_installed().label(), "Not Installed");
        let running = ServiceStatus {
            installed: true,
            running: true,
        };
        assert_eq!(running.label(), "RUNNING");
    }
}
