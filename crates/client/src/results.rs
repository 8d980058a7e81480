use pref_dns_application::use_cases::RestartMap;
use pref_dns_domain::{RestartOutcome, ServiceRole};
use serde::Deserialize;
use std::collections::BTreeMap;

/// `restart` is a single outcome on success and the partial per-service
/// map on a restart failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RestartField {
    Outcome(String),
    Partial(BTreeMap<String, String>),
}

/// Output of `resolve`. Fields are optional so that failure objects
/// (`{code, message, detail}`) decode through the same type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ResolveResult {
    pub code: i32,
    #[serde(default)]
    pub count: usize,
    #[serde(default)]
    pub ips: Vec<String>,
    #[serde(default)]
    pub restart: Option<RestartField>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl ResolveResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Unknown or missing outcomes read as "not installed".
    pub fn restart_outcome(&self) -> RestartOutcome {
        match &self.restart {
            Some(RestartField::Outcome(raw)) => {
                raw.parse::<RestartOutcome>().unwrap_or(RestartOutcome::NotInstalled)
            }
            _ => RestartOutcome::NotInstalled,
        }
    }
}

/// Output of `commit_and_restart`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CommitResult {
    #[serde(default)]
    pub code: i32,
    #[serde(default)]
    pub restart: BTreeMap<String, String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl CommitResult {
    /// Known services with a recognised outcome; anything else is dropped.
    pub fn restart_map(&self) -> RestartMap {
        self.restart
            .iter()
            .filter_map(|(key, outcome)| {
                let role = match key.as_str() {
                    "mosdns" => ServiceRole::Filter,
                    "passwall" => ServiceRole::Proxy,
                    _ => return None,
                };
                outcome.parse::<RestartOutcome>().ok().map(|o| (role, o))
            })
            .collect()
    }
}
