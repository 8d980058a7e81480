use crate::error::ClientError;
use crate::results::{CommitResult, ResolveResult};
use pref_dns_application::use_cases::engine::reports::{outcome_phrase, restart_summary};
use pref_dns_domain::ServiceRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub text: String,
}

impl Notification {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            text: text.into(),
        }
    }
}

fn resolve_failure_text(message: Option<&str>) -> String {
    match message {
        Some("timeout") => "DNS query timed out".to_string(),
        Some("no_ip_found") => "No IP address found in DNS response".to_string(),
        Some(other) => other.to_string(),
        None => "unknown error".to_string(),
    }
}

/// Addresses were committed before the restart failed, so this is not
/// reported as a resolve failure.
fn restart_failure_text(detail: Option<&str>) -> String {
    format!(
        "Saved, but restart failed: {}",
        detail.unwrap_or("unknown error")
    )
}

pub fn for_resolve(result: &Result<ResolveResult, ClientError>) -> Notification {
    match result {
        Ok(r) if r.is_success() => Notification::info(format!(
            "Resolved {} IP(s): {} - {}",
            r.count,
            r.ips.join(", "),
            outcome_phrase(ServiceRole::Filter, r.restart_outcome())
        )),
        Ok(r) if r.message.as_deref() == Some("restart_failure") => {
            Notification::error(restart_failure_text(r.detail.as_deref()))
        }
        Ok(r) => Notification::error(format!(
            "Resolve failed: {}",
            resolve_failure_text(r.message.as_deref())
        )),
        Err(e) => Notification::error(e.to_string()),
    }
}

/// An unreadable commit report still means the configuration was saved.
pub fn for_commit(result: &Result<CommitResult, ClientError>) -> Notification {
    match result {
        Ok(r) if r.message.as_deref() == Some("restart_failure") => {
            Notification::error(restart_failure_text(r.detail.as_deref()))
        }
        Ok(r) if r.code != 0 => Notification::error(format!(
            "Save error: {}",
            r.message.as_deref().unwrap_or("unknown error")
        )),
        Ok(r) => {
            let restart = r.restart_map();
            if restart.is_empty() {
                Notification::info("Configuration saved")
            } else {
                Notification::info(restart_summary(&restart))
            }
        }
        Err(ClientError::Parse(_)) => Notification::info("Configuration saved"),
        Err(ClientError::Execution(detail)) => {
            Notification::error(format!("Save error: {}", detail))
        }
    }
}

/// Free-text actions report their own status line.
pub fn for_text(result: &Result<String, ClientError>) -> Notification {
    match result {
        Ok(line) if line.starts_with("Error:") || line.contains("failed:") => {
            Notification::error(line.clone())
        }
        Ok(line) => Notification::info(line.clone()),
        Err(e) => Notification::error(e.to_string()),
    }
}
