use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid domain name: {0}")]
    InvalidDomainName(String),

    #[error("Invalid resolver address: {0}")]
    InvalidResolverAddress(String),

    #[error("Query timeout")]
    QueryTimeout,

    #[error("No IP address found in DNS response")]
    NoIpFound,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service not installed: {0}")]
    ServiceNotInstalled(String),

    #[error("Restart of {service} failed: {detail}")]
    RestartFailed { service: String, detail: String },

    #[error("Invalid cron format: {0}")]
    InvalidCronFormat(String),

    #[error("Task scheduler is not installed")]
    SchedulerUnavailable,

    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Configuration store error: {0}")]
    ConfigStore(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Another action is in progress")]
    ActionInProgress,
}

impl DomainError {
    /// Stable machine-readable identifier, used as the `message` of failed
    /// action results.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_)
            | Self::InvalidDomainName(_)
            | Self::InvalidResolverAddress(_) => "invalid_input",
            Self::QueryTimeout => "timeout",
            Self::NoIpFound => "no_ip_found",
            Self::Transport(_) => "query_failed",
            Self::ServiceNotInstalled(_) => "service_not_installed",
            Self::RestartFailed { .. } => "restart_failure",
            Self::InvalidCronFormat(_) => "invalid_cron_format",
            Self::SchedulerUnavailable => "scheduler_unavailable",
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::ConfigStore(_) => "config_store_unavailable",
            Self::ConfigError(_) => "config_error",
            Self::IoError(_) => "execution_error",
            Self::ActionInProgress => "action_in_progress",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_)
                | Self::InvalidDomainName(_)
                | Self::InvalidResolverAddress(_)
                | Self::InvalidCronFormat(_)
        )
    }

    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Self::QueryTimeout | Self::NoIpFound | Self::Transport(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_for_resolution_failures() {
        assert_eq!(DomainError::QueryTimeout.kind(), "timeout");
        assert_eq!(DomainError::NoIpFound.kind(), "no_ip_found");
        assert!(DomainError::NoIpFound.is_resolution_failure());
        assert!(!DomainError::SchedulerUnavailable.is_resolution_failure());
    }

    #[test]
    fn test_validation_errors_share_kind() {
        let errors = [
            DomainError::InvalidInput("x".into()),
            DomainError::InvalidDomainName("x".into()),
            DomainError::InvalidResolverAddress("x".into()),
        ];
        for e in errors {
            assert_eq!(e.kind(), "invalid_input");
            assert!(e.is_validation());
        }
    }

    #[test]
    fn test_restart_failure_message_names_service() {
        let e = DomainError::RestartFailed {
            service: "mosdns".into(),
            detail: "exit status 1".into(),
        };
        assert_eq!(e.to_string(), "Restart of mosdns failed: exit status 1");
        assert_eq!(e.kind(), "restart_failure");
    }
}
