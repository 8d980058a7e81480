use async_trait::async_trait;
use pref_dns_domain::DomainError;

/// Control surface of an init-managed service.
#[async_trait]
pub trait ServiceControl: Send + Sync {
    /// True iff the service's control script exists.
    async fn is_installed(&self, name: &str) -> bool;

    async fn is_running(&self, name: &str) -> Result<bool, DomainError>;

    async fn restart(&self, name: &str) -> Result<(), DomainError>;
}
