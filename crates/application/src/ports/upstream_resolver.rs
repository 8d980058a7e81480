use async_trait::async_trait;
use pref_dns_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

#[async_trait]
pub trait UpstreamResolver: Send + Sync {
    /// Sends one address query for `domain` to `server` and returns the
    /// addresses in answer order. An answer without address records is an
    /// empty vector, not an error.
    async fn lookup(
        &self,
        domain: &str,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Vec<IpAddr>, DomainError>;
}
