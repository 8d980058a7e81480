use crate::ports::UpstreamResolver;
use pref_dns_domain::{validate_hostname, DomainError, ResolverAddress};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Resolves one domain against one upstream server, exactly one attempt.
pub struct DomainResolver {
    upstream: Arc<dyn UpstreamResolver>,
    timeout: Duration,
    default_port: u16,
}

impl DomainResolver {
    pub fn new(upstream: Arc<dyn UpstreamResolver>, timeout: Duration, default_port: u16) -> Self {
        Self {
            upstream,
            timeout,
            default_port,
        }
    }

    /// Input checks only; no query is sent.
    pub fn validate(&self, domain: &str, server: &str) -> Result<ResolverAddress, DomainError> {
        validate_hostname(domain.trim()).map_err(DomainError::InvalidDomainName)?;
        ResolverAddress::parse_with_default_port(server, self.default_port)
            .map_err(DomainError::InvalidResolverAddress)
    }

    /// Returns the addresses in the order the resolver sent them, without
    /// deduplication. An empty answer is `NoIpFound`.
    #[instrument(skip(self))]
    pub async fn resolve(&self, domain: &str, server: &str) -> Result<Vec<IpAddr>, DomainError> {
        let resolver = self.validate(domain, server)?;
        let domain = domain.trim();

        let lookup = self
            .upstream
            .lookup(domain, resolver.socket_addr(), self.timeout);

        let ips = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(ips)) => ips,
            Ok(Err(e)) => {
                warn!(domain = %domain, server = %resolver, error = %e, "Upstream query failed");
                return Err(e);
            }
            Err(_) => {
                warn!(domain = %domain, server = %resolver, "Upstream query timed out");
                return Err(DomainError::QueryTimeout);
            }
        };

        if ips.is_empty() {
            debug!(domain = %domain, server = %resolver, "Answer carried no address records");
            return Err(DomainError::NoIpFound);
        }

        debug!(domain = %domain, server = %resolver, count = ips.len(), "Domain resolved");
        Ok(ips)
    }
}
