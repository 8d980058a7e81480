use super::{MessageBuilder, ResponseParser, UdpTransport};
use async_trait::async_trait;
use hickory_proto::op::ResponseCode;
use pref_dns_application::ports::UpstreamResolver;
use pref_dns_domain::DomainError;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tracing::{debug, instrument};

/// Plain DNS over UDP, one A query per lookup.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpUpstreamResolver;

impl UdpUpstreamResolver {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl UpstreamResolver for UdpUpstreamResolver {
    #[instrument(skip(self))]
    async fn lookup(
        &self,
        domain: &str,
        server: SocketAddr,
        timeout: Duration,
    ) -> Result<Vec<IpAddr>, DomainError> {
        let query = MessageBuilder::build_a_query(domain)?;
        let bytes = UdpTransport::new(server).send(&query, timeout).await?;
        let answer = ResponseParser::parse(&bytes)?;

        if answer.is_server_error() {
            return Err(DomainError::Transport(format!(
                "{} answered {}",
                server,
                ResponseParser::rcode_to_status(answer.rcode)
            )));
        }
        if answer.truncated && answer.addresses.is_empty() {
            return Err(DomainError::Transport(format!(
                "{} sent a truncated response",
                server
            )));
        }
        if answer.rcode == ResponseCode::NXDomain {
            debug!(domain = %domain, "Upstream answered NXDOMAIN");
        }

        Ok(answer.addresses)
    }
}
