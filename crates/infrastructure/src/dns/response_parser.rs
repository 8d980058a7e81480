use hickory_proto::op::{Message, ResponseCode};
use hickory_proto::rr::RData;
use pref_dns_domain::DomainError;
use std::net::IpAddr;
use tracing::debug;

/// Address records of one upstream answer, in wire order.
#[derive(Debug, Clone)]
pub struct DnsAnswer {
    pub addresses: Vec<IpAddr>,
    pub rcode: ResponseCode,
    pub truncated: bool,
}

impl DnsAnswer {
    pub fn is_server_error(&self) -> bool {
        matches!(
            self.rcode,
            ResponseCode::ServFail
                | ResponseCode::Refused
                | ResponseCode::NotImp
                | ResponseCode::FormErr
        )
    }
}

pub struct ResponseParser;

impl ResponseParser {
    pub fn parse(response_bytes: &[u8]) -> Result<DnsAnswer, DomainError> {
        let message = Message::from_vec(response_bytes).map_err(|e| {
            DomainError::Transport(format!("Failed to parse DNS response: {}", e))
        })?;

        let rcode = message.response_code();
        let truncated = message.truncated();

        let addresses: Vec<IpAddr> = message
            .answers()
            .iter()
            .filter_map(|record| match record.data() {
                RData::A(a) => Some(IpAddr::V4(a.0)),
                RData::AAAA(aaaa) => Some(IpAddr::V6(aaaa.0)),
                _ => None,
            })
            .collect();

        debug!(
            rcode = ?rcode,
            addresses = addresses.len(),
            truncated = truncated,
            "DNS response parsed"
        );

        Ok(DnsAnswer {
            addresses,
            rcode,
            truncated,
        })
    }

    pub fn rcode_to_status(rcode: ResponseCode) -> &'static str {
        match rcode {
            ResponseCode::NoError => "NOERROR",
            ResponseCode::NXDomain => "NXDOMAIN",
            ResponseCode::ServFail => "SERVFAIL",
            ResponseCode::Refused => "REFUSED",
            ResponseCode::NotImp => "NOTIMP",
            ResponseCode::FormErr => "FORMERR",
            _ => "UNKNOWN",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_garbage_is_transport_error() {
        let err = ResponseParser::parse(&[0x01, 0x02, 0x03]).unwrap_err();
        assert_eq!(err.kind(), "query_failed");
    }

    #[test]
    fn test_rcode_status_names() {
        assert_eq!(ResponseParser::rcode_to_status(ResponseCode::ServFail), "SERVFAIL");
        assert_eq!(ResponseParser::rcode_to_status(ResponseCode::NXDomain), "NXDOMAIN");
    }
}
