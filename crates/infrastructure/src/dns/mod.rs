pub mod message_builder;
pub mod response_parser;
pub mod udp_transport;
mod upstream_resolver;

pub use message_builder::MessageBuilder;
pub use response_parser::{DnsAnswer, ResponseParser};
pub use udp_transport::UdpTransport;
pub use upstream_resolver::UdpUpstreamResolver;
