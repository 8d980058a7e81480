use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Seconds to wait for the upstream answer.
    #[serde(default = "default_query_timeout")]
    pub query_timeout: u64,

    #[serde(default = "default_port")]
    pub default_port: u16,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            query_timeout: default_query_timeout(),
            default_port: default_port(),
        }
    }
}

fn default_query_timeout() -> u64 {
    5
}

fn default_port() -> u16 {
    crate::hostname::DEFAULT_DNS_PORT
}
