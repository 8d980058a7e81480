use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServicesConfig {
    #[serde(default = "default_init_dir")]
    pub init_dir: String,

    /// Init script name of the DNS filter.
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Init script name of the proxy-DNS subsystem.
    #[serde(default = "default_proxy")]
    pub proxy: String,

    /// Init script name of the task scheduler.
    #[serde(default = "default_scheduler")]
    pub scheduler: String,

    #[serde(default = "default_probe_timeout_ms")]
    pub probe_timeout_ms: u64,

    #[serde(default = "default_restart_timeout_secs")]
    pub restart_timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            init_dir: default_init_dir(),
            filter: default_filter(),
            proxy: default_proxy(),
            scheduler: default_scheduler(),
            probe_timeout_ms: default_probe_timeout_ms(),
            restart_timeout_secs: default_restart_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

fn default_init_dir() -> String {
    "/etc/init.d".to_string()
}

fn default_filter() -> String {
    "mosdns".to_string()
}

fn default_proxy() -> String {
    "passwall".to_string()
}

fn default_scheduler() -> String {
    "cron".to_string()
}

fn default_probe_timeout_ms() -> u64 {
    2000
}

fn default_restart_timeout_secs() -> u64 {
    30
}

fn default_poll_interval_secs() -> u64 {
    5
}
