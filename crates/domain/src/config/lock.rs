use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LockConfig {
    #[serde(default = "default_path")]
    pub path: String,

    /// How long a writing action waits for the holder before giving up.
    #[serde(default = "default_wait_secs")]
    pub wait_secs: u64,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            wait_secs: default_wait_secs(),
        }
    }
}

fn default_path() -> String {
    "/var/lock/pref-dns.lock".to_string()
}

fn default_wait_secs() -> u64 {
    10
}
