use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CronConfig {
    #[serde(default = "default_crontab_path")]
    pub crontab_path: String,

    /// Command the scheduled job runs.
    #[serde(default = "default_command")]
    pub command: String,
}

impl Default for CronConfig {
    fn default() -> Self {
        Self {
            crontab_path: default_crontab_path(),
            command: default_command(),
        }
    }
}

fn default_crontab_path() -> String {
    "/etc/crontabs/root".to_string()
}

fn default_command() -> String {
    "/usr/bin/pref-dns update".to_string()
}
