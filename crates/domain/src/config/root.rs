use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cron::CronConfig;
use super::errors::ConfigError;
use super::lock::LockConfig;
use super::logging::LoggingConfig;
use super::resolver::ResolverConfig;
use super::services::ServicesConfig;
use super::store::{StoreBackend, StoreConfig};

const LOCAL_CONFIG_PATH: &str = "pref-dns.toml";
const SYSTEM_CONFIG_PATH: &str = "/etc/pref-dns/config.toml";

/// Runtime configuration of the pref-dns tool itself.
///
/// This is not the router's preference data; that lives in the
/// configuration store the `[store]` section points at.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Where preference, filter and proxy sections are kept
    #[serde(default)]
    pub store: StoreConfig,

    /// Service names and control timeouts
    #[serde(default)]
    pub services: ServicesConfig,

    /// Upstream query behaviour
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Scheduled re-resolution
    #[serde(default)]
    pub cron: CronConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Cross-process action lock
    #[serde(default)]
    pub lock: LockConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. pref-dns.toml in current directory
    /// 3. /etc/pref-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            if !Path::new(path).exists() {
                return Err(ConfigError::NotFound(path.to_string()));
            }
            Self::from_file(path)?
        } else if let Some(found) = Self::get_config_path() {
            Self::from_file(&found)?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        Ok(config)
    }

    pub fn from_toml_str(contents: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(origin.to_string(), e.to_string()))
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        Self::from_toml_str(&contents, path)
    }

    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(backend) = overrides.store_backend {
            self.store.backend = backend;
        }
        if let Some(dir) = overrides.store_dir {
            self.store.toml_dir = dir;
        }
        if let Some(dir) = overrides.init_dir {
            self.services.init_dir = dir;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolver.query_timeout == 0 {
            return Err(ConfigError::Validation(
                "resolver.query_timeout cannot be 0".to_string(),
            ));
        }
        if self.services.probe_timeout_ms == 0 || self.services.restart_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "service timeouts cannot be 0".to_string(),
            ));
        }
        if self.services.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "services.poll_interval_secs cannot be 0".to_string(),
            ));
        }
        for (field, value) in [
            ("services.init_dir", &self.services.init_dir),
            ("services.filter", &self.services.filter),
            ("services.proxy", &self.services.proxy),
            ("services.scheduler", &self.services.scheduler),
            ("cron.crontab_path", &self.cron.crontab_path),
            ("cron.command", &self.cron.command),
            ("lock.path", &self.lock.path),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{} cannot be empty", field)));
            }
        }
        if self.store.backend == StoreBackend::Toml && self.store.toml_dir.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store.toml_dir is required for the toml backend".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_config_path() -> Option<String> {
        if Path::new(LOCAL_CONFIG_PATH).exists() {
            Some(LOCAL_CONFIG_PATH.to_string())
        } else if Path::new(SYSTEM_CONFIG_PATH).exists() {
            Some(SYSTEM_CONFIG_PATH.to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub store_backend: Option<StoreBackend>,
    pub store_dir: Option<String>,
    pub init_dir: Option<String>,
}
