use pref_dns_domain::{CliOverrides, Config};
use tracing::debug;

pub fn load_config(path: Option<&str>, overrides: CliOverrides) -> anyhow::Result<Config> {
    let config = Config::load(path, overrides)?;
    config.validate()?;
    Ok(config)
}

pub fn log_config_summary(config: &Config) {
    debug!(
        store = config.store.backend.as_str(),
        init_dir = %config.services.init_dir,
        crontab = %config.cron.crontab_path,
        query_timeout_secs = config.resolver.query_timeout,
        "Configuration loaded"
    );
}
