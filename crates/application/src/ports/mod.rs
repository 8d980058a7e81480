mod config_store;
mod cron_table;
mod service_control;
mod upstream_resolver;

pub use config_store::{ConfigChange, ConfigStore, ConfigValue};
pub use cron_table::{CronJob, CronTable};
pub use service_control::ServiceControl;
pub use upstream_resolver::UpstreamResolver;
