pub mod cron;
pub mod errors;
pub mod lock;
pub mod logging;
pub mod resolver;
pub mod root;
pub mod services;
pub mod store;

pub use cron::CronConfig;
pub use errors::ConfigError;
pub use lock::LockConfig;
pub use logging::LoggingConfig;
pub use resolver::ResolverConfig;
pub use root::{CliOverrides, Config};
pub use services::ServicesConfig;
pub use store::{StoreBackend, StoreConfig};
