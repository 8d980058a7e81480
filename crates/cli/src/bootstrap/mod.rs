mod config;
mod lock;
mod logging;

pub use config::{load_config, log_config_summary};
pub use lock::ActionLock;
pub use logging::init_logging;
