mod crontab_file;
mod initd_service_control;

pub use crontab_file::CrontabFile;
pub use initd_service_control::InitdServiceControl;
