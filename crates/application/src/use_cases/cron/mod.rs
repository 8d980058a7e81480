mod cron_syncer;

pub use cron_syncer::{CronSyncOutcome, CronSyncer};
