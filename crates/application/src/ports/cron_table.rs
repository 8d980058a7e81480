use async_trait::async_trait;
use pref_dns_domain::{CronSchedule, DomainError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronJob {
    pub schedule: CronSchedule,
    pub command: String,
}

impl CronJob {
    pub fn new(schedule: CronSchedule, command: impl Into<String>) -> Self {
        Self {
            schedule,
            command: command.into(),
        }
    }
}

/// The task scheduler's job table. Jobs are grouped by an owner tag.
#[async_trait]
pub trait CronTable: Send + Sync {
    async fn jobs(&self, tag: &str) -> Result<Vec<CronJob>, DomainError>;

    /// Replaces every job tagged `tag` with `job`, or removes them when
    /// `job` is `None`, in one write. Returns whether the table changed.
    async fn replace(&self, tag: &str, job: Option<&CronJob>) -> Result<bool, DomainError>;
}
