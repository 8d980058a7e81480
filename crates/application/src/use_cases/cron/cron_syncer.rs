use crate::ports::{CronJob, CronTable, ServiceControl};
use crate::schema::CRON_TAG;
use crate::use_cases::services::ServiceProbe;
use pref_dns_domain::{CronSchedule, DomainError};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CronSyncOutcome {
    Registered { schedule: String },
    Removed,
    Unchanged,
    SchedulerUnavailable,
}

/// Keeps the scheduler's job table in line with the schedule preference.
pub struct CronSyncer {
    table: Arc<dyn CronTable>,
    control: Arc<dyn ServiceControl>,
    probe: Arc<ServiceProbe>,
    scheduler: String,
    command: String,
}

impl CronSyncer {
    pub fn new(
        table: Arc<dyn CronTable>,
        control: Arc<dyn ServiceControl>,
        probe: Arc<ServiceProbe>,
        scheduler: impl Into<String>,
        command: impl Into<String>,
    ) -> Self {
        Self {
            table,
            control,
            probe,
            scheduler: scheduler.into(),
            command: command.into(),
        }
    }

    /// Registers (or replaces) the single tagged job when `enabled`, removes
    /// it otherwise. An invalid expression is rejected before anything is
    /// touched; a missing scheduler is reported, not raised.
    #[instrument(skip(self))]
    pub async fn sync(
        &self,
        enabled: bool,
        expression: &str,
    ) -> Result<CronSyncOutcome, DomainError> {
        let job = if enabled {
            let schedule =
                CronSchedule::parse(expression).map_err(DomainError::InvalidCronFormat)?;
            Some(CronJob::new(schedule, self.command.clone()))
        } else {
            None
        };

        let status = self.probe.probe(&self.scheduler).await;
        if !status.installed {
            warn!(scheduler = %self.scheduler, "Task scheduler not installed, skipping sync");
            return Ok(CronSyncOutcome::SchedulerUnavailable);
        }

        let changed = self.table.replace(CRON_TAG, job.as_ref()).await?;
        if !changed {
            return Ok(CronSyncOutcome::Unchanged);
        }

        if status.running {
            if let Err(e) = self.control.restart(&self.scheduler).await {
                warn!(scheduler = %self.scheduler, error = %e, "Scheduler reload failed");
            }
        }

        Ok(match job {
            Some(job) => {
                info!(schedule = %job.schedule, "Scheduled job registered");
                CronSyncOutcome::Registered {
                    schedule: job.schedule.to_string(),
                }
            }
            None => {
                info!("Scheduled job removed");
                CronSyncOutcome::Removed
            }
        })
    }

    pub async fn registered(&self) -> Result<Vec<CronJob>, DomainError> {
        self.table.jobs(CRON_TAG).await
    }
}
