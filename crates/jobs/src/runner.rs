use crate::StatusPollJob;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub trait SpawnableJob: Send + Sync + 'static {
    fn with_cancellation(self, token: CancellationToken) -> Self;
    fn start_job(self: Arc<Self>) -> bool;
}

macro_rules! impl_spawnable_job {
    ($t:ty) => {
        impl SpawnableJob for $t {
            fn with_cancellation(self, token: CancellationToken) -> Self {
                self.with_cancellation(token)
            }

            fn start_job(self: Arc<Self>) -> bool {
                self.start()
            }
        }
    };
}

impl_spawnable_job!(StatusPollJob);

fn spawn_job<J: SpawnableJob>(job: Option<J>, shutdown: &Option<CancellationToken>) -> bool {
    match job {
        Some(job) => {
            let job = match shutdown {
                Some(token) => job.with_cancellation(token.clone()),
                None => job,
            };
            Arc::new(job).start_job()
        }
        None => false,
    }
}

/// Starts the configured background jobs. Subscribe to a job's channel
/// before handing it over.
pub struct JobRunner {
    status_poll: Option<StatusPollJob>,
    shutdown: Option<CancellationToken>,
}

impl JobRunner {
    pub fn new() -> Self {
        Self {
            status_poll: None,
            shutdown: None,
        }
    }

    pub fn with_status_poll(mut self, job: StatusPollJob) -> Self {
        self.status_poll = Some(job);
        self
    }

    pub fn with_shutdown_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = Some(token);
        self
    }

    /// Returns the number of jobs spawned.
    pub async fn start(self) -> usize {
        info!("Starting background job runner");

        let started = [spawn_job(self.status_poll, &self.shutdown)]
            .into_iter()
            .filter(|s| *s)
            .count();

        info!(jobs = started, "All background jobs started");
        started
    }
}

impl Default for JobRunner {
    fn default() -> Self {
        Self::new()
    }
}
