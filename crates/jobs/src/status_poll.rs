use pref_dns_application::use_cases::engine::reports::StatusReport;
use pref_dns_application::use_cases::ServiceProbe;
use pref_dns_domain::{ServiceNames, ServiceRole};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

const POLLED_ROLES: [ServiceRole; 3] = [
    ServiceRole::Filter,
    ServiceRole::Proxy,
    ServiceRole::Scheduler,
];

/// Periodically probes the three services and publishes each snapshot on a
/// watch channel. A job instance polls at most once: later `start` calls
/// are ignored.
pub struct StatusPollJob {
    probe: Arc<ServiceProbe>,
    names: ServiceNames,
    interval: Duration,
    started: AtomicBool,
    ticks: AtomicU64,
    snapshots: watch::Sender<Option<StatusReport>>,
    shutdown: CancellationToken,
}

impl StatusPollJob {
    pub fn new(probe: Arc<ServiceProbe>, names: ServiceNames) -> Self {
        let (snapshots, _) = watch::channel(None);
        Self {
            probe,
            names,
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            started: AtomicBool::new(false),
            ticks: AtomicU64::new(0),
            snapshots,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    /// Receives the latest snapshot; `None` until the first tick completes.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusReport>> {
        self.snapshots.subscribe()
    }

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    /// Completed poll ticks so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Probes every service once and publishes the result.
    pub async fn poll_once(&self) -> StatusReport {
        let services = self
            .probe
            .probe_roles(&self.names, &POLLED_ROLES)
            .await
            .into_iter()
            .collect();
        let report = StatusReport { services };
        self.ticks.fetch_add(1, Ordering::Relaxed);
        self.snapshots.send_replace(Some(report.clone()));
        report
    }

    /// Spawns the poll loop. Returns false when this job was already started.
    pub fn start(self: Arc<Self>) -> bool {
        if self.started.swap(true, Ordering::AcqRel) {
            warn!("StatusPollJob already started, ignoring");
            return false;
        }

        info!(
            interval_ms = self.interval.as_millis() as u64,
            "Starting status poll job"
        );

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("StatusPollJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let report = self.poll_once().await;
                        debug!(status = %report.status_line(), "Service status polled");
                    }
                }
            }
        });
        true
    }
}
