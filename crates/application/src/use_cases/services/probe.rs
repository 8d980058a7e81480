use crate::ports::ServiceControl;
use futures::future::join_all;
use pref_dns_domain::{ServiceNames, ServiceRole, ServiceStatus};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Reports install/running state of a service. Never fails: a running
/// check that errors or overruns its timeout counts as "not running".
pub struct ServiceProbe {
    control: Arc<dyn ServiceControl>,
    timeout: Duration,
}

impl ServiceProbe {
    pub fn new(control: Arc<dyn ServiceControl>, timeout: Duration) -> Self {
        Self { control, timeout }
    }

    pub async fn probe(&self, name: &str) -> ServiceStatus {
        if !self.control.is_installed(name).await {
            return ServiceStatus::not_installed();
        }

        let running = match tokio::time::timeout(self.timeout, self.control.is_running(name)).await
        {
            Ok(Ok(running)) => running,
            Ok(Err(e)) => {
                debug!(service = %name, error = %e, "Running check failed, treating as stopped");
                false
            }
            Err(_) => {
                debug!(
                    service = %name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Running check timed out, treating as stopped"
                );
                false
            }
        };

        ServiceStatus {
            installed: true,
            running,
        }
    }

    /// Probes every role concurrently.
    pub async fn probe_roles(
        &self,
        names: &ServiceNames,
        roles: &[ServiceRole],
    ) -> Vec<(ServiceRole, ServiceStatus)> {
        let probes = roles.iter().map(|role| async move {
            let status = self.probe(names.name(*role)).await;
            (*role, status)
        });
        join_all(probes).await
    }
}
