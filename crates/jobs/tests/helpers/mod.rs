#![allow(dead_code)]

use async_trait::async_trait;
use pref_dns_application::ports::ServiceControl;
use pref_dns_domain::DomainError;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

#[derive(Default)]
pub struct MockServiceControl {
    installed: RwLock<HashSet<String>>,
    running: RwLock<HashSet<String>>,
    check_delay: RwLock<Option<Duration>>,
    checks: AtomicU64,
}

impl MockServiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, name: &str, running: bool) {
        self.installed.write().unwrap().insert(name.to_string());
        if running {
            self.running.write().unwrap().insert(name.to_string());
        } else {
            self.running.write().unwrap().remove(name);
        }
    }

    pub fn delay_running_check(&self, delay: Duration) {
        *self.check_delay.write().unwrap() = Some(delay);
    }

    pub fn check_count(&self) -> u64 {
        self.checks.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ServiceControl for MockServiceControl {
    async fn is_installed(&self, name: &str) -> bool {
        self.installed.read().unwrap().contains(name)
    }

    async fn is_running(&self, name: &str) -> Result<bool, DomainError> {
        self.checks.fetch_add(1, Ordering::Relaxed);
        let delay = *self.check_delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.running.read().unwrap().contains(name))
    }

    async fn restart(&self, _name: &str) -> Result<(), DomainError> {
        Ok(())
    }
}
