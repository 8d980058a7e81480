use async_trait::async_trait;
use pref_dns_application::ports::{
    ConfigChange, ConfigStore, ConfigValue, CronJob, CronTable, ServiceControl, UpstreamResolver,
};
use pref_dns_domain::DomainError;
use std::collections::{HashMap, HashSet};
use std::net::{IpAddr, SocketAddr};
use std::sync::{Arc, RwLock};
use std::time::Duration;

type Options = HashMap<(String, String), ConfigValue>;

#[derive(Default)]
struct StoreState {
    packages: HashMap<String, Options>,
    sections: HashSet<(String, String)>,
    commits: Vec<String>,
    applies: usize,
}

/// In-memory config store. `apply` is all-or-nothing.
#[derive(Clone, Default)]
pub struct MockConfigStore {
    state: Arc<RwLock<StoreState>>,
    fail_apply: Arc<RwLock<Option<String>>>,
    fail_get: Arc<RwLock<HashMap<String, String>>>,
}

impl MockConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packages(packages: &[&str]) -> Self {
        let store = Self::new();
        for package in packages {
            store.add_package(package);
        }
        store
    }

    pub fn add_package(&self, package: &str) {
        self.state
            .write()
            .unwrap()
            .packages
            .entry(package.to_string())
            .or_default();
    }

    pub fn remove_package(&self, package: &str) {
        self.state.write().unwrap().packages.remove(package);
    }

    pub fn put(&self, package: &str, section: &str, option: &str, value: &str) {
        self.state
            .write()
            .unwrap()
            .packages
            .entry(package.to_string())
            .or_default()
            .insert(
                (section.to_string(), option.to_string()),
                ConfigValue::Single(value.to_string()),
            );
    }

    pub fn put_list(&self, package: &str, section: &str, option: &str, values: &[&str]) {
        self.state
            .write()
            .unwrap()
            .packages
            .entry(package.to_string())
            .or_default()
            .insert(
                (section.to_string(), option.to_string()),
                ConfigValue::List(values.iter().map(|v| v.to_string()).collect()),
            );
    }

    pub fn value(&self, package: &str, section: &str, option: &str) -> Option<ConfigValue> {
        self.state
            .read()
            .unwrap()
            .packages
            .get(package)
            .and_then(|p| p.get(&(section.to_string(), option.to_string())))
            .cloned()
    }

    pub fn single(&self, package: &str, section: &str, option: &str) -> Option<String> {
        self.value(package, section, option)
            .and_then(|v| v.as_single().map(str::to_string))
    }

    pub fn list(&self, package: &str, section: &str, option: &str) -> Vec<String> {
        self.value(package, section, option)
            .map(ConfigValue::into_list)
            .unwrap_or_default()
    }

    pub fn commits(&self) -> Vec<String> {
        self.state.read().unwrap().commits.clone()
    }

    pub fn apply_count(&self) -> usize {
        self.state.read().unwrap().applies
    }

    pub fn fail_apply_with(&self, detail: &str) {
        *self.fail_apply.write().unwrap() = Some(detail.to_string());
    }

    /// Reads of `option` in any package fail with `detail`.
    pub fn fail_get_with(&self, option: &str, detail: &str) {
        self.fail_get
            .write()
            .unwrap()
            .insert(option.to_string(), detail.to_string());
    }
}

#[async_trait]
impl ConfigStore for MockConfigStore {
    async fn package_exists(&self, package: &str) -> Result<bool, DomainError> {
        Ok(self.state.read().unwrap().packages.contains_key(package))
    }

    async fn get(
        &self,
        package: &str,
        section: &str,
        option: &str,
    ) -> Result<Option<ConfigValue>, DomainError> {
        if let Some(detail) = self.fail_get.read().unwrap().get(option) {
            return Err(DomainError::ConfigStore(detail.clone()));
        }
        Ok(self.value(package, section, option))
    }

    async fn apply(&self, package: &str, changes: &[ConfigChange]) -> Result<(), DomainError> {
        if let Some(detail) = self.fail_apply.read().unwrap().clone() {
            return Err(DomainError::ConfigStore(detail));
        }

        let mut state = self.state.write().unwrap();
        let creates = changes
            .iter()
            .any(|c| matches!(c, ConfigChange::EnsureSection { .. }));
        if !state.packages.contains_key(package) && !creates {
            return Err(DomainError::ConfigStore(format!(
                "package '{}' not found",
                package
            )));
        }

        let mut options = state.packages.get(package).cloned().unwrap_or_default();
        let mut sections = Vec::new();
        for change in changes {
            match change {
                ConfigChange::EnsureSection { section, .. } => {
                    sections.push((package.to_string(), section.clone()));
                }
                ConfigChange::Set {
                    section,
                    option,
                    value,
                } => {
                    let key = (section.clone(), option.clone());
                    match value {
                        ConfigValue::List(items) if items.is_empty() => {
                            options.remove(&key);
                        }
                        _ => {
                            options.insert(key, value.clone());
                        }
                    }
                }
                ConfigChange::Delete { section, option } => {
                    options.remove(&(section.clone(), option.clone()));
                }
            }
        }

        state.packages.insert(package.to_string(), options);
        state.sections.extend(sections);
        state.applies += 1;
        Ok(())
    }

    async fn commit(&self, package: &str) -> Result<(), DomainError> {
        self.state.write().unwrap().commits.push(package.to_string());
        Ok(())
    }
}

#[derive(Default)]
struct ControlState {
    installed: HashSet<String>,
    running: HashSet<String>,
    failing_restarts: HashMap<String, String>,
    failing_checks: HashSet<String>,
    restarts: Vec<String>,
    check_delay: Option<Duration>,
    restart_delay: Option<Duration>,
}

/// Scripted init-system stand-in.
#[derive(Clone, Default)]
pub struct MockServiceControl {
    state: Arc<RwLock<ControlState>>,
}

impl MockServiceControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn install(&self, name: &str, running: bool) {
        let mut state = self.state.write().unwrap();
        state.installed.insert(name.to_string());
        if running {
            state.running.insert(name.to_string());
        } else {
            state.running.remove(name);
        }
    }

    pub fn uninstall(&self, name: &str) {
        let mut state = self.state.write().unwrap();
        state.installed.remove(name);
        state.running.remove(name);
    }

    pub fn fail_restart(&self, name: &str, detail: &str) {
        self.state
            .write()
            .unwrap()
            .failing_restarts
            .insert(name.to_string(), detail.to_string());
    }

    pub fn fail_running_check(&self, name: &str) {
        self.state
            .write()
            .unwrap()
            .failing_checks
            .insert(name.to_string());
    }

    pub fn delay_running_check(&self, delay: Duration) {
        self.state.write().unwrap().check_delay = Some(delay);
    }

    pub fn delay_restart(&self, delay: Duration) {
        self.state.write().unwrap().restart_delay = Some(delay);
    }

    pub fn restarts(&self) -> Vec<String> {
        self.state.read().unwrap().restarts.clone()
    }

    pub fn restart_count(&self, name: &str) -> usize {
        self.restarts().iter().filter(|n| n.as_str() == name).count()
    }
}

#[async_trait]
impl ServiceControl for MockServiceControl {
    async fn is_installed(&self, name: &str) -> bool {
        self.state.read().unwrap().installed.contains(name)
    }

    async fn is_running(&self, name: &str) -> Result<bool, DomainError> {
        let delay = self.state.read().unwrap().check_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let state = self.state.read().unwrap();
        if state.failing_checks.contains(name) {
            return Err(DomainError::IoError(format!("{} status check failed", name)));
        }
        Ok(state.running.contains(name))
    }

    async fn restart(&self, name: &str) -> Result<(), DomainError> {
        let delay = self.state.read().unwrap().restart_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state.write().unwrap();
        if let Some(detail) = state.failing_restarts.get(name).cloned() {
            return Err(DomainError::IoError(detail));
        }
        state.restarts.push(name.to_string());
        Ok(())
    }
}

/// Upstream resolver answering from a script, keyed by domain.
#[derive(Clone, Default)]
pub struct MockUpstreamResolver {
    answers: Arc<RwLock<HashMap<String, Result<Vec<IpAddr>, DomainError>>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    queries: Arc<RwLock<Vec<(String, SocketAddr)>>>,
}

impl MockUpstreamResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self, domain: &str, ips: &[&str]) {
        let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        self.answers
            .write()
            .unwrap()
            .insert(domain.to_string(), Ok(ips));
    }

    pub fn fail(&self, domain: &str, error: DomainError) {
        self.answers
            .write()
            .unwrap()
            .insert(domain.to_string(), Err(error));
    }

    pub fn delay(&self, delay: Duration) {
        *self.delay.write().unwrap() = Some(delay);
    }

    pub fn queries(&self) -> Vec<(String, SocketAddr)> {
        self.queries.read().unwrap().clone()
    }
}

#[async_trait]
impl UpstreamResolver for MockUpstreamResolver {
    async fn lookup(
        &self,
        domain: &str,
        server: SocketAddr,
        _timeout: Duration,
    ) -> Result<Vec<IpAddr>, DomainError> {
        self.queries
            .write()
            .unwrap()
            .push((domain.to_string(), server));

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.answers
            .read()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// In-memory scheduler table.
#[derive(Clone, Default)]
pub struct MockCronTable {
    jobs: Arc<RwLock<Vec<(String, CronJob)>>>,
}

impl MockCronTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all_jobs(&self) -> Vec<(String, CronJob)> {
        self.jobs.read().unwrap().clone()
    }

    pub fn insert_raw(&self, tag: &str, job: CronJob) {
        self.jobs.write().unwrap().push((tag.to_string(), job));
    }
}

#[async_trait]
impl CronTable for MockCronTable {
    async fn jobs(&self, tag: &str) -> Result<Vec<CronJob>, DomainError> {
        Ok(self
            .jobs
            .read()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, job)| job.clone())
            .collect())
    }

    async fn replace(&self, tag: &str, job: Option<&CronJob>) -> Result<bool, DomainError> {
        let mut jobs = self.jobs.write().unwrap();
        let before: Vec<CronJob> = jobs
            .iter()
            .filter(|(t, _)| t == tag)
            .map(|(_, j)| j.clone())
            .collect();
        let after: Vec<CronJob> = job.cloned().into_iter().collect();
        if before == after {
            return Ok(false);
        }
        jobs.retain(|(t, _)| t != tag);
        if let Some(job) = job {
            jobs.push((tag.to_string(), job.clone()));
        }
        Ok(true)
    }
}
