use async_trait::async_trait;
use pref_dns_application::ports::ServiceControl;
use pref_dns_domain::DomainError;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Services managed through `<init_dir>/<name>` scripts.
pub struct InitdServiceControl {
    init_dir: PathBuf,
}

impl InitdServiceControl {
    pub fn new(init_dir: impl Into<PathBuf>) -> Self {
        Self {
            init_dir: init_dir.into(),
        }
    }

    fn script(&self, name: &str) -> Option<PathBuf> {
        let safe = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && name != "."
            && name != "..";
        safe.then(|| self.init_dir.join(name))
    }

    async fn run(script: &Path, verb: &str) -> Result<std::process::Output, DomainError> {
        Command::new(script)
            .arg(verb)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                DomainError::IoError(format!("Failed to run {} {}: {}", script.display(), verb, e))
            })
    }
}

#[async_trait]
impl ServiceControl for InitdServiceControl {
    async fn is_installed(&self, name: &str) -> bool {
        match self.script(name) {
            Some(script) => tokio::fs::metadata(&script)
                .await
                .map(|m| m.is_file())
                .unwrap_or(false),
            None => false,
        }
    }

    async fn is_running(&self, name: &str) -> Result<bool, DomainError> {
        let script = self
            .script(name)
            .ok_or_else(|| DomainError::ServiceNotInstalled(name.to_string()))?;
        let output = Self::run(&script, "running").await?;
        debug!(service = %name, status = ?output.status.code(), "Running check finished");
        Ok(output.status.success())
    }

    #[instrument(skip(self))]
    async fn restart(&self, name: &str) -> Result<(), DomainError> {
        let script = self
            .script(name)
            .ok_or_else(|| DomainError::ServiceNotInstalled(name.to_string()))?;
        let output = Self::run(&script, "restart").await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DomainError::IoError(format!(
                "{} restart failed ({}): {}",
                name,
                output.status,
                stderr.trim()
            )));
        }
        Ok(())
    }
}
