use crate::error::ClientError;
use crate::request::ActionRequest;
use crate::results::{CommitResult, ResolveResult};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::Output;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument, warn};

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Invokes the action binary. Exit status is not an error on its own:
/// failed actions still print a result the caller renders.
pub struct ActionClient {
    program: PathBuf,
    global_args: Vec<String>,
    timeout: Duration,
}

impl ActionClient {
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            global_args: Vec::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Extra flags placed before every action, e.g. `--config <file>`.
    pub fn with_global_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.global_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn argv(&self, request: &ActionRequest) -> Vec<String> {
        let mut argv = self.global_args.clone();
        argv.push("--format".to_string());
        argv.push(request.format().as_str().to_string());
        argv.extend(request.args());
        argv
    }

    async fn execute(&self, request: &ActionRequest) -> Result<Output, ClientError> {
        let argv = self.argv(request);
        debug!(program = %self.program.display(), args = ?argv, "Running action");

        let child = Command::new(&self.program)
            .args(&argv)
            .kill_on_drop(true)
            .output();

        match tokio::time::timeout(self.timeout, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) => Err(ClientError::Execution(e.to_string())),
            Err(_) => Err(ClientError::Execution(format!(
                "'{}' did not finish within {}s",
                request,
                self.timeout.as_secs()
            ))),
        }
    }

    async fn run_json<T: DeserializeOwned>(&self, request: &ActionRequest) -> Result<T, ClientError> {
        let output = self.execute(request).await?;
        serde_json::from_slice(&output.stdout).map_err(|e| {
            warn!(action = %request, error = %e, "Unreadable action result");
            ClientError::Parse(e.to_string())
        })
    }

    #[instrument(skip(self))]
    pub async fn resolve(&self, domain: &str, server: &str) -> Result<ResolveResult, ClientError> {
        self.run_json(&ActionRequest::resolve(domain, server)).await
    }

    #[instrument(skip(self))]
    pub async fn commit_and_restart(&self) -> Result<CommitResult, ClientError> {
        self.run_json(&ActionRequest::CommitAndRestart).await
    }

    /// Commit, then bring the scheduled job in line. The cron step is
    /// best-effort and never changes the commit result.
    pub async fn save_and_apply(&self, cron_enabled: bool) -> Result<CommitResult, ClientError> {
        let commit = self.commit_and_restart().await;
        if let Err(e) = self.run_text(&ActionRequest::Cron { enable: cron_enabled }).await {
            warn!(error = %e, "Scheduled job sync failed, ignoring");
        }
        commit
    }

    /// Runs a free-text action and returns its status line.
    pub async fn run_text(&self, request: &ActionRequest) -> Result<String, ClientError> {
        let output = self.execute(request).await?;
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !stdout.is_empty() {
            return Ok(stdout);
        }
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if output.status.success() {
            Ok(stderr)
        } else {
            Err(ClientError::Execution(if stderr.is_empty() {
                format!("'{}' exited with {}", request, output.status)
            } else {
                stderr
            }))
        }
    }
}
