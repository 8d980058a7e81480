use crate::atomic_file::write_atomic;
use async_trait::async_trait;
use pref_dns_application::ports::{CronJob, CronTable};
use pref_dns_domain::{CronSchedule, DomainError};
use std::path::PathBuf;
use tracing::{debug, warn};

/// A crontab in the classic five-field format. Owned lines carry a trailing
/// `# <tag>` marker; every other line is preserved verbatim.
pub struct CrontabFile {
    path: PathBuf,
}

impl CrontabFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn read_lines(&self) -> Result<Vec<String>, DomainError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content.lines().map(str::to_string).collect()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(DomainError::IoError(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

fn marker(tag: &str) -> String {
    format!("# {}", tag)
}

fn is_tagged(line: &str, tag: &str) -> bool {
    line.trim_end().ends_with(&marker(tag))
}

fn format_line(job: &CronJob, tag: &str) -> String {
    format!("{} {} {}", job.schedule, job.command, marker(tag))
}

fn parse_line(line: &str, tag: &str) -> Option<CronJob> {
    let body = line.trim_end().strip_suffix(&marker(tag))?.trim();
    let fields: Vec<&str> = body.split_whitespace().collect();
    if fields.len() < 6 {
        return None;
    }
    let schedule = CronSchedule::parse(&fields[..5].join(" ")).ok()?;
    Some(CronJob::new(schedule, fields[5..].join(" ")))
}

#[async_trait]
impl CronTable for CrontabFile {
    async fn jobs(&self, tag: &str) -> Result<Vec<CronJob>, DomainError> {
        Ok(self
            .read_lines()
            .await?
            .iter()
            .filter(|line| is_tagged(line, tag))
            .filter_map(|line| {
                let job = parse_line(line, tag);
                if job.is_none() {
                    warn!(line = %line, "Ignoring malformed tagged crontab line");
                }
                job
            })
            .collect())
    }

    async fn replace(&self, tag: &str, job: Option<&CronJob>) -> Result<bool, DomainError> {
        let lines = self.read_lines().await?;

        let mut updated: Vec<String> = lines
            .iter()
            .filter(|line| !is_tagged(line, tag))
            .cloned()
            .collect();
        if let Some(job) = job {
            updated.push(format_line(job, tag));
        }

        if updated == lines {
            return Ok(false);
        }

        let mut contents = updated.join("\n");
        if !contents.is_empty() {
            contents.push('\n');
        }
        write_atomic(&self.path, &contents).await?;
        debug!(path = %self.path.display(), lines = updated.len(), "Crontab rewritten");
        Ok(true)
    }
}
