use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};
use pref_dns_domain::config::LockConfig;
use pref_dns_domain::DomainError;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// Exclusive `flock` on the lock file, held for the duration of a writing
/// action. The kernel drops it when the holder exits, so a crashed action
/// never blocks the next one. The file itself stays on disk.
pub struct ActionLock {
    path: PathBuf,
    _file: Flock<File>,
}

impl ActionLock {
    pub async fn acquire(config: &LockConfig) -> Result<Self, DomainError> {
        let path = PathBuf::from(&config.path);
        let wait = Duration::from_secs(config.wait_secs);
        let started = Instant::now();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DomainError::IoError(format!("cannot create {}: {}", parent.display(), e))
            })?;
        }

        loop {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&path)
                .map_err(|e| {
                    DomainError::IoError(format!("cannot open lock {}: {}", path.display(), e))
                })?;

            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(mut locked) => {
                    if let Err(e) = record_owner(&mut locked) {
                        warn!(path = %path.display(), error = %e, "Failed to record lock owner");
                    }
                    debug!(path = %path.display(), "Action lock acquired");
                    return Ok(Self {
                        path,
                        _file: locked,
                    });
                }
                Err((_, Errno::EWOULDBLOCK)) => {
                    if started.elapsed() >= wait {
                        return Err(DomainError::ActionInProgress);
                    }
                    tokio::time::sleep(RETRY_INTERVAL).await;
                }
                Err((_, errno)) => {
                    return Err(DomainError::IoError(format!(
                        "cannot lock {}: {}",
                        path.display(),
                        errno
                    )))
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl std::fmt::Debug for ActionLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionLock").field("path", &self.path).finish()
    }
}

fn record_owner(file: &mut File) -> std::io::Result<()> {
    file.set_len(0)?;
    writeln!(file, "{}", std::process::id())
}
