use pref_dns_domain::DomainError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Replaces `path` with `contents` through a sibling temp file and a rename,
/// so readers see either the old or the new file. An existing target keeps
/// its permissions.
pub(crate) async fn write_atomic(path: &Path, contents: &str) -> Result<(), DomainError> {
    let target: PathBuf = path.to_path_buf();
    let contents = contents.to_string();
    match tokio::task::spawn_blocking(move || write_atomic_blocking(&target, &contents)).await {
        Ok(result) => result,
        Err(e) => Err(DomainError::IoError(format!(
            "Write of {} did not complete: {}",
            path.display(),
            e
        ))),
    }
}

fn write_atomic_blocking(path: &Path, contents: &str) -> Result<(), DomainError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        DomainError::IoError(format!("Failed to create {}: {}", dir.display(), e))
    })?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        DomainError::IoError(format!("Failed to create temp file in {}: {}", dir.display(), e))
    })?;

    match std::fs::metadata(path) {
        Ok(existing) => {
            tmp.as_file()
                .set_permissions(existing.permissions())
                .map_err(|e| {
                    DomainError::IoError(format!(
                        "Failed to copy permissions of {}: {}",
                        path.display(),
                        e
                    ))
                })?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(DomainError::IoError(format!(
                "Failed to stat {}: {}",
                path.display(),
                e
            )))
        }
    }

    tmp.write_all(contents.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| DomainError::IoError(format!("Failed to write {}: {}", path.display(), e)))?;
    tmp.persist(path).map_err(|e| {
        DomainError::IoError(format!("Failed to replace {}: {}", path.display(), e.error))
    })?;
    Ok(())
}
