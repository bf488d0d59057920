//! Retention: delete archives older than the configured window

use crate::config::RetentionPolicy;
use crate::error::Result;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tracing::{debug, info, warn};

/// A file that should have been pruned but could not be
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of one prune run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: Vec<PathBuf>,
    pub kept: usize,
    pub warnings: Vec<PruneWarning>,
}

/// Delete every regular file in `dir` whose modification time is older than
/// `now - policy.window`.
///
/// Only files present when the scan starts are considered. A failed deletion is
/// logged and recorded in the report; the remaining files are still processed.
pub async fn prune(dir: &Path, policy: &RetentionPolicy) -> Result<PruneReport> {
    prune_at(dir, policy, SystemTime::now()).await
}

/// [`prune`] against an explicit clock
pub async fn prune_at(dir: &Path, policy: &RetentionPolicy, now: SystemTime) -> Result<PruneReport> {
    let mut report = PruneReport::default();

    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!("Backup directory {:?} does not exist, nothing to prune", dir);
            return Ok(report);
        }
        Err(e) => return Err(e.into()),
    };

    let cutoff = now.checked_sub(policy.window).unwrap_or(SystemTime::UNIX_EPOCH);

    let mut candidates = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        candidates.push(entry.path());
    }

    for path in candidates {
        let modified = match fs::metadata(&path).await {
            Ok(m) if m.is_file() => m.modified(),
            Ok(_) => {
                debug!("Skipping non-file entry: {:?}", path);
                continue;
            }
            Err(e) => Err(e),
        };

        let modified = match modified {
            Ok(t) => t,
            Err(e) => {
                record_warning(&mut report, path, e.to_string());
                continue;
            }
        };

        if modified >= cutoff {
            report.kept += 1;
            continue;
        }

        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Removed expired backup: {:?}", path);
                report.deleted.push(path);
            }
            Err(e) => record_warning(&mut report, path, e.to_string()),
        }
    }

    info!(
        "Retention pass on {:?}: {} deleted, {} kept, {} warnings",
        dir,
        report.deleted.len(),
        report.kept,
        report.warnings.len()
    );

    Ok(report)
}

fn record_warning(report: &mut PruneReport, path: PathBuf, message: String) {
    warn!("Failed to prune {:?}: {}", path, message);
    report.warnings.push(PruneWarning { path, message });
}
