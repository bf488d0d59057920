//! Backup executor - produces one new archive per call

use crate::archive::naming::archive_file_name;
use crate::config::DatastoreConnectionConfig;
use crate::error::{BackupError, Result};
use crate::strategies::ExecutionStrategy;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::fs;
use tracing::{debug, info};

pub struct BackupExecutor {
    backup_dir: PathBuf,
    strategy: Arc<ExecutionStrategy>,
}

impl BackupExecutor {
    /// Create new backup executor writing into `backup_dir`
    pub fn new(backup_dir: impl Into<PathBuf>, strategy: Arc<ExecutionStrategy>) -> Self {
        Self {
            backup_dir: absolutize(backup_dir.into()),
            strategy,
        }
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Dump the datastore into a new archive and return its absolute host path
    pub async fn create_backup(&self, conn: &DatastoreConnectionConfig) -> Result<PathBuf> {
        validate_connection(conn)?;
        self.strategy.validate(conn)?;

        let start_time = Instant::now();

        if fs::metadata(&self.backup_dir).await.is_err() {
            debug!("Creating backup directory: {:?}", self.backup_dir);
        }
        fs::create_dir_all(&self.backup_dir).await?;

        let archive_path = self.next_archive_path(&conn.db_name).await;

        info!(
            "Starting {} backup of '{}' to {:?}",
            self.strategy.kind(),
            conn.db_name,
            archive_path
        );

        self.strategy.dump(conn, &archive_path).await?;
        let size = verify_archive(&archive_path).await?;

        info!(
            "Backup of '{}' saved to {:?} ({} bytes) in {:.2}s",
            conn.db_name,
            archive_path,
            size,
            start_time.elapsed().as_secs_f64()
        );

        Ok(archive_path)
    }

    /// First free archive path. Names have millisecond resolution, so a
    /// back-to-back run waits for the next millisecond instead of overwriting.
    async fn next_archive_path(&self, db_name: &str) -> PathBuf {
        loop {
            let path = self.backup_dir.join(archive_file_name(db_name, Utc::now()));
            if fs::metadata(&path).await.is_err() {
                return path;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    }
}

/// URI and database name must be present; the name must be usable in a file name
pub fn validate_connection(conn: &DatastoreConnectionConfig) -> Result<()> {
    if conn.uri.trim().is_empty() {
        return Err(BackupError::Configuration(
            "database connection URI is missing".to_string(),
        ));
    }
    if conn.db_name.trim().is_empty() {
        return Err(BackupError::Configuration(
            "database name is missing".to_string(),
        ));
    }
    if conn.db_name.contains(['/', '\\', '\0']) {
        return Err(BackupError::Configuration(format!(
            "database name contains a path separator: {}",
            conn.db_name
        )));
    }
    Ok(())
}

/// The dump step must have left a non-empty file on the host
async fn verify_archive(path: &Path) -> Result<u64> {
    match fs::metadata(path).await {
        Ok(m) if m.is_file() && m.len() > 0 => Ok(m.len()),
        Ok(_) => Err(BackupError::BackupExecution {
            step: "verify",
            exit_code: None,
            stderr: format!("archive {:?} is empty", path),
        }),
        Err(e) => Err(BackupError::BackupExecution {
            step: "verify",
            exit_code: None,
            stderr: format!("archive {:?} was not produced: {}", path, e),
        }),
    }
}

fn absolutize(path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        return path;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(path),
        Err(_) => path,
    }
}
