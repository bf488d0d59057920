//! Restore executor - replaces the datastore contents from an archive

use super::backup::validate_connection;
use crate::config::DatastoreConnectionConfig;
use crate::error::{BackupError, Result};
use crate::strategies::ExecutionStrategy;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tracing::{info, warn};

pub struct RestoreExecutor {
    strategy: Arc<ExecutionStrategy>,
}

impl RestoreExecutor {
    pub fn new(strategy: Arc<ExecutionStrategy>) -> Self {
        Self { strategy }
    }

    /// Restore `archive_path` into the datastore. Single attempt, no retry.
    ///
    /// The archive is checked before anything else: a missing archive fails with
    /// `ArchiveNotFound` and no subprocess is started.
    pub async fn restore(&self, archive_path: &Path, conn: &DatastoreConnectionConfig) -> Result<()> {
        match fs::metadata(archive_path).await {
            Ok(m) if m.is_file() => {}
            _ => return Err(BackupError::ArchiveNotFound(archive_path.to_path_buf())),
        }

        validate_connection(conn)?;
        self.strategy.validate(conn)?;

        warn!(
            "Restoring '{}' from {:?}: existing data will be dropped",
            conn.db_name, archive_path
        );
        let start_time = Instant::now();

        self.strategy.restore(conn, archive_path).await?;

        info!(
            "Restore of '{}' from {:?} completed in {:.2}s",
            conn.db_name,
            archive_path,
            start_time.elapsed().as_secs_f64()
        );
        Ok(())
    }
}
