//! Backup service - the entry point used by the scheduler and by callers
//! such as an HTTP controller or the CLI

use super::backup::BackupExecutor;
use super::restore::RestoreExecutor;
use crate::archive::catalog::{self, ArchiveEntry, ArchiveStream};
use crate::archive::retention::{self, PruneReport};
use crate::config::{
    self, Config, ConnectionProvider, EnvConnectionProvider, RetentionPolicy,
};
use crate::error::Result;
use crate::strategies::ExecutionStrategy;
use crate::utils::locker::JobLock;
use crate::utils::CommandExecutor;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{error, info};

/// Lifecycle of the most recent backup job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed,
}

/// Snapshot of the backup job state
#[derive(Debug, Clone, Default)]
pub struct JobStatus {
    pub state: JobState,
    pub trigger: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub last_archive: Option<PathBuf>,
    pub last_error: Option<String>,
}

/// Result of the scheduled handler: the new archive and the retention pass
#[derive(Debug, Clone)]
pub struct DailyRunOutcome {
    pub archive: PathBuf,
    pub prune: PruneReport,
}

pub struct BackupService {
    backup_dir: PathBuf,
    retention: RetentionPolicy,
    connection: Arc<dyn ConnectionProvider>,
    backup_executor: BackupExecutor,
    restore_executor: RestoreExecutor,
    job_lock: JobLock,
    status: Mutex<JobStatus>,
}

impl BackupService {
    /// Create new backup service
    pub fn new(
        backup_dir: impl Into<PathBuf>,
        retention: RetentionPolicy,
        connection: Arc<dyn ConnectionProvider>,
        strategy: ExecutionStrategy,
    ) -> Self {
        let strategy = Arc::new(strategy);
        let backup_executor = BackupExecutor::new(backup_dir, strategy.clone());

        Self {
            backup_dir: backup_executor.backup_dir().to_path_buf(),
            retention,
            connection,
            backup_executor,
            restore_executor: RestoreExecutor::new(strategy),
            job_lock: JobLock::new(),
            status: Mutex::new(JobStatus::default()),
        }
    }

    /// Build the service from a loaded configuration
    pub fn from_config(config: &Config, executor: Arc<dyn CommandExecutor>) -> Self {
        let strategy =
            ExecutionStrategy::from_config(config.database.strategy, &config.tools, executor);

        Self::new(
            config::backup_directory(&config.global),
            config::retention_policy(&config.global),
            Arc::new(EnvConnectionProvider::new(config.database.clone())),
            strategy,
        )
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn retention(&self) -> RetentionPolicy {
        self.retention
    }

    /// Create a backup on demand and return its path
    pub async fn create_manual_backup(&self) -> Result<PathBuf> {
        self.run_backup_job("manual").await
    }

    /// Scheduled handler: create a backup, then prune expired archives.
    /// Pruning only runs when the backup succeeded.
    pub async fn handle_daily_backup(&self) -> Result<DailyRunOutcome> {
        let archive = self.run_backup_job("scheduled").await?;
        info!("Database backup saved to: {:?}", archive);

        let prune = retention::prune(&self.backup_dir, &self.retention).await?;
        info!("Daily backup completed at {}", Utc::now().to_rfc3339());

        Ok(DailyRunOutcome { archive, prune })
    }

    /// Archive file names, newest first
    pub async fn list_backups(&self) -> Result<Vec<String>> {
        catalog::list(&self.backup_dir).await
    }

    /// Archives with size and modification time, newest first
    pub async fn list_backup_entries(&self) -> Result<Vec<ArchiveEntry>> {
        catalog::list_archives(&self.backup_dir).await
    }

    /// Replace the datastore contents with the archive at `path`
    pub async fn restore_backup(&self, path: &Path) -> Result<()> {
        let conn = self.connection.connection();
        self.restore_executor.restore(path, &conn).await
    }

    /// Open an existing archive by file name for download
    pub async fn open_archive(&self, file_name: &str) -> Result<ArchiveStream> {
        let path = catalog::resolve_archive(&self.backup_dir, file_name).await?;
        catalog::open_path(&path).await
    }

    /// Create a fresh backup and open exactly that archive for download
    pub async fn download_latest(&self) -> Result<ArchiveStream> {
        let path = self.create_manual_backup().await?;
        catalog::open_path(&path).await
    }

    /// Run the retention pass on demand
    pub async fn prune_now(&self) -> Result<PruneReport> {
        retention::prune(&self.backup_dir, &self.retention).await
    }

    pub fn job_status(&self) -> JobStatus {
        self.status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn run_backup_job(&self, trigger: &str) -> Result<PathBuf> {
        let _guard = self.job_lock.try_acquire(trigger)?;

        self.update_status(|status| {
            *status = JobStatus {
                state: JobState::Running,
                trigger: Some(trigger.to_string()),
                started_at: Some(Utc::now()),
                ..JobStatus::default()
            };
        });

        let mut running = RunningJob {
            status: &self.status,
            settled: false,
        };

        let conn = self.connection.connection();
        let result = self.backup_executor.create_backup(&conn).await;

        running.settled = true;
        self.update_status(|status| {
            status.finished_at = Some(Utc::now());
            match &result {
                Ok(path) => {
                    status.state = JobState::Succeeded;
                    status.last_archive = Some(path.clone());
                }
                Err(e) => {
                    status.state = JobState::Failed;
                    status.last_error = Some(e.to_string());
                }
            }
        });

        if let Err(e) = &result {
            error!("{} backup failed: {}", trigger, e);
        }

        result
    }

    fn update_status(&self, f: impl FnOnce(&mut JobStatus)) {
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut status);
    }
}

/// Marks the job failed if it is dropped before the outcome was recorded,
/// which happens when the job panics or its task is cancelled.
struct RunningJob<'a> {
    status: &'a Mutex<JobStatus>,
    settled: bool,
}

impl Drop for RunningJob<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let mut status = self
            .status
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        status.state = JobState::Failed;
        status.finished_at = Some(Utc::now());
        status.last_error = Some("backup job aborted before completion".to_string());
        error!("{} backup aborted before completion", status.trigger.as_deref().unwrap_or("unknown"));
    }
}
