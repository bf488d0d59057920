//! In-process job lock to prevent overlapping backups

use crate::error::{BackupError, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Flag shared by every entry point that starts a backup job
#[derive(Debug, Clone, Default)]
pub struct JobLock {
    busy: Arc<AtomicBool>,
}

impl JobLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for a job.
    /// Returns `BackupInProgress` if another job holds it; never waits.
    pub fn try_acquire(&self, job: &str) -> Result<JobLockGuard> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Rejected overlapping job '{}': lock held", job);
            return Err(BackupError::BackupInProgress);
        }

        info!("Acquired backup job lock for: {}", job);
        Ok(JobLockGuard {
            busy: self.busy.clone(),
            job: job.to_string(),
        })
    }

    pub fn is_locked(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the job lock on drop
#[derive(Debug)]
pub struct JobLockGuard {
    busy: Arc<AtomicBool>,
    job: String,
}

impl Drop for JobLockGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        info!("Released backup job lock for: {}", self.job);
    }
}
