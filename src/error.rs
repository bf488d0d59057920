//! Error taxonomy for backup, restore and archive operations

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BackupError {
    /// Connection URI, database name or execution-context id is missing
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The dump utility (or one of its companion steps) failed
    #[error("Backup failed at step '{step}' (exit code {}): {stderr}", display_code(.exit_code))]
    BackupExecution {
        step: &'static str,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The restore utility (or one of its companion steps) failed
    #[error("Restore failed at step '{step}' (exit code {}): {stderr}", display_code(.exit_code))]
    RestoreExecution {
        step: &'static str,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Backup archive not found: {0:?}")]
    ArchiveNotFound(PathBuf),

    #[error("Invalid archive name: {0}")]
    InvalidArchiveName(String),

    /// Another backup job holds the job lock
    #[error("A backup job is already in progress")]
    BackupInProgress,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BackupError>;

fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(c) => c.to_string(),
        None => "none".to_string(),
    }
}

impl BackupError {
    /// Exit code of the failed subprocess, if the error came from one
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            BackupError::BackupExecution { exit_code, .. }
            | BackupError::RestoreExecution { exit_code, .. } => *exit_code,
            _ => None,
        }
    }
}
