//! Execution strategies for the dump and restore utilities
//!
//! The strategy is a closed choice made once from configuration:
//! - `Direct`: utilities run on the host and reach the datastore over the network
//! - `Containerized`: utilities run inside a managed container, with `cp` steps
//!   moving archives between the container and the host

pub mod containerized;
pub mod direct;

pub use containerized::ContainerizedStrategy;
pub use direct::DirectStrategy;

use crate::config::{DatastoreConnectionConfig, StrategyKind, ToolsConfig};
use crate::error::{BackupError, Result};
use crate::utils::{CommandExecutor, CommandOutput};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

/// Strategy selected at construction time
pub enum ExecutionStrategy {
    Direct(DirectStrategy),
    Containerized(ContainerizedStrategy),
}

impl ExecutionStrategy {
    pub fn from_config(
        kind: StrategyKind,
        tools: &ToolsConfig,
        executor: Arc<dyn CommandExecutor>,
    ) -> Self {
        match kind {
            StrategyKind::Direct => Self::Direct(DirectStrategy::new(tools, executor)),
            StrategyKind::Containerized => {
                Self::Containerized(ContainerizedStrategy::new(tools, executor))
            }
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Direct(_) => StrategyKind::Direct,
            Self::Containerized(_) => StrategyKind::Containerized,
        }
    }

    /// Check connection settings this strategy needs beyond URI and name
    pub fn validate(&self, conn: &DatastoreConnectionConfig) -> Result<()> {
        match self {
            Self::Direct(_) => Ok(()),
            Self::Containerized(s) => s.context(conn).map(|_| ()),
        }
    }

    /// Produce a gzip archive of the datastore at `archive_path` on the host
    pub async fn dump(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        match self {
            Self::Direct(s) => s.dump(conn, archive_path).await,
            Self::Containerized(s) => s.dump(conn, archive_path).await,
        }
    }

    /// Replace the datastore contents with the archive at `archive_path`
    pub async fn restore(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        match self {
            Self::Direct(s) => s.restore(conn, archive_path).await,
            Self::Containerized(s) => s.restore(conn, archive_path).await,
        }
    }
}

/// Which kind of operation a subprocess step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Backup,
    Restore,
}

impl Operation {
    fn failure(self, step: &'static str, exit_code: Option<i32>, stderr: String) -> BackupError {
        match self {
            Operation::Backup => BackupError::BackupExecution {
                step,
                exit_code,
                stderr,
            },
            Operation::Restore => BackupError::RestoreExecution {
                step,
                exit_code,
                stderr,
            },
        }
    }
}

/// Run one subprocess step, mapping spawn failures, timeouts and non-zero
/// exits to the operation's execution error
pub(crate) async fn run_step(
    executor: &dyn CommandExecutor,
    op: Operation,
    step: &'static str,
    program: &str,
    args: &[String],
    timeout: Option<Duration>,
) -> Result<CommandOutput> {
    debug!("{:?} step '{}' starting", op, step);

    let output = executor
        .run(program, args, timeout)
        .await
        .map_err(|e| {
            error!("{:?} step '{}' could not run: {:#}", op, step, e);
            op.failure(step, None, format!("{:#}", e))
        })?;

    if !output.success() {
        let stderr = output.diagnostic();
        error!(
            "{:?} step '{}' failed with exit code {:?}: {}",
            op, step, output.exit_code, stderr
        );
        return Err(op.failure(step, output.exit_code, stderr));
    }

    Ok(output)
}

pub(crate) fn timeout_from(tools: &ToolsConfig) -> Option<Duration> {
    tools.timeout_seconds.map(Duration::from_secs)
}

pub(crate) fn archive_arg(path: impl std::fmt::Display) -> String {
    format!("--archive={}", path)
}

pub(crate) fn uri_arg(uri: &str) -> String {
    format!("--uri={}", uri)
}
