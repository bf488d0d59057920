//! Containerized strategy: utilities run inside the managed container
//!
//! A dump is three steps (prepare, dump, copy to host) and a restore is three
//! steps (prepare, copy to container, restore). There is no rollback: if a late
//! step fails, files written by earlier steps stay inside the container.

use super::{archive_arg, run_step, timeout_from, uri_arg, Operation};
use crate::config::{DatastoreConnectionConfig, ToolsConfig};
use crate::error::{BackupError, Result};
use crate::utils::docker::{container_path, ManagedContext};
use crate::utils::CommandExecutor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// File name used for archives copied into the container for restore
pub const RESTORE_FILE_NAME: &str = "restore.gz";

pub struct ContainerizedStrategy {
    executor: Arc<dyn CommandExecutor>,
    runtime: String,
    dump_program: String,
    restore_program: String,
    work_dir: String,
    uri_template: String,
    timeout: Option<Duration>,
}

impl ContainerizedStrategy {
    pub fn new(tools: &ToolsConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            runtime: tools.container_runtime.clone(),
            dump_program: tools.dump_program.clone(),
            restore_program: tools.restore_program.clone(),
            work_dir: tools.container_work_dir.clone(),
            uri_template: tools.container_uri.clone(),
            timeout: timeout_from(tools),
        }
    }

    /// Container for this call; the id comes from the per-call connection settings
    pub fn context(&self, conn: &DatastoreConnectionConfig) -> Result<ManagedContext> {
        match conn.container.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => Ok(ManagedContext::new(&self.runtime, id)),
            _ => Err(BackupError::Configuration(
                "containerized strategy requires a container id (database.container or DB_CONTAINER)"
                    .to_string(),
            )),
        }
    }

    /// Connection URI as seen from inside the container
    pub fn in_context_uri(&self, db_name: &str) -> String {
        self.uri_template.replace("{db}", db_name)
    }

    pub async fn dump(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        let ctx = self.context(conn)?;
        let file_name = archive_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| BackupError::InvalidArchiveName(archive_path.display().to_string()))?;
        let in_container = container_path(&self.work_dir, file_name);

        info!(
            "Dumping '{}' inside container '{}' to {}",
            conn.db_name, ctx.container, in_container
        );

        self.step(Operation::Backup, "prepare-container", &ctx.mkdir_args(&self.work_dir))
            .await?;

        let dump_args = ctx.exec_args(
            &self.dump_program,
            &[
                uri_arg(&self.in_context_uri(&conn.db_name)),
                archive_arg(&in_container),
                "--gzip".to_string(),
            ],
        );
        self.step(Operation::Backup, "dump", &dump_args).await?;

        self.step(
            Operation::Backup,
            "copy-to-host",
            &ctx.copy_from_args(&in_container, archive_path),
        )
        .await?;

        Ok(())
    }

    /// Destructive: existing collections are dropped before the archive is loaded
    pub async fn restore(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        let ctx = self.context(conn)?;
        let in_container = container_path(&self.work_dir, RESTORE_FILE_NAME);

        info!(
            "Restoring '{}' inside container '{}' from {:?}",
            conn.db_name, ctx.container, archive_path
        );

        self.step(Operation::Restore, "prepare-container", &ctx.mkdir_args(&self.work_dir))
            .await?;

        self.step(
            Operation::Restore,
            "copy-to-container",
            &ctx.copy_to_args(archive_path, &in_container),
        )
        .await?;

        let restore_args = ctx.exec_args(
            &self.restore_program,
            &[
                uri_arg(&self.in_context_uri(&conn.db_name)),
                archive_arg(&in_container),
                "--gzip".to_string(),
                "--drop".to_string(),
            ],
        );
        self.step(Operation::Restore, "restore", &restore_args).await?;

        Ok(())
    }

    async fn step(&self, op: Operation, step: &'static str, args: &[String]) -> Result<()> {
        run_step(
            self.executor.as_ref(),
            op,
            step,
            &self.runtime,
            args,
            self.timeout,
        )
        .await?;
        Ok(())
    }
}
