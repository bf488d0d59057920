//! Direct strategy: dump/restore utilities run on the host

use super::{archive_arg, run_step, timeout_from, uri_arg, Operation};
use crate::config::{DatastoreConnectionConfig, ToolsConfig};
use crate::error::Result;
use crate::utils::CommandExecutor;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct DirectStrategy {
    executor: Arc<dyn CommandExecutor>,
    dump_program: String,
    restore_program: String,
    timeout: Option<Duration>,
}

impl DirectStrategy {
    pub fn new(tools: &ToolsConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            dump_program: tools.dump_program.clone(),
            restore_program: tools.restore_program.clone(),
            timeout: timeout_from(tools),
        }
    }

    pub async fn dump(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        info!("Dumping '{}' to {:?}", conn.db_name, archive_path);

        let args = vec![
            uri_arg(&conn.uri),
            archive_arg(archive_path.display()),
            "--gzip".to_string(),
        ];
        run_step(
            self.executor.as_ref(),
            Operation::Backup,
            "dump",
            &self.dump_program,
            &args,
            self.timeout,
        )
        .await?;
        Ok(())
    }

    /// Destructive: existing collections are dropped before the archive is loaded
    pub async fn restore(&self, conn: &DatastoreConnectionConfig, archive_path: &Path) -> Result<()> {
        info!("Restoring '{}' from {:?}", conn.db_name, archive_path);

        let args = vec![
            uri_arg(&conn.uri),
            archive_arg(archive_path.display()),
            "--gzip".to_string(),
            "--drop".to_string(),
        ];
        run_step(
            self.executor.as_ref(),
            Operation::Restore,
            "restore",
            &self.restore_program,
            &args,
            self.timeout,
        )
        .await?;
        Ok(())
    }
}
