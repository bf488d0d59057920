//! Container CLI primitives for the managed execution context
//!
//! Builds `exec` / `cp` invocations for a docker-compatible CLI. Execution goes
//! through a [`CommandExecutor`] so callers can substitute a mock.

use super::command::CommandOutput;
use super::executor::CommandExecutor;
use anyhow::Result;
use std::path::Path;
use std::time::Duration;

/// A named container reached through a container runtime CLI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedContext {
    pub runtime: String,
    pub container: String,
}

impl ManagedContext {
    pub fn new(runtime: impl Into<String>, container: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            container: container.into(),
        }
    }

    /// `exec <container> <program> <args...>`
    pub fn exec_args(&self, program: &str, args: &[String]) -> Vec<String> {
        let mut out = vec!["exec".to_string(), self.container.clone(), program.to_string()];
        out.extend(args.iter().cloned());
        out
    }

    /// `exec <container> mkdir -p <dir>`
    pub fn mkdir_args(&self, dir: &str) -> Vec<String> {
        self.exec_args("mkdir", &["-p".to_string(), dir.to_string()])
    }

    /// `cp <container>:<path> <host path>`
    pub fn copy_from_args(&self, container_path: &str, host_path: &Path) -> Vec<String> {
        vec![
            "cp".to_string(),
            format!("{}:{}", self.container, container_path),
            host_path.display().to_string(),
        ]
    }

    /// `cp <host path> <container>:<path>`
    pub fn copy_to_args(&self, host_path: &Path, container_path: &str) -> Vec<String> {
        vec![
            "cp".to_string(),
            host_path.display().to_string(),
            format!("{}:{}", self.container, container_path),
        ]
    }

    /// Run a prepared argument list through the runtime CLI
    pub async fn run(
        &self,
        executor: &dyn CommandExecutor,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        executor.run(&self.runtime, args, timeout).await
    }

    /// Whether the container exists and is running
    pub async fn is_running(
        &self,
        executor: &dyn CommandExecutor,
        timeout: Option<Duration>,
    ) -> Result<bool> {
        let args = vec![
            "inspect".to_string(),
            "-f".to_string(),
            "{{.State.Running}}".to_string(),
            self.container.clone(),
        ];
        let output = self.run(executor, &args, timeout).await?;
        Ok(output.success() && output.stdout.trim() == "true")
    }
}

/// Join an in-container directory and a file name
pub fn container_path(work_dir: &str, file_name: &str) -> String {
    format!("{}/{}", work_dir.trim_end_matches('/'), file_name)
}
