//! Test context and harness for service and CLI testing
//!
//! Provides a unified context for setting up and tearing down test environments.

use crate::config_builder::ConfigBuilder;
use anyhow::Result;
use db_backup_manager::config::{
    Config, DatastoreConnectionConfig, RetentionPolicy, StaticConnectionProvider,
};
use db_backup_manager::managers::service::BackupService;
use db_backup_manager::strategies::ExecutionStrategy;
use db_backup_manager::utils::executor::CommandExecutor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Test context that manages test resources and provides common utilities
pub struct TestContext {
    /// Temporary directory for test files
    temp_dir: TempDir,
    /// The test configuration
    config: Config,
    /// Path of the written config file
    config_path: PathBuf,
}

impl TestContext {
    /// Create a test context with a minimal direct-strategy configuration
    pub fn new() -> Self {
        Self::from_builder(ConfigBuilder::minimal())
    }

    /// Create a test context from a ConfigBuilder; the config is written to disk
    pub fn from_builder(builder: ConfigBuilder) -> Self {
        let (config_path, config, temp_dir) = builder.write();

        Self {
            temp_dir,
            config,
            config_path,
        }
    }

    /// Get the temporary directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backup_dir(&self) -> &Path {
        &self.config.global.backup_directory
    }

    /// Connection settings taken from the config file, ignoring the environment
    pub fn connection(&self) -> DatastoreConnectionConfig {
        let mut conn =
            DatastoreConnectionConfig::new(&self.config.database.uri, &self.config.database.name);
        conn.container = self.config.database.container.clone();
        conn
    }

    /// Service over the context's config with a fixed connection and the given executor
    pub fn service<E: CommandExecutor + 'static>(&self, executor: E) -> BackupService {
        self.service_with_connection(executor, self.connection())
    }

    pub fn service_with_connection<E: CommandExecutor + 'static>(
        &self,
        executor: E,
        connection: DatastoreConnectionConfig,
    ) -> BackupService {
        let strategy = ExecutionStrategy::from_config(
            self.config.database.strategy,
            &self.config.tools,
            Arc::new(executor),
        );
        BackupService::new(
            self.backup_dir(),
            RetentionPolicy::days(self.config.global.retention_days),
            Arc::new(StaticConnectionProvider(connection)),
            strategy,
        )
    }

    /// Create a subdirectory in the temp dir
    pub fn create_subdir(&self, name: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::create_dir_all(&path).expect("Failed to create subdirectory");
        path
    }

    /// Create a file in the temp dir
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }

    /// Names of the files currently in the backup directory, sorted
    pub fn backup_files(&self) -> Vec<String> {
        let mut names: Vec<String> = match std::fs::read_dir(self.backup_dir()) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }

    /// Read a file from the temp directory
    pub fn read_file(&self, name: &str) -> Result<String> {
        let path = self.temp_dir.path().join(name);
        Ok(std::fs::read_to_string(path)?)
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Extension trait for assertion helpers
pub trait ResultAssertions<T> {
    /// Assert that the result is Ok and return the value
    fn assert_ok(self) -> T;

    /// Assert that the result is Ok with a custom message
    fn assert_ok_msg(self, msg: &str) -> T;

    /// Assert that the result is Err
    fn assert_err(self);

    /// Assert that the result is Err and the error message contains the given string
    fn assert_err_contains(self, needle: &str);
}

impl<T: std::fmt::Debug, E: std::fmt::Display> ResultAssertions<T> for Result<T, E> {
    fn assert_ok(self) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {}", e),
        }
    }

    fn assert_ok_msg(self, msg: &str) -> T {
        match self {
            Ok(v) => v,
            Err(e) => panic!("{}: {}", msg, e),
        }
    }

    fn assert_err(self) {
        if let Ok(v) = self {
            panic!("Expected Err, got Ok: {:?}", v);
        }
    }

    fn assert_err_contains(self, needle: &str) {
        match self {
            Ok(v) => panic!("Expected Err containing '{}', got Ok: {:?}", needle, v),
            Err(e) => {
                let err_msg = e.to_string();
                assert!(
                    err_msg.contains(needle),
                    "Error '{}' does not contain '{}'",
                    err_msg,
                    needle
                );
            }
        }
    }
}

/// Extension trait for Option assertions
pub trait OptionAssertions<T> {
    /// Assert that the option is Some and return the value
    fn assert_some(self) -> T;

    /// Assert that the option is None
    fn assert_none(self);
}

impl<T: std::fmt::Debug> OptionAssertions<T> for Option<T> {
    fn assert_some(self) -> T {
        match self {
            Some(v) => v,
            None => panic!("Expected Some, got None"),
        }
    }

    fn assert_none(self) {
        if let Some(v) = self {
            panic!("Expected None, got Some: {:?}", v);
        }
    }
}
