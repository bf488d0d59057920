//! Fluent API for building test configurations
//!
//! Provides a builder pattern for creating test configurations with sensible defaults.

use db_backup_manager::config::{
    Config, DatabaseConfig, GlobalConfig, ScheduleConfig, StrategyKind, ToolsConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Builder for creating test configurations
pub struct ConfigBuilder {
    temp_dir: TempDir,
    global: GlobalConfig,
    database: DatabaseConfig,
    schedule: ScheduleConfig,
    tools: ToolsConfig,
}

impl ConfigBuilder {
    /// Create a new ConfigBuilder with an empty database section
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");

        let log_directory = temp_dir.path().join("logs");
        fs::create_dir_all(&log_directory).expect("Failed to create log_directory");

        let global = GlobalConfig {
            backup_directory: temp_dir.path().join("backup"),
            log_directory,
            log_max_files: 5,
            ..GlobalConfig::default()
        };

        Self {
            temp_dir,
            global,
            database: DatabaseConfig {
                uri: String::new(),
                name: String::new(),
                container: None,
                strategy: StrategyKind::Direct,
            },
            schedule: ScheduleConfig {
                enabled: true,
                daily_at: "00:00:00".to_string(),
                run_on_startup: false,
            },
            tools: ToolsConfig::default(),
        }
    }

    /// Direct strategy against a local datastore
    pub fn minimal() -> Self {
        Self::new().with_database("mongodb://localhost:27017", "testdb")
    }

    /// Containerized strategy against the given container
    pub fn containerized(container: &str) -> Self {
        let mut builder = Self::minimal();
        builder.database.strategy = StrategyKind::Containerized;
        builder.database.container = Some(container.to_string());
        builder
    }

    pub fn with_database(mut self, uri: &str, name: &str) -> Self {
        self.database.uri = uri.to_string();
        self.database.name = name.to_string();
        self
    }

    pub fn with_retention_days(mut self, days: u32) -> Self {
        self.global.retention_days = days;
        self
    }

    pub fn with_backup_dir(mut self, path: &Path) -> Self {
        self.global.backup_directory = path.to_path_buf();
        self
    }

    pub fn with_log_dir(mut self, path: &Path) -> Self {
        self.global.log_directory = path.to_path_buf();
        self
    }

    pub fn with_daily_at(mut self, daily_at: &str) -> Self {
        self.schedule.daily_at = daily_at.to_string();
        self
    }

    pub fn with_schedule_enabled(mut self, enabled: bool) -> Self {
        self.schedule.enabled = enabled;
        self
    }

    /// Point the dump/restore programs at custom executables (e.g. scripts)
    pub fn with_programs(mut self, dump: &Path, restore: &Path) -> Self {
        self.tools.dump_program = dump.display().to_string();
        self.tools.restore_program = restore.display().to_string();
        self
    }

    pub fn with_container_runtime(mut self, runtime: &str) -> Self {
        self.tools.container_runtime = runtime.to_string();
        self
    }

    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.tools.timeout_seconds = Some(seconds);
        self
    }

    /// Get the temp directory path
    pub fn temp_dir(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.global.backup_directory.clone()
    }

    /// Build the Config
    pub fn build(self) -> Config {
        self.persist().0
    }

    /// Keep the temp directory (don't delete on drop)
    pub fn persist(self) -> (Config, TempDir) {
        let config = Config {
            global: self.global,
            database: self.database,
            schedule: self.schedule,
            tools: self.tools,
        };
        (config, self.temp_dir)
    }

    /// Write the config as `config.toml` inside the temp dir
    pub fn write(self) -> (PathBuf, Config, TempDir) {
        let (config, temp_dir) = self.persist();
        let path = temp_dir.path().join("config.toml");
        let toml_str = toml::to_string_pretty(&config).expect("Failed to serialize config");
        fs::write(&path, toml_str).expect("Failed to write config");
        (path, config, temp_dir)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
