use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub global: GlobalConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Global configuration settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Directory holding the archives (relative paths resolve against the cwd)
    #[serde(default = "default_backup_directory")]
    pub backup_directory: PathBuf,

    /// Archives older than this many days are pruned
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,

    /// Logging configuration
    #[serde(default = "default_log_directory")]
    pub log_directory: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_log_max_files")]
    pub log_max_files: u32,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            backup_directory: default_backup_directory(),
            retention_days: default_retention_days(),
            log_directory: default_log_directory(),
            log_level: default_log_level(),
            log_max_files: default_log_max_files(),
        }
    }
}

/// Datastore connection settings as written in the config file.
///
/// Values here are a baseline only; `DATABASE_URL`, `DB_NAME` and
/// `DB_CONTAINER` take precedence and are re-read on every call.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    /// Managed execution-context id (container name)
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub strategy: StrategyKind,
}

/// How the dump/restore utilities reach the datastore
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Utilities run on the host with network access to the datastore
    #[default]
    Direct,
    /// Utilities run inside the managed execution context
    Containerized,
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StrategyKind::Direct => write!(f, "direct"),
            StrategyKind::Containerized => write!(f, "containerized"),
        }
    }
}

/// Daily schedule settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Local wall-clock time of the daily run, `HH:MM:SS`
    #[serde(default = "default_daily_at")]
    pub daily_at: String,
    #[serde(default = "default_enabled")]
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            daily_at: default_daily_at(),
            run_on_startup: default_enabled(),
        }
    }
}

/// External programs and the paths they use
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolsConfig {
    #[serde(default = "default_dump_program")]
    pub dump_program: String,
    #[serde(default = "default_restore_program")]
    pub restore_program: String,
    /// CLI used for exec/cp against the managed execution context
    #[serde(default = "default_container_runtime")]
    pub container_runtime: String,
    /// Working directory inside the managed execution context
    #[serde(default = "default_container_work_dir")]
    pub container_work_dir: String,
    /// Connection URI used inside the managed execution context; `{db}` is
    /// replaced with the database name
    #[serde(default = "default_container_uri")]
    pub container_uri: String,
    /// Per-command timeout; no timeout when absent
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            dump_program: default_dump_program(),
            restore_program: default_restore_program(),
            container_runtime: default_container_runtime(),
            container_work_dir: default_container_work_dir(),
            container_uri: default_container_uri(),
            timeout_seconds: None,
        }
    }
}

/// Connection settings resolved for a single backup or restore call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatastoreConnectionConfig {
    pub uri: String,
    pub db_name: String,
    pub container: Option<String>,
}

impl DatastoreConnectionConfig {
    pub fn new(uri: impl Into<String>, db_name: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            db_name: db_name.into(),
            container: None,
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }
}

/// Age-based retention, applied uniformly to every archive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub window: std::time::Duration,
}

impl RetentionPolicy {
    pub fn days(days: u32) -> Self {
        Self {
            window: std::time::Duration::from_secs(u64::from(days) * 24 * 60 * 60),
        }
    }
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::days(default_retention_days())
    }
}

// Default value functions

fn default_backup_directory() -> PathBuf { PathBuf::from("backup") }
fn default_retention_days() -> u32 { 7 }
fn default_log_directory() -> PathBuf { PathBuf::from("~/logs") }
fn default_log_level() -> String { "info".to_string() }
fn default_log_max_files() -> u32 { 10 }
fn default_enabled() -> bool { true }
fn default_daily_at() -> String { "00:00:00".to_string() }
fn default_dump_program() -> String { "mongodump".to_string() }
fn default_restore_program() -> String { "mongorestore".to_string() }
fn default_container_runtime() -> String { "docker".to_string() }
fn default_container_work_dir() -> String { "/data/backup".to_string() }
fn default_container_uri() -> String {
    "mongodb://localhost:27017/{db}?authSource=admin".to_string()
}
