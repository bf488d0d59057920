//! Configuration module for db-backup-manager
//!
//! This module handles loading and validating configuration from TOML files,
//! and resolving datastore connection settings for each call.
//!
//! ## Connection settings
//!
//! The `[database]` section is only a baseline. `DATABASE_URL`, `DB_NAME` and
//! `DB_CONTAINER` override it and are read again on every backup or restore,
//! so a missing URI is reported when a backup runs, not when the file loads.
//!
//! ## Example Usage
//!
//! ```no_run
//! use db_backup_manager::config;
//!
//! let config = config::load_config("backup-config.toml")?;
//! println!("Archives go to {:?}", config::backup_directory(&config.global));
//! # Ok::<(), config::ConfigError>(())
//! ```

mod connection;
mod loader;
mod types;

pub use connection::{
    ConnectionProvider, EnvConnectionProvider, StaticConnectionProvider, DATABASE_URL_ENV,
    DB_CONTAINER_ENV, DB_NAME_ENV,
};
pub use loader::{load_config, parse_config, parse_daily_time, ConfigError, Result, RETENTION_DAYS_ENV};
pub use types::*;

use std::path::{Path, PathBuf};

/// Absolute backup directory; relative paths resolve against the process cwd
pub fn backup_directory(global: &GlobalConfig) -> PathBuf {
    let dir = expand_tilde(&global.backup_directory);
    if dir.is_absolute() {
        return dir;
    }
    match std::env::current_dir() {
        Ok(cwd) => cwd.join(dir),
        Err(_) => dir,
    }
}

/// Retention policy from global settings
pub fn retention_policy(global: &GlobalConfig) -> RetentionPolicy {
    RetentionPolicy::days(global.retention_days)
}

/// Expand tilde (~) in path
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
