use super::types::*;
use chrono::NaiveTime;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Environment variable overriding `global.retention_days`
pub const RETENTION_DAYS_ENV: &str = "BACKUP_RETENTION_DAYS";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load and validate configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate configuration from TOML text
pub fn parse_config(contents: &str) -> Result<Config> {
    let mut config: Config = toml::from_str(contents)?;
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(value) = std::env::var(RETENTION_DAYS_ENV) {
        let days = value.trim().parse::<u32>().map_err(|_| {
            ConfigError::ValidationError(format!(
                "{} must be a positive integer, got '{}'",
                RETENTION_DAYS_ENV, value
            ))
        })?;
        debug!("Retention window overridden by {}: {} days", RETENTION_DAYS_ENV, days);
        config.global.retention_days = days;
    }
    Ok(())
}

/// Validate the configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.global.retention_days == 0 {
        return Err(ConfigError::ValidationError(
            "retention_days must be greater than zero".to_string(),
        ));
    }

    if config.global.log_max_files == 0 {
        return Err(ConfigError::ValidationError(
            "log_max_files must be greater than zero".to_string(),
        ));
    }

    parse_daily_time(&config.schedule.daily_at)?;

    let tools = &config.tools;
    for (field, value) in [
        ("dump_program", &tools.dump_program),
        ("restore_program", &tools.restore_program),
        ("container_runtime", &tools.container_runtime),
        ("container_uri", &tools.container_uri),
    ] {
        if value.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "tools.{} must not be empty",
                field
            )));
        }
    }

    if !tools.container_work_dir.starts_with('/') {
        return Err(ConfigError::ValidationError(format!(
            "tools.container_work_dir must be an absolute path: {}",
            tools.container_work_dir
        )));
    }

    if tools.timeout_seconds == Some(0) {
        return Err(ConfigError::ValidationError(
            "tools.timeout_seconds must be greater than zero when set".to_string(),
        ));
    }

    Ok(())
}

/// Parse the `HH:MM:SS` time of the daily run
pub fn parse_daily_time(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value, "%H:%M:%S").map_err(|e| {
        ConfigError::ValidationError(format!(
            "schedule.daily_at must be HH:MM:SS, got '{}': {}",
            value, e
        ))
    })
}
