//! Per-call resolution of datastore connection settings

use super::types::{DatabaseConfig, DatastoreConnectionConfig};

pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DB_NAME_ENV: &str = "DB_NAME";
pub const DB_CONTAINER_ENV: &str = "DB_CONTAINER";

/// Source of connection settings, consulted once per backup or restore call
pub trait ConnectionProvider: Send + Sync {
    fn connection(&self) -> DatastoreConnectionConfig;
}

/// Connection settings from the config file, overridden by the process
/// environment at the moment of each call
#[derive(Debug, Clone)]
pub struct EnvConnectionProvider {
    base: DatabaseConfig,
}

impl EnvConnectionProvider {
    pub fn new(base: DatabaseConfig) -> Self {
        Self { base }
    }
}

impl ConnectionProvider for EnvConnectionProvider {
    fn connection(&self) -> DatastoreConnectionConfig {
        let uri = env_or(DATABASE_URL_ENV, &self.base.uri);
        let db_name = env_or(DB_NAME_ENV, &self.base.name);
        let container = std::env::var(DB_CONTAINER_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.base.container.clone());

        DatastoreConnectionConfig {
            uri,
            db_name,
            container,
        }
    }
}

/// Fixed connection settings
#[derive(Debug, Clone)]
pub struct StaticConnectionProvider(pub DatastoreConnectionConfig);

impl ConnectionProvider for StaticConnectionProvider {
    fn connection(&self) -> DatastoreConnectionConfig {
        self.0.clone()
    }
}

fn env_or(key: &str, fallback: &str) -> String {
    match std::env::var(key) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback.to_string(),
    }
}
