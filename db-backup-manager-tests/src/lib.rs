//! Test utilities for db-backup-manager
//!
//! This crate provides shared test utilities, fixtures and helper functions
//! for testing the db-backup-manager library and CLI.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use test_utils::{ConfigBuilder, TestContext, MockExecutor};
//!
//! #[tokio::test]
//! async fn my_test() {
//!     let ctx = TestContext::from_builder(ConfigBuilder::minimal());
//!     let service = ctx.service(MockExecutor::new().simulate_dump("mongodump"));
//!     // ... test code
//! }
//! ```

pub mod config_builder;
pub mod fixtures;
pub mod test_context;

// Re-export commonly used items
pub use config_builder::ConfigBuilder;
pub use fixtures::*;
pub use test_context::{OptionAssertions, ResultAssertions, TestContext};

// Re-export types from the main crate for convenience
pub use db_backup_manager::config::{
    Config, DatabaseConfig, DatastoreConnectionConfig, GlobalConfig, RetentionPolicy,
    ScheduleConfig, StaticConnectionProvider, StrategyKind, ToolsConfig,
};
pub use db_backup_manager::error::BackupError;
pub use db_backup_manager::managers::service::BackupService;

// Re-export mock implementations from the main crate
pub use db_backup_manager::utils::executor::mock::{
    fake_copy, fake_dump, CommandCall, MockExecutor, MockResponse,
};
pub use db_backup_manager::utils::executor::{CommandExecutor, RealExecutor};

/// Common test result type
pub type TestResult<T = ()> = anyhow::Result<T>;
