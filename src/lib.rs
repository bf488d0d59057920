//! Database Backup Manager Library
//!
//! Scheduled and on-demand archive backups of a MongoDB-style datastore, run
//! through its dump/restore tools either directly or inside a managed container.

pub mod archive;
pub mod config;
pub mod error;
pub mod managers;
pub mod strategies;
pub mod utils;

// Re-export commonly used types
pub use archive::{ArchiveEntry, ArchiveStream, PruneReport, PruneWarning};
pub use config::{load_config, Config, ConfigError, DatastoreConnectionConfig, RetentionPolicy, StrategyKind};
pub use error::{BackupError, Result};
pub use managers::logging::{init_console_logging, init_logging, LogGuard, LoggingConfig};
pub use managers::scheduler::Scheduler;
pub use managers::service::{BackupService, DailyRunOutcome, JobState, JobStatus};
pub use strategies::ExecutionStrategy;
