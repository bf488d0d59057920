//! Archive lifecycle on the host filesystem: naming, listing and retention

pub mod catalog;
pub mod naming;
pub mod retention;

pub use catalog::{ArchiveEntry, ArchiveStream};
pub use naming::{archive_file_name, ARCHIVE_EXTENSION};
pub use retention::{PruneReport, PruneWarning};
