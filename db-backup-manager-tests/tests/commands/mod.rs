//! Command tests for db-backup-manager
//!
//! These tests drive the operations behind each CLI command using mocked
//! dump/restore tools.

mod daemon;
mod download;
mod list;
mod restore;
