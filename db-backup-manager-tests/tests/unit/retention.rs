//! Retention and listing over a real backup directory

use db_backup_manager::archive::{catalog, retention};
use std::time::Duration;
use test_utils::*;

#[tokio::test]
async fn test_prune_keeps_files_inside_window() {
    let ctx = TestContext::new();
    aged_archive(ctx.backup_dir(), "testdb-a.gz", 10);
    aged_archive(ctx.backup_dir(), "testdb-b.gz", 1);

    let report = retention::prune(ctx.backup_dir(), &RetentionPolicy::days(7))
        .await
        .assert_ok();

    assert_eq!(report.deleted.len(), 1);
    assert_eq!(report.kept, 1);
    assert_eq!(ctx.backup_files(), vec!["testdb-b.gz".to_string()]);
}

#[tokio::test]
async fn test_prune_applies_to_non_archive_files() {
    let ctx = TestContext::new();
    write_aged_file(ctx.backup_dir(), "notes.txt", b"stale", DAY * 30);

    let report = retention::prune(ctx.backup_dir(), &RetentionPolicy::days(7))
        .await
        .assert_ok();

    assert_eq!(report.deleted.len(), 1);
    assert!(ctx.backup_files().is_empty());
}

#[tokio::test]
async fn test_service_prune_now_uses_configured_window() {
    let ctx = TestContext::from_builder(ConfigBuilder::minimal().with_retention_days(2));
    aged_archive(ctx.backup_dir(), "testdb-3d.gz", 3);
    write_aged_file(ctx.backup_dir(), "testdb-1d.gz", b"x", DAY + Duration::from_secs(60));
    let service = ctx.service(MockExecutor::new());

    let report = service.prune_now().await.assert_ok();

    assert_eq!(report.deleted.len(), 1);
    assert_eq!(ctx.backup_files(), vec!["testdb-1d.gz".to_string()]);
}

#[tokio::test]
async fn test_listing_is_newest_first_and_archives_only() {
    let ctx = TestContext::new();
    aged_archive(ctx.backup_dir(), "testdb-old.gz", 5);
    aged_archive(ctx.backup_dir(), "testdb-new.gz", 1);
    write_aged_file(ctx.backup_dir(), "readme.txt", b"x", DAY);

    let names = catalog::list(ctx.backup_dir()).await.assert_ok();
    assert_eq!(names, vec!["testdb-new.gz", "testdb-old.gz"]);
}

#[tokio::test]
async fn test_listing_missing_directory_is_empty() {
    let ctx = TestContext::new();
    assert!(!ctx.backup_dir().exists());

    let names = catalog::list(ctx.backup_dir()).await.assert_ok();
    assert!(names.is_empty());
}
