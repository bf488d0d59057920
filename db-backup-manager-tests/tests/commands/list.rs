//! Tests for the 'list' command

use test_utils::*;

#[tokio::test]
async fn test_list_empty_directory() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.backup_dir()).unwrap();
    let service = ctx.service(MockExecutor::new());

    assert!(service.list_backups().await.assert_ok().is_empty());
}

#[tokio::test]
async fn test_list_entries_carry_size_and_order() {
    let ctx = TestContext::new();
    aged_archive(ctx.backup_dir(), "testdb-2.gz", 2);
    write_aged_file(ctx.backup_dir(), "testdb-1.gz", b"bigger archive", DAY);
    let service = ctx.service(MockExecutor::new());

    let entries = service.list_backup_entries().await.assert_ok();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].file_name, "testdb-1.gz");
    assert_eq!(entries[0].size, 14);
    assert!(entries[0].modified > entries[1].modified);
}

#[tokio::test]
async fn test_list_ignores_subdirectories() {
    let ctx = TestContext::new();
    std::fs::create_dir_all(ctx.backup_dir().join("nested.gz")).unwrap();
    aged_archive(ctx.backup_dir(), "testdb-a.gz", 0);
    let service = ctx.service(MockExecutor::new());

    assert_eq!(service.list_backups().await.assert_ok(), vec!["testdb-a.gz"]);
}
