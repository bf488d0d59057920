//! Tests for the 'restore' command

use std::sync::Arc;
use std::time::Duration;
use test_utils::*;

#[tokio::test]
async fn test_restore_failure_carries_detail() {
    let ctx = TestContext::new();
    let archive = aged_archive(ctx.backup_dir(), "testdb-a.gz", 1);
    let mock = MockExecutor::new().expect(
        "mongorestore",
        MockResponse::fail(1, "Failed: corruption found in archive"),
    );
    let service = ctx.service(mock);

    match service.restore_backup(&archive).await {
        Err(BackupError::RestoreExecution { exit_code, stderr, .. }) => {
            assert_eq!(exit_code, Some(1));
            assert!(stderr.contains("corruption"));
        }
        other => panic!("Expected RestoreExecution, got {:?}", other),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_restore_is_not_blocked_by_running_backup() {
    let ctx = TestContext::new();
    let archive = aged_archive(ctx.backup_dir(), "testdb-a.gz", 1);
    let mock = MockExecutor::new().on("mongodump", |call| {
        std::thread::sleep(Duration::from_millis(300));
        fake_dump(call)
    });
    let service = Arc::new(ctx.service(mock.clone()));

    let backup = tokio::spawn({
        let service = service.clone();
        async move { service.create_manual_backup().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    service.restore_backup(&archive).await.assert_ok();
    assert_eq!(mock.call_count("mongorestore"), 1);
    backup.await.unwrap().assert_ok();
}

#[tokio::test]
async fn test_restore_timeout_is_execution_error() {
    let ctx = TestContext::new();
    let archive = aged_archive(ctx.backup_dir(), "testdb-a.gz", 1);
    let service = ctx.service(MockExecutor::new().expect("mongorestore", MockResponse::Timeout));

    let err = service.restore_backup(&archive).await.unwrap_err();
    assert!(matches!(err, BackupError::RestoreExecution { exit_code: None, .. }));
}

#[tokio::test]
async fn test_restore_directory_path_is_not_found() {
    let ctx = TestContext::new();
    let dir = ctx.create_subdir("not-an-archive.gz");
    let mock = MockExecutor::new();
    let service = ctx.service(mock.clone());

    let err = service.restore_backup(&dir).await.unwrap_err();
    assert!(matches!(err, BackupError::ArchiveNotFound(_)));
    assert!(mock.get_calls().is_empty());
}
