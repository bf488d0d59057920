//! Tests for the 'download' and 'download-latest' commands

use rstest::rstest;
use test_utils::*;
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn test_open_archive_streams_contents() {
    let ctx = TestContext::new();
    write_aged_file(ctx.backup_dir(), "testdb-a.gz", b"payload", DAY);
    let service = ctx.service(MockExecutor::new());

    let mut stream = service.open_archive("testdb-a.gz").await.assert_ok();
    let mut contents = Vec::new();
    stream.reader.read_to_end(&mut contents).await.unwrap();

    assert_eq!(stream.file_name, "testdb-a.gz");
    assert_eq!(stream.size, 7);
    assert_eq!(contents, b"payload");
}

#[rstest]
#[case("")]
#[case("..")]
#[case("../config.toml")]
#[case("sub/testdb-a.gz")]
#[tokio::test]
async fn test_open_archive_rejects_unsafe_names(#[case] name: &str) {
    let ctx = TestContext::new();
    let service = ctx.service(MockExecutor::new());

    let result = service.open_archive(name).await;
    assert!(matches!(result, Err(BackupError::InvalidArchiveName(_))));
}

#[tokio::test]
async fn test_download_latest_propagates_backup_failure() {
    let ctx = TestContext::new();
    let service = ctx.service(MockExecutor::new().expect("mongodump", MockResponse::fail(1, "down")));

    let result = service.download_latest().await;
    assert!(matches!(result, Err(BackupError::BackupExecution { .. })));
    assert!(ctx.backup_files().is_empty());
}

#[tokio::test]
async fn test_download_latest_contents_match_created_file() {
    let ctx = TestContext::new();
    let service = ctx.service(MockExecutor::new().simulate_dump("mongodump"));

    let mut stream = service.download_latest().await.assert_ok();
    let mut contents = Vec::new();
    stream.reader.read_to_end(&mut contents).await.unwrap();

    assert_eq!(contents, std::fs::read(&stream.path).unwrap());
}
