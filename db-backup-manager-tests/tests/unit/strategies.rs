//! Strategy command lines as seen by the executor

use test_utils::*;

fn containerized() -> TestContext {
    TestContext::from_builder(ConfigBuilder::containerized("mongo_dev"))
}

#[tokio::test]
async fn test_direct_dump_command_line() {
    let ctx = TestContext::new();
    let mock = MockExecutor::new().simulate_dump("mongodump");
    let service = ctx.service(mock.clone());

    let path = service.create_manual_backup().await.assert_ok();

    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].program, "mongodump");
    assert_eq!(calls[0].flag_value("--uri"), Some("mongodb://localhost:27017"));
    assert_eq!(calls[0].flag_value("--archive"), path.to_str());
    assert!(calls[0].has_arg("--gzip"));
}

#[tokio::test]
async fn test_containerized_backup_steps_in_order() {
    let ctx = containerized();
    let mock = MockExecutor::new().simulate_copy("docker");
    let service = ctx.service(mock.clone());

    let path = service.create_manual_backup().await.assert_ok();
    let file_name = path.file_name().unwrap().to_str().unwrap();

    let calls = mock.get_calls();
    let words: Vec<Vec<&str>> = calls.iter().map(|c| c.words()).collect();
    assert_eq!(calls.len(), 3);
    assert_eq!(words[0], vec!["docker", "exec", "mongo_dev", "mkdir", "-p", "/data/backup"]);
    assert_eq!(&words[1][..4], &["docker", "exec", "mongo_dev", "mongodump"]);
    assert_eq!(
        calls[1].flag_value("--archive"),
        Some(format!("/data/backup/{}", file_name).as_str())
    );
    assert_eq!(words[2][..2], ["docker", "cp"]);
    assert!(path.exists());
}

#[tokio::test]
async fn test_containerized_restore_uses_fixed_in_container_name() {
    let ctx = containerized();
    let archive = aged_archive(ctx.backup_dir(), "testdb-x.gz", 0);
    let mock = MockExecutor::new();
    let service = ctx.service(mock.clone());

    service.restore_backup(&archive).await.assert_ok();

    let calls = mock.get_calls();
    assert_eq!(calls.len(), 3);
    assert_eq!(calls[1].args[2], "mongo_dev:/data/backup/restore.gz");
    assert_eq!(calls[2].flag_value("--archive"), Some("/data/backup/restore.gz"));
    assert!(calls[2].has_arg("--drop"));
}

#[tokio::test]
async fn test_containerized_copy_failure_has_no_rollback() {
    let ctx = containerized();
    let mock = MockExecutor::new().expect("docker cp", MockResponse::fail(1, "no space left"));
    let service = ctx.service(mock.clone());

    match service.create_manual_backup().await {
        Err(BackupError::BackupExecution { step, stderr, .. }) => {
            assert_eq!(step, "copy-to-host");
            assert!(stderr.contains("no space left"));
        }
        other => panic!("Expected BackupExecution, got {:?}", other),
    }
    // Nothing is issued after the failed step
    assert_eq!(mock.get_calls().len(), 3);
    assert!(ctx.backup_files().is_empty());
}

#[tokio::test]
async fn test_containerized_without_container_is_configuration_error() {
    let ctx = containerized();
    let mock = MockExecutor::new();
    let service = ctx.service_with_connection(
        mock.clone(),
        DatastoreConnectionConfig::new("mongodb://localhost:27017", "testdb"),
    );

    let err = service.create_manual_backup().await.unwrap_err();
    assert!(matches!(err, BackupError::Configuration(_)));
    assert!(mock.get_calls().is_empty());
}

#[tokio::test]
async fn test_spawn_failure_maps_to_execution_error() {
    let ctx = TestContext::new();
    let mock = MockExecutor::new().expect(
        "mongodump",
        MockResponse::SpawnError("No such file or directory".to_string()),
    );
    let service = ctx.service(mock);

    let err = service.create_manual_backup().await.unwrap_err();
    assert!(matches!(
        err,
        BackupError::BackupExecution { exit_code: None, .. }
    ));
}
