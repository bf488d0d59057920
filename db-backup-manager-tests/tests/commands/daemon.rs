//! Tests for the 'daemon' command: the scheduler loop

use db_backup_manager::managers::scheduler::Scheduler;
use std::sync::Arc;
use std::time::Duration;
use test_utils::*;
use tokio::sync::watch;

fn midnight() -> chrono::NaiveTime {
    db_backup_manager::config::parse_daily_time("00:00:00").unwrap()
}

#[tokio::test]
async fn test_scheduler_from_config_rejects_bad_time() {
    let ctx = TestContext::new();
    let service = Arc::new(ctx.service(MockExecutor::new()));
    let schedule = ScheduleConfig {
        enabled: true,
        daily_at: "25:00:00".to_string(),
        run_on_startup: false,
    };

    assert!(Scheduler::from_config(service, &schedule).is_err());
}

#[tokio::test]
async fn test_daemon_without_startup_run_does_nothing_until_shutdown() {
    let ctx = TestContext::new();
    let mock = MockExecutor::new().simulate_dump("mongodump");
    let service = Arc::new(ctx.service(mock.clone()));
    let scheduler = Scheduler::from_config(service, &ctx.config().schedule).unwrap();

    let (tx, rx) = watch::channel(false);
    let handle = scheduler.spawn(rx);
    tokio::time::sleep(Duration::from_millis(50)).await;
    tx.send(true).unwrap();

    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("scheduler did not stop")
        .unwrap();
    assert!(mock.get_calls().is_empty());
}

#[tokio::test]
async fn test_startup_run_backs_up_and_prunes() {
    let ctx = TestContext::new();
    aged_archive(ctx.backup_dir(), "testdb-ancient.gz", 30);
    let mock = MockExecutor::new().simulate_dump("mongodump");
    let service = Arc::new(ctx.service(mock.clone()));
    let scheduler = Scheduler::new(service, midnight(), true);

    let archive = scheduler.run_daily_job().await.assert_some();

    assert!(archive.exists());
    assert_eq!(ctx.backup_files().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_scheduled_run_skips_when_job_in_progress() {
    let ctx = TestContext::new();
    let mock = MockExecutor::new().on("mongodump", |call| {
        std::thread::sleep(Duration::from_millis(300));
        fake_dump(call)
    });
    let service = Arc::new(ctx.service(mock.clone()));

    let manual = tokio::spawn({
        let service = service.clone();
        async move { service.create_manual_backup().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let scheduler = Scheduler::new(service, midnight(), false);
    assert_eq!(scheduler.run_daily_job().await, None);

    manual.await.unwrap().assert_ok();
    assert_eq!(mock.call_count("mongodump"), 1);
}
