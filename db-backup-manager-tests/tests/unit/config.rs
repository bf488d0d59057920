//! Configuration loading and connection resolution

use db_backup_manager::config::{
    self, load_config, parse_config, ConnectionProvider, EnvConnectionProvider,
    DATABASE_URL_ENV, DB_CONTAINER_ENV, DB_NAME_ENV, RETENTION_DAYS_ENV,
};
use rstest::rstest;
use serial_test::serial;
use test_utils::*;

fn clear_env() {
    for key in [DATABASE_URL_ENV, DB_NAME_ENV, DB_CONTAINER_ENV, RETENTION_DAYS_ENV] {
        std::env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_minimal_template_defaults() {
    clear_env();
    let ctx = TestContext::new();
    let config = parse_config(&render_config(minimal_config_toml(), ctx.temp_dir())).unwrap();

    assert_eq!(config.global.retention_days, 7);
    assert_eq!(config.database.strategy, StrategyKind::Direct);
    assert!(config.schedule.enabled);
    assert_eq!(config.schedule.daily_at, "00:00:00");
    assert_eq!(config.tools.dump_program, "mongodump");
    assert_eq!(config.tools.container_work_dir, "/data/backup");
    assert_eq!(config.tools.timeout_seconds, None);
}

#[test]
#[serial]
fn test_retention_env_override() {
    clear_env();
    std::env::set_var(RETENTION_DAYS_ENV, "14");
    let ctx = TestContext::new();
    let result = load_config(ctx.config_path());
    clear_env();

    assert_eq!(result.unwrap().global.retention_days, 14);
}

#[test]
#[serial]
fn test_invalid_retention_env_is_rejected() {
    clear_env();
    std::env::set_var(RETENTION_DAYS_ENV, "a week");
    let ctx = TestContext::new();
    let result = load_config(ctx.config_path());
    clear_env();

    result.assert_err_contains(RETENTION_DAYS_ENV);
}

#[rstest]
#[case("retention_days = 0", "retention_days")]
#[case("log_max_files = 0", "log_max_files")]
#[serial]
fn test_invalid_global_values(#[case] line: &str, #[case] needle: &str) {
    clear_env();
    let toml = format!("[global]\n{}\n\n[database]\nname = \"testdb\"\n", line);
    parse_config(&toml).assert_err_contains(needle);
}

#[rstest]
#[case("24:00:00")]
#[case("noon")]
#[case("7:5")]
#[serial]
fn test_invalid_daily_time(#[case] daily_at: &str) {
    clear_env();
    let toml = format!("[database]\nname = \"testdb\"\n\n[schedule]\ndaily_at = \"{}\"\n", daily_at);
    assert!(parse_config(&toml).is_err());
}

#[test]
#[serial]
fn test_missing_database_section_fails() {
    clear_env();
    assert!(parse_config("[global]\nretention_days = 3\n").is_err());
}

#[test]
#[serial]
fn test_unknown_strategy_fails() {
    clear_env();
    assert!(parse_config("[database]\nstrategy = \"ssh\"\n").is_err());
}

#[test]
fn test_nonexistent_file() {
    let result = load_config(std::path::Path::new("/nonexistent/config.toml"));
    assert!(matches!(result, Err(config::ConfigError::ReadError(_))));
}

#[test]
#[serial]
fn test_environment_wins_over_file_per_call() {
    clear_env();
    let config = ConfigBuilder::containerized("from-file").build();
    let provider = EnvConnectionProvider::new(config.database.clone());

    let before = provider.connection();
    assert_eq!(before.container.as_deref(), Some("from-file"));
    assert_eq!(before.db_name, "testdb");

    // Changes are picked up on the next call without reloading
    std::env::set_var(DATABASE_URL_ENV, "mongodb://env-host:27017");
    std::env::set_var(DB_CONTAINER_ENV, "from-env");
    let after = provider.connection();
    clear_env();

    assert_eq!(after.uri, "mongodb://env-host:27017");
    assert_eq!(after.container.as_deref(), Some("from-env"));
    assert_eq!(after.db_name, "testdb");
}
