//! Test fixtures and sample data
//!
//! Archive files with controlled ages, config templates and stand-in
//! dump/restore scripts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

pub const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Write a file and backdate its modification time by `age`
pub fn write_aged_file(dir: &Path, name: &str, content: &[u8], age: Duration) -> PathBuf {
    fs::create_dir_all(dir).expect("Failed to create directory");
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write file");
    set_age(&path, age);
    path
}

/// Write an archive `age_days` days old
pub fn aged_archive(dir: &Path, name: &str, age_days: u64) -> PathBuf {
    write_aged_file(dir, name, b"\x1f\x8barchive", DAY * age_days as u32)
}

/// Backdate the modification time of an existing file
pub fn set_age(path: &Path, age: Duration) {
    let mtime = SystemTime::now() - age;
    fs::File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file")
        .set_modified(mtime)
        .expect("Failed to set modification time");
}

/// Minimal valid config TOML template
pub fn minimal_config_toml() -> &'static str {
    r#"
[global]
backup_directory = "{backup_dir}"
log_directory = "{log_dir}"

[database]
uri = "mongodb://localhost:27017"
name = "testdb"
"#
}

/// Containerized strategy config template
pub fn containerized_config_toml() -> &'static str {
    r#"
[global]
backup_directory = "{backup_dir}"
log_directory = "{log_dir}"
retention_days = 3

[database]
name = "testdb"
container = "mongo_dev"
strategy = "containerized"

[schedule]
daily_at = "02:30:00"
run_on_startup = false

[tools]
container_work_dir = "/data/backup"
timeout_seconds = 600
"#
}

/// Fill the `{backup_dir}` and `{log_dir}` placeholders of a template
pub fn render_config(template: &str, root: &Path) -> String {
    // Forward slashes keep Windows paths valid inside TOML strings
    let backup_dir = root.join("backup").to_string_lossy().replace('\\', "/");
    let log_dir = root.join("logs").to_string_lossy().replace('\\', "/");
    template
        .replace("{backup_dir}", &backup_dir)
        .replace("{log_dir}", &log_dir)
}

/// Shell script standing in for the dump utility.
///
/// Writes the given payload to the `--archive=` path, or exits with
/// `exit_code` and prints to stderr when it is non-zero.
#[cfg(unix)]
pub fn fake_dump_script(dir: &Path, payload: &str, exit_code: i32) -> PathBuf {
    let body = if exit_code == 0 {
        format!(
            r#"for arg in "$@"; do
  case "$arg" in
    --archive=*) printf '%s' '{payload}' > "${{arg#--archive=}}" ;;
  esac
done
exit 0"#
        )
    } else {
        format!("echo 'dump failed: connection refused' >&2\nexit {exit_code}")
    };
    write_script(dir, "fake-mongodump", &body)
}

/// Shell script standing in for the restore utility.
///
/// Appends its arguments to `restore.log` next to the script, or fails
/// with `exit_code` when it is non-zero.
#[cfg(unix)]
pub fn fake_restore_script(dir: &Path, exit_code: i32) -> PathBuf {
    let log = dir.join("restore.log");
    let body = if exit_code == 0 {
        format!("echo \"$@\" >> '{}'\nexit 0", log.display())
    } else {
        format!("echo 'restore failed: bad archive' >&2\nexit {exit_code}")
    };
    write_script(dir, "fake-mongorestore", &body)
}

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    fs::create_dir_all(dir).expect("Failed to create script directory");
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
        .expect("Failed to make script executable");
    path
}
