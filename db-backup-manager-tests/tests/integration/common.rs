//! Common utilities for integration tests
//!
//! This module provides cleanup guards and helper functions for integration tests.

use anyhow::Result;
use std::process::Command;
use std::thread;
use std::time::Duration;

pub const MONGO_IMAGE: &str = "mongo:7";

/// Guard that ensures Docker container cleanup on drop (even on panic)
pub struct ContainerGuard {
    name: String,
}

impl ContainerGuard {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for ContainerGuard {
    fn drop(&mut self) {
        cleanup_container(&self.name);
    }
}

/// Helper to stop and remove a Docker container
/// The -v flag also removes anonymous volumes associated with the container
fn cleanup_container(name: &str) {
    let _ = Command::new("docker").args(["stop", name]).output();
    let _ = Command::new("docker").args(["rm", "-v", name]).output();
}

/// Helper to check if Docker is available
pub fn is_docker_available() -> bool {
    Command::new("docker")
        .args(["ps"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Start a MongoDB container publishing `host_port` and wait until it answers
pub fn start_mongo_container(name: &str, host_port: u16) -> Result<ContainerGuard> {
    cleanup_container(name);

    let output = Command::new("docker")
        .args([
            "run",
            "-d",
            "--name",
            name,
            "-p",
            &format!("{}:27017", host_port),
            MONGO_IMAGE,
        ])
        .output()?;
    if !output.status.success() {
        anyhow::bail!(
            "docker run failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    let guard = ContainerGuard::new(name.to_string());

    for _ in 0..60 {
        if mongosh(name, "testdb", "db.runCommand({ ping: 1 }).ok").is_ok_and(|out| out == "1") {
            return Ok(guard);
        }
        thread::sleep(Duration::from_secs(1));
    }

    Err(anyhow::anyhow!("MongoDB failed to become ready"))
}

/// Evaluate a script with mongosh inside the container and return trimmed stdout
pub fn mongosh(container: &str, db: &str, script: &str) -> Result<String> {
    let output = Command::new("docker")
        .args(["exec", container, "mongosh", "--quiet", db, "--eval", script])
        .output()?;
    if !output.status.success() {
        anyhow::bail!("mongosh failed: {}", String::from_utf8_lossy(&output.stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Helper to create test data
pub fn seed_documents(container: &str, count: usize) -> Result<()> {
    let script = format!(
        "db.items.insertMany(Array.from({{ length: {} }}, (_, i) => ({{ n: i }})))",
        count
    );
    mongosh(container, "testdb", &script)?;
    Ok(())
}

pub fn count_documents(container: &str) -> Result<usize> {
    Ok(mongosh(container, "testdb", "db.items.countDocuments()")?.parse()?)
}

pub fn drop_collection(container: &str) -> Result<()> {
    mongosh(container, "testdb", "db.items.drop()")?;
    Ok(())
}

pub fn host_tools_available() -> bool {
    ["mongodump", "mongorestore"].iter().all(|tool| {
        Command::new(tool)
            .arg("--version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    })
}
