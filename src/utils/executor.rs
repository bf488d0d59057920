//! Process seam for the dump, restore and container tools
//!
//! Strategies run `mongodump`, `mongorestore` and the container runtime CLI
//! through [`CommandExecutor`], so a scripted executor can stand in for them.

use super::command::CommandOutput;
use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Runs one external tool invocation
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Run a program to completion and capture its output.
    ///
    /// Returns `Err` only when the process could not be started or timed out.
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput>;
}

/// Spawns the tool as a child process
#[derive(Debug, Clone, Default)]
pub struct RealExecutor;

impl RealExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for RealExecutor {
    async fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Option<Duration>,
    ) -> Result<CommandOutput> {
        super::command::run_command(program, args, None, timeout).await
    }
}

/// Scripted executor that records tool invocations and answers them from
/// configured responses, writing fake archives where a dump or copy would.
/// Public so the workspace test crate can share it.
pub mod mock {
    use super::*;
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    /// Bytes written by the fake dump/copy handlers
    pub const FAKE_ARCHIVE_BYTES: &[u8] = b"\x1f\x8b\x08\x00fake-archive";

    /// Recorded command invocation
    #[derive(Clone, Debug)]
    pub struct CommandCall {
        pub program: String,
        pub args: Vec<String>,
    }

    impl CommandCall {
        /// Program followed by its arguments
        pub fn words(&self) -> Vec<&str> {
            std::iter::once(self.program.as_str())
                .chain(self.args.iter().map(|s| s.as_str()))
                .collect()
        }

        /// Value of a `--name=value` argument
        pub fn flag_value(&self, name: &str) -> Option<&str> {
            let prefix = format!("{}=", name);
            self.args
                .iter()
                .find_map(|a| a.strip_prefix(prefix.as_str()))
        }

        pub fn has_arg(&self, arg: &str) -> bool {
            self.args.iter().any(|a| a == arg)
        }
    }

    /// Scripted outcome of one invocation
    #[derive(Clone, Debug)]
    pub enum MockResponse {
        Success { stdout: String, stderr: String },
        Failure { stderr: String, exit_code: i32 },
        SpawnError(String),
        Timeout,
    }

    impl MockResponse {
        pub fn ok() -> Self {
            Self::default()
        }

        pub fn fail(exit_code: i32, stderr: &str) -> Self {
            MockResponse::Failure {
                stderr: stderr.to_string(),
                exit_code,
            }
        }
    }

    impl Default for MockResponse {
        fn default() -> Self {
            MockResponse::Success {
                stdout: String::new(),
                stderr: String::new(),
            }
        }
    }

    pub type MockHandler = Arc<dyn Fn(&CommandCall) -> MockResponse + Send + Sync>;

    /// Scripted stand-in for the datastore and container tools.
    ///
    /// Responses and handlers are keyed by a command prefix such as
    /// `"mongodump"` or `"docker cp"`; the longest matching prefix wins.
    #[derive(Clone, Default)]
    pub struct MockExecutor {
        /// Recorded command invocations
        pub calls: Arc<Mutex<Vec<CommandCall>>>,
        responses: Arc<Mutex<Vec<(String, MockHandler)>>>,
        default_response: Arc<Mutex<MockResponse>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            Self::default()
        }

        /// Configure a fixed response for a command prefix
        pub fn expect(self, prefix: &str, response: MockResponse) -> Self {
            self.on(prefix, move |_| response.clone())
        }

        /// Configure a handler for a command prefix
        pub fn on<F>(self, prefix: &str, handler: F) -> Self
        where
            F: Fn(&CommandCall) -> MockResponse + Send + Sync + 'static,
        {
            self.responses
                .lock()
                .unwrap()
                .push((prefix.to_string(), Arc::new(handler)));
            self
        }

        /// Set the default response for unconfigured programs
        pub fn with_default_response(self, response: MockResponse) -> Self {
            *self.default_response.lock().unwrap() = response;
            self
        }

        /// Make `program` write a fake archive to its `--archive=` path
        pub fn simulate_dump(self, program: &str) -> Self {
            self.on(program, fake_dump)
        }

        /// Make `<runtime> cp` write a fake archive when copying to the host
        pub fn simulate_copy(self, runtime: &str) -> Self {
            self.on(&format!("{} cp", runtime), fake_copy)
        }

        /// Get all recorded calls
        pub fn get_calls(&self) -> Vec<CommandCall> {
            self.calls.lock().unwrap().clone()
        }

        /// Check if a program was called
        pub fn was_called(&self, program: &str) -> bool {
            self.call_count(program) > 0
        }

        /// Get number of calls whose command line starts with `prefix`
        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|c| prefix_matches(prefix, c))
                .count()
        }

        fn handler_for(&self, call: &CommandCall) -> Option<MockHandler> {
            self.responses
                .lock()
                .unwrap()
                .iter()
                .filter(|(prefix, _)| prefix_matches(prefix, call))
                .max_by_key(|(prefix, _)| prefix.split_whitespace().count())
                .map(|(_, handler)| handler.clone())
        }
    }

    fn prefix_matches(prefix: &str, call: &CommandCall) -> bool {
        let words = call.words();
        let wanted: Vec<&str> = prefix.split_whitespace().collect();
        wanted.len() <= words.len() && wanted.iter().zip(words.iter()).all(|(a, b)| a == b)
    }

    /// Write a fake archive to the `--archive=` path of a dump call
    pub fn fake_dump(call: &CommandCall) -> MockResponse {
        match call.flag_value("--archive") {
            Some(path) => write_fake_archive(Path::new(path)),
            None => MockResponse::fail(1, "no --archive argument"),
        }
    }

    /// Write a fake archive to the host destination of a `cp` call.
    /// Copies into the container (`ctr:/path` destination) succeed without effect.
    pub fn fake_copy(call: &CommandCall) -> MockResponse {
        // args: ["cp", src, dest]
        match call.args.get(2) {
            Some(dest) if dest.contains(':') => MockResponse::ok(),
            Some(dest) => write_fake_archive(Path::new(dest)),
            None => MockResponse::fail(1, "cp requires source and destination"),
        }
    }

    fn write_fake_archive(path: &Path) -> MockResponse {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                return MockResponse::fail(1, &e.to_string());
            }
        }
        match std::fs::write(path, FAKE_ARCHIVE_BYTES) {
            Ok(()) => MockResponse::ok(),
            Err(e) => MockResponse::fail(1, &e.to_string()),
        }
    }

    #[async_trait]
    impl CommandExecutor for MockExecutor {
        async fn run(
            &self,
            program: &str,
            args: &[String],
            _timeout: Option<Duration>,
        ) -> Result<CommandOutput> {
            let call = CommandCall {
                program: program.to_string(),
                args: args.to_vec(),
            };
            self.calls.lock().unwrap().push(call.clone());

            let response = match self.handler_for(&call) {
                Some(handler) => handler(&call),
                None => self.default_response.lock().unwrap().clone(),
            };

            match response {
                MockResponse::Success { stdout, stderr } => Ok(CommandOutput {
                    exit_code: Some(0),
                    stdout,
                    stderr,
                }),
                MockResponse::Failure { stderr, exit_code } => Ok(CommandOutput {
                    exit_code: Some(exit_code),
                    stdout: String::new(),
                    stderr,
                }),
                MockResponse::SpawnError(message) => {
                    anyhow::bail!("Failed to execute {}: {}", program, message)
                }
                MockResponse::Timeout => {
                    anyhow::bail!("{} timed out", program)
                }
            }
        }
    }
}
