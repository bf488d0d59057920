pub mod command;
pub mod docker;
pub mod locker;

// Trait-based abstraction for testability
pub mod executor;

// Re-export commonly used types and traits (used by test crate)
pub use command::CommandOutput;
pub use executor::{CommandExecutor, RealExecutor};
