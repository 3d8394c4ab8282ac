//! External command execution
//!
//! Spawns OS utilities and turns their failures into typed errors.

pub mod classifier;
pub mod executor;

pub use classifier::{classify, clean_error};
pub use executor::{CommandOutput, CommandRunner, CommandSpec, ShellExecutor};
