//! Server core functionality
//!
//! Wires configuration, application state and the HTTP listener together.

pub mod core;

pub use core::Server;
