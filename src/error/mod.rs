//! Error handling
//!
//! Defines error types and their HTTP translation.

pub mod handlers;
pub mod types;

pub use handlers::{ApiError, StatusBody, error_to_status, status_response};
pub use types::*;
