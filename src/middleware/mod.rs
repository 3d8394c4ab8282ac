//! Server middleware
//!
//! Provides authentication and request logging middleware.

pub mod auth;
pub mod logging;

pub use auth::{CurrentUser, require_auth};
pub use logging::log_request;
