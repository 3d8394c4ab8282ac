pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod server;
pub mod shell;
pub mod storage;

pub use api::{AppState, create_router};
pub use server::Server;
