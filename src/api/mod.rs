//! HTTP API router.
//!
//! Maps REST endpoints under `<application_root>/filesystem` onto
//! [`FilesystemApi`] calls.

pub mod filesystem;
pub mod negotiation;
pub mod openapi;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{Redirect, Response};
use axum::routing::get;
use axum::{Router, middleware};
use std::sync::Arc;

use crate::auth::{self, Authenticator};
use crate::config::ServerConfig;
use crate::error::{AuthError, status_response};
use crate::middleware::{log_request, require_auth};
use crate::shell::{CommandRunner, ShellExecutor};
use crate::storage::FilesystemApi;

/// Application state shared with handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub filesystem: FilesystemApi,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        runner: Arc<dyn CommandRunner>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        let filesystem = FilesystemApi::new(runner, &config.filesystem);
        Self {
            config: Arc::new(config),
            filesystem,
            authenticator,
        }
    }

    /// State backed by real child processes and the configured auth backend.
    pub fn from_config(config: ServerConfig) -> Result<Self, AuthError> {
        let runner = Arc::new(ShellExecutor::new(config.filesystem.command_timeout()));
        let authenticator = auth::from_config(&config.auth)?;
        Ok(Self::new(config, runner, authenticator))
    }
}

/// Creates the router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let body_limit = state.config.filesystem.max_upload_size_bytes();

    let protected = Router::new()
        .route(
            "/filesystem/{*path}",
            get(filesystem::get_path)
                .post(filesystem::upload)
                .put(filesystem::update)
                .delete(filesystem::delete),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let api = Router::new()
        .route(
            "/filesystem/supported-paths",
            get(filesystem::supported_paths),
        )
        .route("/openapi.json", get(openapi::serve))
        .merge(protected)
        .method_not_allowed_fallback(method_not_allowed);

    let app = match state.config.server.mount_point() {
        Some(prefix) => Router::new().nest(&prefix, api),
        None => api,
    };

    // Set again for `/`, which is registered after nesting.
    app.route("/", get(index))
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

/// Redirects the bare root to the API description.
async fn index(State(state): State<AppState>) -> Redirect {
    let prefix = state.config.server.mount_point().unwrap_or_default();
    Redirect::temporary(&format!("{prefix}/openapi.json"))
}

async fn method_not_allowed() -> Response {
    status_response(
        StatusCode::METHOD_NOT_ALLOWED,
        "the method is not allowed for the requested URL",
    )
}

async fn not_found() -> Response {
    status_response(
        StatusCode::NOT_FOUND,
        "the requested URL was not found on the server",
    )
}
