//! Server core
//!
//! Binds the listener and serves the HTTP API until shutdown.

use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;

use crate::api::{AppState, create_router};
use crate::config::ServerConfig;
use crate::error::ServerError;

pub struct Server {
    listener: TcpListener,
    router: Router,
    addr: String,
}

impl Server {
    /// Builds application state from `config` and binds the listening socket.
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let addr = config.server.socket_addr();
        let roots = config.filesystem.supported_paths.join(", ");
        let impersonate = config.filesystem.impersonate;

        let state = AppState::from_config(config)?;
        let router = create_router(state);

        let listener = TcpListener::bind(&addr).await.map_err(|source| {
            error!("Failed to bind to {}: {}", addr, source);
            ServerError::Bind {
                addr: addr.clone(),
                source,
            }
        })?;
        info!("Server bound to {}", addr);
        info!("Supported paths: {}", roots);
        if !impersonate {
            info!("Impersonation disabled; commands run as the server user");
        }

        Ok(Self {
            listener,
            router,
            addr,
        })
    }

    /// Serves requests until Ctrl-C.
    pub async fn start(self) -> Result<(), ServerError> {
        info!("Starting filesystem API server on {}", self.addr);
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
