//! HTTP server for the pickup service
//!
//! Wires the orchestrator, gateway, and store together into an axum
//! application and owns the listener lifecycle.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::{AuditLogClient, HttpResourceGateway, ResourceGateway};
use crate::orchestrator::PickupOrchestrator;
use crate::resources::ResourceCatalog;
use crate::storage::{SharedPickupStore, SqlitePickupStore};

pub mod api;

use api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Pickup lifecycle orchestrator
    pub orchestrator: Arc<PickupOrchestrator>,

    /// Aggregated registry browsing
    pub catalog: Arc<ResourceCatalog>,

    /// Server start time
    pub start_time: Instant,
}

// ============================================================================
// Pickup Server
// ============================================================================

/// Main pickup service server
pub struct PickupServer {
    config: Config,
    state: AppState,
}

impl PickupServer {
    /// Create a server from validated configuration
    ///
    /// Opens the SQLite store at the configured path and builds the REST
    /// gateway over the configured sibling endpoints.
    pub fn new(config: Config) -> Result<Self> {
        config
            .validate()
            .map_err(|e| Error::config(e.to_string()))?;

        let store: SharedPickupStore =
            Arc::new(SqlitePickupStore::new(&config.database.sqlite_path)?);

        let gateway: Arc<dyn ResourceGateway> =
            Arc::new(HttpResourceGateway::new(&config.services)?);

        let mut orchestrator =
            PickupOrchestrator::new(store, gateway.clone(), config.orchestration.clone())?;
        if let Some(audit) = AuditLogClient::from_endpoints(&config.services)? {
            orchestrator = orchestrator.with_audit(audit);
        }

        let state = AppState {
            orchestrator: Arc::new(orchestrator),
            catalog: Arc::new(ResourceCatalog::new(gateway)),
            start_time: Instant::now(),
        };

        Ok(Self { config, state })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.server.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start the server
    pub async fn start(&self) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.server.bind_address;

        tracing::info!("Starting pickup server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, router)
            .await
            .map_err(|e| Error::other(format!("Server error: {e}")))?;

        Ok(())
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let router = self.build_router();
        let addr = self.config.server.bind_address;

        tracing::info!("Starting pickup server on {} (with graceful shutdown)", addr);

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::config(format!("Failed to bind {addr}: {e}")))?;

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| Error::other(format!("Server error: {e}")))?;

        tracing::info!("Pickup server shutdown complete");
        Ok(())
    }
}
