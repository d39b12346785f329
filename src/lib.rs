//! wastewise-pickup - Waste pickup scheduling service
//!
//! Microservice that schedules waste-collection pickups across a fleet of
//! sibling registries. Creating a pickup validates the referenced zone,
//! vehicle, and workers against their owning services, persists the record,
//! and pushes the occupancy transition to all three resources concurrently.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and behavior switches
//! - [`models`] - Core data structures and wire types
//! - [`storage`] - Pickup persistence (SQLite, in-memory)
//! - [`idgen`] - Sequential pickup id generation
//! - [`gateway`] - REST clients for the sibling registries
//! - [`status`] - Concurrent composite resource status updates
//! - [`resources`] - Aggregated resource browsing for creation forms
//! - [`orchestrator`] - Pickup lifecycle orchestration
//! - [`server`] - HTTP API
//! - [`metrics`] - Prometheus instrumentation
//!
//! # Example
//!
//! ```no_run
//! use wastewise_pickup::config::Config;
//! use wastewise_pickup::server::PickupServer;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let server = PickupServer::new(config)?;
//!     server.start().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod gateway;
pub mod idgen;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod resources;
pub mod server;
pub mod status;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, ReleaseOrder, ValidationMode};
    pub use crate::error::{Error, ErrorCategory, Result};
    pub use crate::gateway::{GatewayError, ResourceGateway};
    pub use crate::models::{CreatePickupRequest, DeletionReceipt, Pickup, PickupStatus};
    pub use crate::orchestrator::PickupOrchestrator;
    pub use crate::server::PickupServer;
    pub use crate::storage::{PickupStore, SharedPickupStore};
}

// Direct re-exports for convenience
pub use models::{CreatePickupRequest, DeletionReceipt, Pickup, PickupStatus, ResourceStatus};
