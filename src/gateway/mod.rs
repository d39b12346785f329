//! Typed gateway to the sibling registries
//!
//! The orchestrator and the resource catalog depend only on the
//! [`ResourceGateway`] trait: per-id and bulk reads used during validation
//! and browsing, and two status mutations used by the composite occupancy
//! updates. [`client::HttpResourceGateway`] is the REST implementation;
//! tests inject fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ResourceStatus, Vehicle, Worker, Zone};

pub mod audit;
pub mod client;

pub use audit::AuditLogClient;
pub use client::HttpResourceGateway;

/// Errors from sibling-service communication
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// Client could not be constructed
    #[error("Gateway initialization error: {0}")]
    Init(String),

    /// Request could not be sent or the connection dropped
    #[error("Network error: {0}")]
    Network(String),

    /// The call exceeded its bounded timeout
    #[error("Request timed out")]
    Timeout,

    /// Sibling service answered with a non-success status
    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),
}

impl GatewayError {
    /// Whether retrying the same call may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Init(_) | Self::Parse(_) => false,
        }
    }
}

/// Read and status-mutation contract against the zone, worker, and vehicle
/// registries
///
/// Readers return `None` for a resource the owning service does not know;
/// transport-level failures surface as [`GatewayError`] so validation can
/// fail closed.
#[async_trait]
pub trait ResourceGateway: Send + Sync {
    /// List all zones
    async fn list_zones(&self) -> Result<Vec<Zone>, GatewayError>;

    /// List all workers, regardless of status
    async fn list_workers(&self) -> Result<Vec<Worker>, GatewayError>;

    /// List all vehicles, regardless of status
    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, GatewayError>;

    /// Get one worker by id, or `None` if unknown
    async fn get_worker(&self, id: &str) -> Result<Option<Worker>, GatewayError>;

    /// Get one vehicle by id, or `None` if unknown
    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, GatewayError>;

    /// Push a worker status mutation
    async fn update_worker_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError>;

    /// Push a vehicle status mutation
    async fn update_vehicle_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError>;
}
