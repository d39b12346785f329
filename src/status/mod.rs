//! Composite resource status updates
//!
//! Creating a pickup occupies one vehicle and two workers; deleting it frees
//! them. [`StatusUpdater`] issues the three status mutations of one
//! composite concurrently and waits for all of them before reporting. A
//! failed sub-call does not roll back the ones that succeeded: the composite
//! reports which resources were left behind and callers treat that as a
//! recoverable inconsistency for reconciliation, never as a reason to undo
//! the pickup record itself.

use std::fmt;
use std::sync::Arc;

use futures::join;

use crate::gateway::{GatewayError, ResourceGateway};
use crate::metrics;
use crate::models::ResourceStatus;

/// Kind of resource a status mutation targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Worker,
    Vehicle,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Worker => write!(f, "worker"),
            Self::Vehicle => write!(f, "vehicle"),
        }
    }
}

/// One failed sub-call of a composite update
#[derive(Debug, Clone)]
pub struct StatusUpdateFailure {
    pub kind: ResourceKind,
    pub resource_id: String,
    pub error: GatewayError,
}

impl fmt::Display for StatusUpdateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.kind, self.resource_id, self.error)
    }
}

/// Composite update failure: at least one of the three sub-calls failed
#[derive(Debug, Clone)]
pub struct StatusUpdateError {
    pub target: ResourceStatus,
    pub failures: Vec<StatusUpdateFailure>,
}

impl fmt::Display for StatusUpdateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<String> = self.failures.iter().map(|f| f.to_string()).collect();
        write!(
            f,
            "{} of 3 updates to '{}' failed: {}",
            self.failures.len(),
            self.target,
            failed.join("; ")
        )
    }
}

impl std::error::Error for StatusUpdateError {}

/// Pushes composite occupancy transitions to the sibling registries
#[derive(Clone)]
pub struct StatusUpdater {
    gateway: Arc<dyn ResourceGateway>,
}

impl StatusUpdater {
    /// Create an updater over the given gateway
    pub fn new(gateway: Arc<dyn ResourceGateway>) -> Self {
        Self { gateway }
    }

    /// Mark both workers and the vehicle `OCCUPIED`
    pub async fn mark_occupied(
        &self,
        worker1_id: &str,
        worker2_id: &str,
        vehicle_id: &str,
    ) -> Result<(), StatusUpdateError> {
        self.update_all(worker1_id, worker2_id, vehicle_id, ResourceStatus::Occupied)
            .await
    }

    /// Mark both workers and the vehicle `AVAILABLE`
    pub async fn mark_available(
        &self,
        worker1_id: &str,
        worker2_id: &str,
        vehicle_id: &str,
    ) -> Result<(), StatusUpdateError> {
        self.update_all(worker1_id, worker2_id, vehicle_id, ResourceStatus::Available)
            .await
    }

    // The three sub-calls run concurrently; the composite completes only
    // when all of them have finished.
    async fn update_all(
        &self,
        worker1_id: &str,
        worker2_id: &str,
        vehicle_id: &str,
        target: ResourceStatus,
    ) -> Result<(), StatusUpdateError> {
        tracing::info!(
            worker1_id,
            worker2_id,
            vehicle_id,
            %target,
            "Pushing composite status update"
        );

        let (w1, w2, v) = join!(
            self.gateway.update_worker_status(worker1_id, target),
            self.gateway.update_worker_status(worker2_id, target),
            self.gateway.update_vehicle_status(vehicle_id, target),
        );

        let mut failures = Vec::new();
        for (kind, id, result) in [
            (ResourceKind::Worker, worker1_id, w1),
            (ResourceKind::Worker, worker2_id, w2),
            (ResourceKind::Vehicle, vehicle_id, v),
        ] {
            if let Err(error) = result {
                tracing::error!(resource = %kind, id, %target, %error, "Status update failed");
                metrics::record_status_update_failure(kind);
                failures.push(StatusUpdateFailure {
                    kind,
                    resource_id: id.to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            tracing::info!(%target, "Composite status update complete");
            Ok(())
        } else {
            Err(StatusUpdateError { target, failures })
        }
    }
}
