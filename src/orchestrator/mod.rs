//! Pickup lifecycle orchestration
//!
//! [`PickupOrchestrator`] is the core of the service: it validates creation
//! requests against the sibling registries, persists pickup records with ids
//! from the generator, and drives the occupancy transitions through the
//! [`StatusUpdater`].
//!
//! Failure model: validation fails closed (a registry that cannot be reached
//! rejects the request, nothing is persisted), while status pushes after the
//! record is durable are allowed to lag. The occupancy push on creation is
//! fire-and-forget; the release push on deletion is awaited before the
//! receipt is returned. Two concurrent creations can both observe a resource
//! as available and double-book it; that race lives in the sibling services
//! and is a documented limitation, not patched here.

use std::sync::Arc;

use crate::config::{OrchestrationConfig, ReleaseOrder, ValidationMode};
use crate::error::{Error, Result};
use crate::gateway::audit::{AuditEvent, EVENT_CREATE_PICKUP, EVENT_DELETE_PICKUP};
use crate::gateway::{AuditLogClient, ResourceGateway};
use crate::idgen::IdGenerator;
use crate::metrics;
use crate::models::{
    CreatePickupRequest, DeletionReceipt, Pickup, MIN_SLOT_MINUTES,
};
use crate::status::StatusUpdater;
use crate::storage::SharedPickupStore;

/// Orchestrates the pickup lifecycle across store and sibling services
pub struct PickupOrchestrator {
    store: SharedPickupStore,
    gateway: Arc<dyn ResourceGateway>,
    updater: StatusUpdater,
    id_generator: IdGenerator,
    audit: Option<Arc<AuditLogClient>>,
    config: OrchestrationConfig,
}

impl PickupOrchestrator {
    /// Create an orchestrator; the id generator is seeded from the store
    pub fn new(
        store: SharedPickupStore,
        gateway: Arc<dyn ResourceGateway>,
        config: OrchestrationConfig,
    ) -> Result<Self> {
        let id_generator = IdGenerator::from_store(store.as_ref())?;
        let updater = StatusUpdater::new(gateway.clone());

        Ok(Self {
            store,
            gateway,
            updater,
            id_generator,
            audit: None,
            config,
        })
    }

    /// Attach an audit log client
    pub fn with_audit(mut self, audit: AuditLogClient) -> Self {
        self.audit = Some(Arc::new(audit));
        self
    }

    /// Create a new pickup
    ///
    /// Returns the generated id as soon as the record is persisted. The
    /// occupancy push for the vehicle and both workers runs in the
    /// background; its failure is recorded as a partial status-update
    /// failure and never rolls the record back.
    pub async fn create_pickup(&self, request: CreatePickupRequest) -> Result<String> {
        tracing::info!(
            zone_id = %request.zone_id,
            vehicle_id = %request.vehicle_id,
            worker1_id = %request.worker1_id,
            worker2_id = %request.worker2_id,
            "Creating pickup"
        );

        self.validate_locally(&request)?;

        if self.config.validation_mode == ValidationMode::Strict {
            self.validate_against_registries(&request).await?;
        }

        let id = self.id_generator.next_id();
        let pickup = Pickup {
            id: id.clone(),
            zone_id: request.zone_id,
            time_slot_start: request.time_slot_start,
            time_slot_end: request.time_slot_end,
            frequency: request.frequency,
            location_name: request.location_name,
            vehicle_id: request.vehicle_id,
            worker1_id: request.worker1_id,
            worker2_id: request.worker2_id,
            status: self.config.initial_status,
        };

        self.store.insert(&pickup)?;
        metrics::record_pickup_created();
        tracing::info!(pickup_id = %id, "Pickup persisted");

        self.record_audit_event(EVENT_CREATE_PICKUP, format!("Created pickup {id}"));

        // Fire-and-forget: the response does not wait for the occupancy
        // push, but the push itself completes all three sub-updates (or
        // reports failure) as a unit.
        let updater = self.updater.clone();
        let (w1, w2, v) = (
            pickup.worker1_id.clone(),
            pickup.worker2_id.clone(),
            pickup.vehicle_id.clone(),
        );
        let pickup_id = id.clone();
        tokio::spawn(async move {
            if let Err(error) = updater.mark_occupied(&w1, &w2, &v).await {
                tracing::error!(
                    pickup_id = %pickup_id,
                    %error,
                    "Occupancy push failed after creation; remote status lags the record"
                );
            }
        });

        Ok(id)
    }

    /// Delete a pickup and free its resources
    ///
    /// The release push is awaited before the receipt is returned. The
    /// configured [`ReleaseOrder`] decides whether the record or the
    /// resources go first; see the config module for the trade-off.
    pub async fn delete_pickup(&self, pickup_id: &str) -> Result<DeletionReceipt> {
        tracing::info!(pickup_id, "Deleting pickup");

        let pickup = self
            .store
            .get(pickup_id)?
            .ok_or_else(|| Error::not_found(pickup_id))?;

        match self.config.release_order {
            ReleaseOrder::DeleteFirst => {
                self.store.delete(pickup_id)?;
                tracing::info!(pickup_id, "Pickup record removed");

                if let Err(error) = self
                    .updater
                    .mark_available(&pickup.worker1_id, &pickup.worker2_id, &pickup.vehicle_id)
                    .await
                {
                    // The deletion stands: the record is the source of
                    // truth and stale remote status is reconciled elsewhere.
                    tracing::error!(pickup_id, %error, "Release push failed after deletion");
                }
            }
            ReleaseOrder::ReleaseFirst => {
                self.updater
                    .mark_available(&pickup.worker1_id, &pickup.worker2_id, &pickup.vehicle_id)
                    .await?;

                self.store.delete(pickup_id)?;
                tracing::info!(pickup_id, "Pickup record removed");
            }
        }

        metrics::record_pickup_deleted();
        self.record_audit_event(EVENT_DELETE_PICKUP, format!("Deleted pickup {pickup_id}"));

        Ok(DeletionReceipt::new(pickup_id))
    }

    /// List all stored pickups, storage iteration order
    pub fn list_pickups(&self) -> Result<Vec<Pickup>> {
        let all = self.store.list_all()?;
        tracing::debug!(count = all.len(), "Listed pickups");
        Ok(all)
    }

    /// Get one pickup by id
    pub fn get_pickup(&self, pickup_id: &str) -> Result<Pickup> {
        self.store
            .get(pickup_id)?
            .ok_or_else(|| Error::not_found(pickup_id))
    }

    // ------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------

    fn validate_locally(&self, request: &CreatePickupRequest) -> Result<()> {
        for (field, value) in [
            ("zoneId", &request.zone_id),
            ("locationName", &request.location_name),
            ("vehicleId", &request.vehicle_id),
            ("worker1Id", &request.worker1_id),
            ("worker2Id", &request.worker2_id),
        ] {
            if value.trim().is_empty() {
                return Err(self.reject(format!("{field} must not be blank")));
            }
        }

        let min_end = request.time_slot_start + chrono::Duration::minutes(MIN_SLOT_MINUTES);
        if request.time_slot_end < min_end {
            return Err(self.reject(format!(
                "End time must be at least {MIN_SLOT_MINUTES} minutes after start time"
            )));
        }

        if request.worker1_id == request.worker2_id {
            return Err(self.reject("worker1Id and worker2Id must be distinct"));
        }

        Ok(())
    }

    async fn validate_against_registries(&self, request: &CreatePickupRequest) -> Result<()> {
        let zones = self.gateway.list_zones().await?;
        if !zones.iter().any(|z| z.id == request.zone_id) {
            return Err(self.reject(format!("Zone not found: {}", request.zone_id)));
        }
        tracing::debug!(zone_id = %request.zone_id, "Zone validated");

        let vehicle = self.gateway.get_vehicle(&request.vehicle_id).await?;
        match vehicle {
            None => {
                return Err(self.reject(format!("Vehicle not found: {}", request.vehicle_id)));
            }
            Some(v) if !v.status.is_available() => {
                return Err(self.reject(format!(
                    "Vehicle not available: {} ({})",
                    v.id, v.status
                )));
            }
            Some(_) => {}
        }
        tracing::debug!(vehicle_id = %request.vehicle_id, "Vehicle validated");

        for worker_id in request.worker_ids() {
            let worker = self.gateway.get_worker(worker_id).await?;
            match worker {
                None => {
                    return Err(self.reject(format!("Worker not found: {worker_id}")));
                }
                Some(w) if !w.status.is_available() => {
                    return Err(self.reject(format!(
                        "Worker not available: {} ({})",
                        w.id, w.status
                    )));
                }
                Some(_) => {}
            }
        }
        tracing::debug!(
            worker1_id = %request.worker1_id,
            worker2_id = %request.worker2_id,
            "Workers validated"
        );

        Ok(())
    }

    fn reject(&self, message: impl Into<String>) -> Error {
        metrics::record_validation_rejection();
        Error::invalid_request(message)
    }

    fn record_audit_event(&self, event_type: &str, details: String) {
        if let Some(audit) = self.audit.clone() {
            let event = AuditEvent::new(event_type, details);
            tokio::spawn(async move {
                audit.record(event).await;
            });
        }
    }
}
