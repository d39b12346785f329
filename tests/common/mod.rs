//! Shared test fixtures
//!
//! [`FakeResourceGateway`] stands in for the three sibling registries: it
//! serves a small fixed fleet, records every status mutation, and can be
//! told to fail specific resource ids or to drop off the network entirely.

// Not every test binary uses every fixture
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};

use wastewise_pickup::gateway::{GatewayError, ResourceGateway};
use wastewise_pickup::models::{
    CreatePickupRequest, Frequency, ResourceStatus, Vehicle, Worker, Zone,
};
use wastewise_pickup::orchestrator::PickupOrchestrator;
use wastewise_pickup::prelude::Config;
use wastewise_pickup::storage::{MemoryPickupStore, SharedPickupStore};

/// Fake registry backend for orchestrator and API tests
#[derive(Default)]
pub struct FakeResourceGateway {
    statuses: Mutex<HashMap<String, ResourceStatus>>,
    fail_ids: Mutex<Vec<String>>,
    unreachable: Mutex<bool>,
    mutation_calls: AtomicUsize,
}

impl FakeResourceGateway {
    /// Fleet of one zone (`Z001`), two workers (`W001`, `W002`), and one
    /// vehicle (`V001`), all available.
    pub fn with_default_fleet() -> Self {
        let gateway = Self::default();
        for id in ["W001", "W002", "V001"] {
            gateway.set_status(id, ResourceStatus::Available);
        }
        gateway
    }

    pub fn set_status(&self, id: &str, status: ResourceStatus) {
        self.statuses
            .lock()
            .unwrap()
            .insert(id.to_string(), status);
    }

    pub fn status_of(&self, id: &str) -> Option<ResourceStatus> {
        self.statuses.lock().unwrap().get(id).copied()
    }

    /// Make status mutations against the given id fail with a 503
    pub fn fail_updates_for(&self, id: &str) {
        self.fail_ids.lock().unwrap().push(id.to_string());
    }

    /// Make every call fail with a timeout
    pub fn go_offline(&self) {
        *self.unreachable.lock().unwrap() = true;
    }

    pub fn mutation_count(&self) -> usize {
        self.mutation_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), GatewayError> {
        if *self.unreachable.lock().unwrap() {
            return Err(GatewayError::Timeout);
        }
        Ok(())
    }

    fn apply(&self, id: &str, status: ResourceStatus) -> Result<(), GatewayError> {
        self.mutation_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        if self.fail_ids.lock().unwrap().iter().any(|f| f == id) {
            return Err(GatewayError::Http {
                status: 503,
                message: format!("registry rejected update for {id}"),
            });
        }
        self.set_status(id, status);
        Ok(())
    }
}

#[async_trait::async_trait]
impl ResourceGateway for FakeResourceGateway {
    async fn list_zones(&self) -> Result<Vec<Zone>, GatewayError> {
        self.check_online()?;
        Ok(vec![Zone {
            id: "Z001".to_string(),
            name: "Old Town".to_string(),
        }])
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, GatewayError> {
        self.check_online()?;
        let mut workers = Vec::new();
        for id in ["W001", "W002"] {
            if let Some(worker) = self.get_worker(id).await? {
                workers.push(worker);
            }
        }
        Ok(workers)
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, GatewayError> {
        self.check_online()?;
        Ok(self.get_vehicle("V001").await?.into_iter().collect())
    }

    async fn get_worker(&self, id: &str) -> Result<Option<Worker>, GatewayError> {
        self.check_online()?;
        Ok(self
            .status_of(id)
            .filter(|_| id.starts_with('W'))
            .map(|status| Worker {
                id: id.to_string(),
                name: format!("Worker {id}"),
                status,
                skill: Some("collection".to_string()),
            }))
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, GatewayError> {
        self.check_online()?;
        Ok(self
            .status_of(id)
            .filter(|_| id.starts_with('V'))
            .map(|status| Vehicle {
                id: id.to_string(),
                vehicle_type: "compactor".to_string(),
                license_plate: "34-AB-123".to_string(),
                status,
                capacity: Some(12.5),
            }))
    }

    async fn update_worker_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError> {
        self.apply(id, status)
    }

    async fn update_vehicle_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError> {
        self.apply(id, status)
    }
}

/// Orchestrator over an in-memory store and the given gateway, default config
pub fn orchestrator_over(gateway: Arc<FakeResourceGateway>) -> PickupOrchestrator {
    let store: SharedPickupStore = Arc::new(MemoryPickupStore::new());
    PickupOrchestrator::new(store, gateway, Config::default().orchestration)
        .expect("orchestrator construction")
}

/// Creation request referencing the default fleet
pub fn fleet_request() -> CreatePickupRequest {
    let start = Utc::now() + Duration::hours(1);
    CreatePickupRequest {
        zone_id: "Z001".to_string(),
        time_slot_start: start,
        time_slot_end: start + Duration::hours(2),
        frequency: Frequency::Weekly,
        location_name: "Market Square".to_string(),
        vehicle_id: "V001".to_string(),
        worker1_id: "W001".to_string(),
        worker2_id: "W002".to_string(),
    }
}

/// Poll until the condition holds or roughly a second passes
pub async fn eventually(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("condition not reached within deadline");
}
