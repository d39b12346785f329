//! Resource browsing across the sibling registries
//!
//! [`ResourceCatalog`] aggregates the three registries into the view a
//! scheduling frontend uses to populate the creation form: every zone, plus
//! the workers and vehicles that are currently `AVAILABLE`. The combined
//! listing fetches all three registries concurrently; a registry that cannot
//! be reached fails the whole aggregation, since a form built from a partial
//! fleet would invite requests that validation then rejects.

use std::sync::Arc;

use futures::join;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::gateway::ResourceGateway;
use crate::models::{Vehicle, Worker, Zone};

/// Combined registry view for pickup creation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableResources {
    pub zones: Vec<Zone>,
    pub workers: Vec<Worker>,
    pub vehicles: Vec<Vehicle>,
}

/// Read-only aggregation over the sibling registries
pub struct ResourceCatalog {
    gateway: Arc<dyn ResourceGateway>,
}

impl ResourceCatalog {
    /// Create a catalog over the given gateway
    pub fn new(gateway: Arc<dyn ResourceGateway>) -> Self {
        Self { gateway }
    }

    /// Fetch all three registries concurrently
    ///
    /// Workers and vehicles are filtered to the `AVAILABLE` ones; zones are
    /// returned as-is.
    pub async fn available_resources(&self) -> Result<AvailableResources> {
        let (zones, workers, vehicles) = join!(
            self.gateway.list_zones(),
            self.gateway.list_workers(),
            self.gateway.list_vehicles(),
        );

        let resources = AvailableResources {
            zones: zones?,
            workers: available_only(workers?, |w: &Worker| w.status.is_available()),
            vehicles: available_only(vehicles?, |v: &Vehicle| v.status.is_available()),
        };

        tracing::info!(
            zones = resources.zones.len(),
            workers = resources.workers.len(),
            vehicles = resources.vehicles.len(),
            "Fetched resource catalog"
        );
        Ok(resources)
    }

    /// List all zones
    pub async fn zones(&self) -> Result<Vec<Zone>> {
        Ok(self.gateway.list_zones().await?)
    }

    /// List workers currently available for assignment
    pub async fn available_workers(&self) -> Result<Vec<Worker>> {
        let workers = self.gateway.list_workers().await?;
        Ok(available_only(workers, |w: &Worker| w.status.is_available()))
    }

    /// List vehicles currently available for assignment
    pub async fn available_vehicles(&self) -> Result<Vec<Vehicle>> {
        let vehicles = self.gateway.list_vehicles().await?;
        Ok(available_only(vehicles, |v: &Vehicle| {
            v.status.is_available()
        }))
    }
}

fn available_only<T>(items: Vec<T>, keep: impl Fn(&T) -> bool) -> Vec<T> {
    items.into_iter().filter(|item| keep(item)).collect()
}
