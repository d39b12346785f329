// Core data structures for the pickup service

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Minimum length of a pickup time slot.
pub const MIN_SLOT_MINUTES: i64 = 30;

/// A scheduled waste-collection job referencing one zone, one vehicle,
/// two workers, and a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickup {
    pub id: String,
    pub zone_id: String,
    pub time_slot_start: DateTime<Utc>,
    pub time_slot_end: DateTime<Utc>,
    pub frequency: Frequency,
    pub location_name: String,
    pub vehicle_id: String,
    pub worker1_id: String,
    pub worker2_id: String,
    pub status: PickupStatus,
}

impl Pickup {
    /// Length of the scheduled slot.
    pub fn slot_duration(&self) -> Duration {
        self.time_slot_end - self.time_slot_start
    }
}

/// How often a pickup recurs. Owned by the scheduling domain upstream;
/// treated as an opaque tag here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    OneTime,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Get string representation (matches the wire/storage encoding)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OneTime => "ONE_TIME",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
        }
    }

    /// Parse from the storage encoding
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ONE_TIME" => Some(Self::OneTime),
            "DAILY" => Some(Self::Daily),
            "WEEKLY" => Some(Self::Weekly),
            "MONTHLY" => Some(Self::Monthly),
            _ => None,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a pickup. Set at creation; advanced by processes
/// outside this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PickupStatus {
    Scheduled,
    NotStarted,
    InProgress,
    Completed,
}

impl PickupStatus {
    /// Get string representation (matches the wire/storage encoding)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::NotStarted => "NOT_STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Parse from the storage encoding
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SCHEDULED" => Some(Self::Scheduled),
            "NOT_STARTED" => Some(Self::NotStarted),
            "IN_PROGRESS" => Some(Self::InProgress),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl std::fmt::Display for PickupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Availability status of a worker or vehicle in its owning registry.
///
/// `OffDuty` applies to workers, `Maintenance` to vehicles; both mean
/// "not schedulable" for validation purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    Available,
    Occupied,
    OffDuty,
    Maintenance,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::OffDuty => "OFF_DUTY",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    /// True if the resource can be assigned to a new pickup.
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl std::fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Sibling registry views
// ============================================================================

/// Zone record from the zone registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: String,
    pub name: String,
}

/// Worker record from the worker registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    pub id: String,
    pub name: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub skill: Option<String>,
}

/// Vehicle record from the vehicle registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    #[serde(rename = "type")]
    pub vehicle_type: String,
    pub license_plate: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub capacity: Option<f64>,
}

// ============================================================================
// Request / response payloads
// ============================================================================

/// Payload for creating a new pickup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickupRequest {
    pub zone_id: String,
    pub time_slot_start: DateTime<Utc>,
    pub time_slot_end: DateTime<Utc>,
    pub frequency: Frequency,
    pub location_name: String,
    pub vehicle_id: String,
    pub worker1_id: String,
    pub worker2_id: String,
}

impl CreatePickupRequest {
    /// Both worker references, in declaration order.
    pub fn worker_ids(&self) -> [&str; 2] {
        [&self.worker1_id, &self.worker2_id]
    }
}

/// Receipt returned after a successful deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReceipt {
    pub pickup_id: String,
    pub status: String,
}

impl DeletionReceipt {
    /// Terminal status tag carried by every receipt.
    pub const DELETED: &'static str = "DELETED";

    pub fn new(pickup_id: impl Into<String>) -> Self {
        Self {
            pickup_id: pickup_id.into(),
            status: Self::DELETED.to_string(),
        }
    }
}
