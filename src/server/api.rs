//! REST API handlers for the pickup server
//!
//! Routes:
//!
//! - `POST   /pickups` — create, returns `201` with `{"pickupId"}`
//! - `GET    /pickups` — list all pickups
//! - `GET    /pickups/{id}` — one pickup, `404` when unknown
//! - `DELETE /pickups/{id}` — delete, returns the deletion receipt
//! - `GET    /resources` — zones plus available workers and vehicles
//! - `GET    /resources/{zones,workers,vehicles}` — per-kind listings
//! - `GET    /health` — liveness probe
//! - `GET    /metrics` — Prometheus text exposition

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorCategory};
use crate::metrics;
use crate::models::{CreatePickupRequest, DeletionReceipt, Pickup, Vehicle, Worker, Zone};
use crate::resources::AvailableResources;

use super::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Body of a successful creation response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePickupResponse {
    pub pickup_id: String,
}

/// Error body returned for every failed request
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// HTTP status code, repeated in the body
    pub status: u16,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// ============================================================================
// Error mapping
// ============================================================================

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self.category() {
            ErrorCategory::Validation => StatusCode::BAD_REQUEST,
            ErrorCategory::NotFound => StatusCode::NOT_FOUND,
            // Validation could not complete because a sibling service
            // failed; the request itself may be fine.
            ErrorCategory::Network => match self {
                Error::ServiceCommunication(_) => StatusCode::BAD_GATEWAY,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ErrorCategory::Storage | ErrorCategory::Config | ErrorCategory::Other => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let body = ApiErrorResponse::new(status, self.to_string());
        (status, Json(body)).into_response()
    }
}

// ============================================================================
// Router
// ============================================================================

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/pickups", get(list_pickups).post(create_pickup))
        .route("/pickups/{id}", get(get_pickup).delete(delete_pickup))
        .route("/resources", get(all_resources))
        .route("/resources/zones", get(resource_zones))
        .route("/resources/workers", get(resource_workers))
        .route("/resources/vehicles", get(resource_vehicles))
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /pickups
///
/// Undecodable request bodies get the same error envelope as validation
/// rejections instead of axum's plain-text rejection.
async fn create_pickup(
    State(state): State<AppState>,
    payload: Result<Json<CreatePickupRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatePickupResponse>), Error> {
    let Json(request) = payload.map_err(|e| Error::invalid_request(e.body_text()))?;
    let pickup_id = state.orchestrator.create_pickup(request).await?;
    Ok((StatusCode::CREATED, Json(CreatePickupResponse { pickup_id })))
}

/// GET /pickups
async fn list_pickups(State(state): State<AppState>) -> Result<Json<Vec<Pickup>>, Error> {
    Ok(Json(state.orchestrator.list_pickups()?))
}

/// GET /pickups/{id}
async fn get_pickup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Pickup>, Error> {
    Ok(Json(state.orchestrator.get_pickup(&id)?))
}

/// DELETE /pickups/{id}
async fn delete_pickup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeletionReceipt>, Error> {
    Ok(Json(state.orchestrator.delete_pickup(&id).await?))
}

/// GET /resources
async fn all_resources(
    State(state): State<AppState>,
) -> Result<Json<AvailableResources>, Error> {
    Ok(Json(state.catalog.available_resources().await?))
}

/// GET /resources/zones
async fn resource_zones(State(state): State<AppState>) -> Result<Json<Vec<Zone>>, Error> {
    Ok(Json(state.catalog.zones().await?))
}

/// GET /resources/workers
async fn resource_workers(State(state): State<AppState>) -> Result<Json<Vec<Worker>>, Error> {
    Ok(Json(state.catalog.available_workers().await?))
}

/// GET /resources/vehicles
async fn resource_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, Error> {
    Ok(Json(state.catalog.available_vehicles().await?))
}

/// GET /health
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "UP".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /metrics
async fn metrics_text() -> String {
    metrics::gather_metrics()
}
