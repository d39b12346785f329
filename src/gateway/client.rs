//! REST implementation of the resource gateway
//!
//! Wire contracts follow the sibling registries' APIs:
//!
//! - `GET  {zones}/zones` — full zone listing
//! - `GET  {workers}/workers` — full worker listing
//! - `GET  {workers}/workers/{id}` — one worker, 404 when unknown
//! - `PUT  {workers}/workers/status` — body `{"workerId", "status"}`
//! - `GET  {vehicles}/vehicles` / `{vehicles}/vehicles/{id}` /
//!   `PUT {vehicles}/vehicles/status`
//!
//! Every call carries the configured timeout. Reads retry a bounded number
//! of times on retryable failures; status mutations are sent once, since the
//! composite updater owns failure reporting for them.

use reqwest::{Client, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

use crate::config::ServiceEndpoints;
use crate::models::{ResourceStatus, Vehicle, Worker, Zone};

use super::{GatewayError, ResourceGateway};

// ============================================================================
// Status mutation payloads
// ============================================================================

/// Worker status mutation sent to the worker registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerStatusUpdate {
    pub worker_id: String,
    pub status: ResourceStatus,
}

/// Vehicle status mutation sent to the vehicle registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleStatusUpdate {
    pub vehicle_id: String,
    pub status: ResourceStatus,
}

// ============================================================================
// HTTP Gateway
// ============================================================================

/// Gateway client over REST
pub struct HttpResourceGateway {
    zone_url: String,
    worker_url: String,
    vehicle_url: String,
    retry_count: u32,
    retry_delay: Duration,
    http_client: Client,
}

impl HttpResourceGateway {
    /// Create a gateway from the configured endpoints
    pub fn new(endpoints: &ServiceEndpoints) -> Result<Self, GatewayError> {
        let http_client = Client::builder()
            .timeout(endpoints.request_timeout())
            .build()
            .map_err(|e| GatewayError::Init(e.to_string()))?;

        Ok(Self {
            zone_url: endpoints.zone_url.trim_end_matches('/').to_string(),
            worker_url: endpoints.worker_url.trim_end_matches('/').to_string(),
            vehicle_url: endpoints.vehicle_url.trim_end_matches('/').to_string(),
            retry_count: endpoints.retry_count,
            retry_delay: endpoints.retry_delay(),
            http_client,
        })
    }

    // Internal: GET with bounded retry; 404 maps to Ok(None)
    async fn get_optional<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Option<T>, GatewayError> {
        let mut last_error = None;

        for attempt in 0..=self.retry_count {
            if attempt > 0 {
                tokio::time::sleep(self.retry_delay).await;
                tracing::debug!(url, attempt, "Retrying gateway read");
            }

            match self.http_client.get(url).send().await {
                Ok(response) => {
                    if response.status() == StatusCode::NOT_FOUND {
                        return Ok(None);
                    }
                    if response.status().is_success() {
                        match response.json::<T>().await {
                            Ok(data) => return Ok(Some(data)),
                            Err(e) => return Err(GatewayError::Parse(e.to_string())),
                        }
                    }
                    let error = GatewayError::Http {
                        status: response.status().as_u16(),
                        message: response.text().await.unwrap_or_default(),
                    };
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
                Err(e) => {
                    let error = classify_reqwest_error(e);
                    if !error.is_retryable() {
                        return Err(error);
                    }
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| GatewayError::Network("unknown error".to_string())))
    }

    // Internal: PUT a JSON body, single attempt
    async fn put_json<T: Serialize>(&self, url: &str, body: &T) -> Result<(), GatewayError> {
        let response = self
            .http_client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(GatewayError::Http {
            status: response.status().as_u16(),
            message: response.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait::async_trait]
impl ResourceGateway for HttpResourceGateway {
    async fn list_zones(&self) -> Result<Vec<Zone>, GatewayError> {
        let url = format!("{}/zones", self.zone_url);
        self.get_optional::<Vec<Zone>>(&url)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn list_workers(&self) -> Result<Vec<Worker>, GatewayError> {
        let url = format!("{}/workers", self.worker_url);
        self.get_optional::<Vec<Worker>>(&url)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn list_vehicles(&self) -> Result<Vec<Vehicle>, GatewayError> {
        let url = format!("{}/vehicles", self.vehicle_url);
        self.get_optional::<Vec<Vehicle>>(&url)
            .await
            .map(Option::unwrap_or_default)
    }

    async fn get_worker(&self, id: &str) -> Result<Option<Worker>, GatewayError> {
        let url = format!("{}/workers/{id}", self.worker_url);
        self.get_optional(&url).await
    }

    async fn get_vehicle(&self, id: &str) -> Result<Option<Vehicle>, GatewayError> {
        let url = format!("{}/vehicles/{id}", self.vehicle_url);
        self.get_optional(&url).await
    }

    async fn update_worker_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/workers/status", self.worker_url);
        let body = WorkerStatusUpdate {
            worker_id: id.to_string(),
            status,
        };

        self.put_json(&url, &body).await?;
        tracing::debug!(worker_id = id, %status, "Worker status updated");
        Ok(())
    }

    async fn update_vehicle_status(
        &self,
        id: &str,
        status: ResourceStatus,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/vehicles/status", self.vehicle_url);
        let body = VehicleStatusUpdate {
            vehicle_id: id.to_string(),
            status,
        };

        self.put_json(&url, &body).await?;
        tracing::debug!(vehicle_id = id, %status, "Vehicle status updated");
        Ok(())
    }
}

/// Map a reqwest error to the gateway taxonomy
fn classify_reqwest_error(e: reqwest::Error) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout
    } else {
        GatewayError::Network(e.to_string())
    }
}
