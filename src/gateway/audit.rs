//! Audit event client for the logging service
//!
//! Lifecycle events (`CREATE_PICKUP`, `DELETE_PICKUP`) are posted to the
//! central logging service. Audit delivery is best effort: a failure is
//! logged at warn and never fails the pickup operation that produced it.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ServiceEndpoints;

use super::GatewayError;

/// Event types recorded against the logging service.
pub const EVENT_CREATE_PICKUP: &str = "CREATE_PICKUP";
pub const EVENT_DELETE_PICKUP: &str = "DELETE_PICKUP";

/// Audit event payload posted to `POST {logging}/logs`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub event_id: Uuid,
    pub event_type: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    /// Build an event with a fresh id and the current timestamp
    pub fn new(event_type: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: event_type.into(),
            details: details.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Client posting audit events to the logging service
pub struct AuditLogClient {
    logging_url: String,
    http_client: Client,
}

impl AuditLogClient {
    /// Create a client if a logging service URL is configured
    pub fn from_endpoints(endpoints: &ServiceEndpoints) -> Result<Option<Self>, GatewayError> {
        let Some(url) = endpoints.logging_url.as_ref() else {
            return Ok(None);
        };

        let http_client = Client::builder()
            .timeout(endpoints.request_timeout())
            .build()
            .map_err(|e| GatewayError::Init(e.to_string()))?;

        Ok(Some(Self {
            logging_url: url.trim_end_matches('/').to_string(),
            http_client,
        }))
    }

    /// Post one event; failures are logged, not returned
    pub async fn record(&self, event: AuditEvent) {
        let url = format!("{}/logs", self.logging_url);

        match self.http_client.post(&url).json(&event).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(event_type = %event.event_type, "Audit event recorded");
            }
            Ok(response) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    status = response.status().as_u16(),
                    "Logging service rejected audit event"
                );
            }
            Err(e) => {
                tracing::warn!(
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to deliver audit event"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_event_shape() {
        let event = AuditEvent::new(EVENT_CREATE_PICKUP, "Created pickup P001");
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["eventType"], "CREATE_PICKUP");
        assert_eq!(json["details"], "Created pickup P001");
        assert!(json.get("eventId").is_some());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_client_absent_without_url() {
        let config = Config::default();
        let client = AuditLogClient::from_endpoints(&config.services).unwrap();
        assert!(client.is_none());
    }

    #[test]
    fn test_client_present_with_url() {
        let mut config = Config::default();
        config.services.logging_url = Some("http://localhost:8085/".to_string());

        let client = AuditLogClient::from_endpoints(&config.services)
            .unwrap()
            .unwrap();
        assert_eq!(client.logging_url, "http://localhost:8085");
    }
}
