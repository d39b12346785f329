//! Configuration management for the pickup service
//!
//! Configuration is loaded from environment variables with the `WASTEWISE_`
//! prefix and validated before the server starts. The two behavioral switches
//! the deployment can flip are [`ValidationMode`] (strict remote validation
//! vs permissive local-only validation for test environments) and
//! [`ReleaseOrder`] (whether deletion removes the record before or after
//! freeing the referenced resources).

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::models::PickupStatus;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,

    /// Sibling service endpoints
    pub services: ServiceEndpoints,

    /// Orchestration behavior switches
    pub orchestration: OrchestrationConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server bind address
    pub bind_address: SocketAddr,

    /// Enable CORS for the API
    pub enable_cors: bool,

    /// Enable per-request tracing
    pub enable_request_logging: bool,
}

/// Base URLs of the sibling registries and the logging service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceEndpoints {
    /// Zone registry base URL
    pub zone_url: String,

    /// Worker registry base URL
    pub worker_url: String,

    /// Vehicle registry base URL
    pub vehicle_url: String,

    /// Logging service base URL (optional; audit events are skipped if unset)
    pub logging_url: Option<String>,

    /// Timeout applied to every outbound call, in seconds
    pub request_timeout_secs: u64,

    /// Retry count for failed read requests
    pub retry_count: u32,

    /// Delay between retries, in milliseconds
    pub retry_delay_ms: u64,
}

impl ServiceEndpoints {
    /// Request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Retry delay as a Duration
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

/// Behavior switches for the pickup orchestrator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestrationConfig {
    /// Strict remote validation vs permissive local-only validation
    pub validation_mode: ValidationMode,

    /// Order of record removal vs resource release on deletion
    pub release_order: ReleaseOrder,

    /// Status assigned to newly created pickups
    pub initial_status: PickupStatus,
}

/// How creation requests are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Validate zone, vehicle, and workers against the sibling registries
    Strict,
    /// Local validation only (time window, distinct workers, non-blank
    /// fields); for test environments without sibling services
    Permissive,
}

impl ValidationMode {
    /// Parse from a configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "permissive" | "mock" => Some(Self::Permissive),
            _ => None,
        }
    }
}

/// Order of operations when deleting a pickup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReleaseOrder {
    /// Delete the record first, then free resources best effort. A pickup
    /// never outlives its ability to be freed; failed releases become a
    /// follow-up job for reconciliation.
    DeleteFirst,
    /// Free resources first; a failed release keeps the record and surfaces
    /// the composite failure to the caller.
    ReleaseFirst,
}

impl ReleaseOrder {
    /// Parse from a configuration string
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "delete-first" | "delete_first" => Some(Self::DeleteFirst),
            "release-first" | "release_first" => Some(Self::ReleaseFirst),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path
    pub sqlite_path: PathBuf,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "0.0.0.0:8084".parse().unwrap(),
                enable_cors: true,
                enable_request_logging: true,
            },
            services: ServiceEndpoints {
                zone_url: String::from("http://localhost:8081"),
                worker_url: String::from("http://localhost:8082"),
                vehicle_url: String::from("http://localhost:8083"),
                logging_url: None,
                request_timeout_secs: 5,
                retry_count: 2,
                retry_delay_ms: 500,
            },
            orchestration: OrchestrationConfig {
                validation_mode: ValidationMode::Strict,
                release_order: ReleaseOrder::DeleteFirst,
                initial_status: PickupStatus::Scheduled,
            },
            database: DatabaseConfig {
                sqlite_path: PathBuf::from("data/pickups.db"),
            },
            logging: LoggingConfig {
                level: String::from("info"),
                format: String::from("text"),
            },
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("WASTEWISE_BIND_ADDRESS") {
            config.server.bind_address = addr
                .parse()
                .with_context(|| format!("Invalid WASTEWISE_BIND_ADDRESS: {addr}"))?;
        }

        if let Ok(v) = std::env::var("WASTEWISE_ENABLE_CORS") {
            config.server.enable_cors = v != "false" && v != "0";
        }

        if let Ok(url) = std::env::var("WASTEWISE_ZONE_SERVICE_URL") {
            config.services.zone_url = url;
        }
        if let Ok(url) = std::env::var("WASTEWISE_WORKER_SERVICE_URL") {
            config.services.worker_url = url;
        }
        if let Ok(url) = std::env::var("WASTEWISE_VEHICLE_SERVICE_URL") {
            config.services.vehicle_url = url;
        }
        if let Ok(url) = std::env::var("WASTEWISE_LOGGING_SERVICE_URL") {
            config.services.logging_url = Some(url);
        }

        if let Ok(secs) = std::env::var("WASTEWISE_REQUEST_TIMEOUT") {
            config.services.request_timeout_secs = secs
                .parse()
                .with_context(|| format!("Invalid WASTEWISE_REQUEST_TIMEOUT: {secs}"))?;
        }
        if let Ok(count) = std::env::var("WASTEWISE_RETRY_COUNT") {
            config.services.retry_count = count
                .parse()
                .with_context(|| format!("Invalid WASTEWISE_RETRY_COUNT: {count}"))?;
        }

        if let Ok(mode) = std::env::var("WASTEWISE_VALIDATION_MODE") {
            config.orchestration.validation_mode = ValidationMode::parse(&mode)
                .with_context(|| format!("Invalid WASTEWISE_VALIDATION_MODE: {mode}"))?;
        }
        if let Ok(order) = std::env::var("WASTEWISE_RELEASE_ORDER") {
            config.orchestration.release_order = ReleaseOrder::parse(&order)
                .with_context(|| format!("Invalid WASTEWISE_RELEASE_ORDER: {order}"))?;
        }
        if let Ok(status) = std::env::var("WASTEWISE_INITIAL_STATUS") {
            config.orchestration.initial_status = PickupStatus::parse(&status)
                .with_context(|| format!("Invalid WASTEWISE_INITIAL_STATUS: {status}"))?;
        }

        if let Ok(path) = std::env::var("WASTEWISE_SQLITE_PATH") {
            config.database.sqlite_path = path.into();
        }

        if let Ok(level) = std::env::var("WASTEWISE_LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(format) = std::env::var("WASTEWISE_LOG_FORMAT") {
            config.logging.format = format;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("zone service URL", Some(&self.services.zone_url)),
            ("worker service URL", Some(&self.services.worker_url)),
            ("vehicle service URL", Some(&self.services.vehicle_url)),
            ("logging service URL", self.services.logging_url.as_ref()),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).with_context(|| format!("Invalid {name}: {value}"))?;
            }
        }

        if self.services.request_timeout_secs == 0 {
            anyhow::bail!("Request timeout must be at least 1 second");
        }

        Ok(())
    }
}
