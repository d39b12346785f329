//! Prometheus metrics for the pickup service
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops so the service
//! keeps running without instrumentation.

use prometheus::{
    register_counter, register_counter_vec, Counter, CounterVec, Encoder, TextEncoder,
};
use std::sync::OnceLock;

use crate::status::ResourceKind;

/// Container for all pickup service metrics
struct PickupMetrics {
    pickups_created: Counter,
    pickups_deleted: Counter,
    validation_rejections: Counter,
    status_update_failures: CounterVec,
}

static METRICS: OnceLock<PickupMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Initialize all Prometheus metrics
///
/// Should be called once at application startup; repeated calls are no-ops.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = PickupMetrics {
        pickups_created: register_counter!(
            "wastewise_pickups_created_total",
            "Number of pickups created"
        )?,
        pickups_deleted: register_counter!(
            "wastewise_pickups_deleted_total",
            "Number of pickups deleted"
        )?,
        validation_rejections: register_counter!(
            "wastewise_validation_rejections_total",
            "Number of creation requests rejected by validation"
        )?,
        status_update_failures: register_counter_vec!(
            "wastewise_status_update_failures_total",
            "Number of failed resource status mutations, by resource kind",
            &["resource"]
        )?,
    };

    METRICS.set(metrics).ok();
    Ok(())
}

/// Record a created pickup
pub fn record_pickup_created() {
    if let Some(m) = METRICS.get() {
        m.pickups_created.inc();
    }
}

/// Record a deleted pickup
pub fn record_pickup_deleted() {
    if let Some(m) = METRICS.get() {
        m.pickups_deleted.inc();
    }
}

/// Record a creation request rejected by validation
pub fn record_validation_rejection() {
    if let Some(m) = METRICS.get() {
        m.validation_rejections.inc();
    }
}

/// Record one failed sub-call of a composite status update
pub fn record_status_update_failure(kind: ResourceKind) {
    if let Some(m) = METRICS.get() {
        m.status_update_failures
            .with_label_values(&[&kind.to_string()])
            .inc();
    }
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let families = prometheus::gather();
    let mut buffer = Vec::new();

    if encoder.encode(&families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_noop_before_init() {
        // Must not panic when the registry is empty
        record_pickup_created();
        record_status_update_failure(ResourceKind::Vehicle);
    }

    #[test]
    fn test_init_and_record() {
        init_metrics().unwrap();
        // Double initialization is a no-op
        init_metrics().unwrap();

        record_pickup_created();
        record_pickup_deleted();
        record_validation_rejection();
        record_status_update_failure(ResourceKind::Worker);

        let text = gather_metrics();
        assert!(text.contains("wastewise_pickups_created_total"));
        assert!(text.contains("wastewise_status_update_failures_total"));
    }
}
