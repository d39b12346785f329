//! Integration tests for the REST resource gateway using wiremock
//!
//! These tests validate wire contracts, retry behavior, and 404 handling
//! against mock registry servers.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wastewise_pickup::config::ServiceEndpoints;
use wastewise_pickup::gateway::{GatewayError, HttpResourceGateway, ResourceGateway};
use wastewise_pickup::models::ResourceStatus;

fn endpoints_for(server: &MockServer) -> ServiceEndpoints {
    ServiceEndpoints {
        zone_url: server.uri(),
        worker_url: server.uri(),
        vehicle_url: server.uri(),
        logging_url: None,
        request_timeout_secs: 2,
        retry_count: 2,
        retry_delay_ms: 10,
    }
}

/// Zone listing decodes the registry payload
#[tokio::test]
async fn test_list_zones_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "Z001", "name": "Old Town"},
            {"id": "Z002", "name": "Harbor"}
        ])))
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let zones = gateway.list_zones().await.unwrap();

    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].id, "Z001");
    assert_eq!(zones[1].name, "Harbor");
}

/// Unknown worker maps a 404 to None instead of an error
#[tokio::test]
async fn test_unknown_worker_is_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workers/W999"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1) // 404 must not retry
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let worker = gateway.get_worker("W999").await.unwrap();
    assert!(worker.is_none());
}

/// A known worker decodes status and optional skill
#[tokio::test]
async fn test_get_worker_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workers/W001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "W001",
            "name": "Kim",
            "status": "AVAILABLE"
        })))
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let worker = gateway.get_worker("W001").await.unwrap().unwrap();

    assert_eq!(worker.name, "Kim");
    assert!(worker.status.is_available());
    assert!(worker.skill.is_none());
}

/// Bulk worker listing decodes the registry payload
#[tokio::test]
async fn test_list_workers_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "W001", "name": "Kim", "status": "AVAILABLE"},
            {"id": "W002", "name": "Lee", "status": "OFF_DUTY", "skill": "driver"}
        ])))
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let workers = gateway.list_workers().await.unwrap();

    assert_eq!(workers.len(), 2);
    assert!(workers[0].status.is_available());
    assert_eq!(workers[1].skill.as_deref(), Some("driver"));
}

/// Bulk vehicle listing decodes the registry payload
#[tokio::test]
async fn test_list_vehicles_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vehicles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "V001", "type": "compactor", "licensePlate": "34-AB-123", "status": "AVAILABLE"}
        ])))
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let vehicles = gateway.list_vehicles().await.unwrap();

    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].vehicle_type, "compactor");
}

/// Server errors on reads trigger retries until the registry recovers
#[tokio::test]
async fn test_server_error_read_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/vehicles/V001"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/vehicles/V001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "V001",
            "type": "compactor",
            "licensePlate": "34-AB-123",
            "status": "AVAILABLE"
        })))
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let vehicle = gateway.get_vehicle("V001").await.unwrap().unwrap();

    assert_eq!(vehicle.vehicle_type, "compactor");
}

/// Retries are bounded; a persistently failing registry surfaces the error
#[tokio::test]
async fn test_read_retries_are_bounded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/zones"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3) // initial attempt + retry_count
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let err = gateway.list_zones().await.unwrap_err();

    assert!(matches!(err, GatewayError::Http { status: 500, .. }));
}

/// A registry slower than the configured timeout surfaces as Timeout
#[tokio::test]
async fn test_slow_registry_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/workers/W001"))
        .respond_with(
            ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let mut endpoints = endpoints_for(&server);
    endpoints.request_timeout_secs = 1;
    endpoints.retry_count = 0;

    let gateway = HttpResourceGateway::new(&endpoints).unwrap();
    let err = gateway.get_worker("W001").await.unwrap_err();

    assert!(matches!(err, GatewayError::Timeout));
}

/// Worker status mutation carries the expected wire shape
#[tokio::test]
async fn test_worker_status_update_payload() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/workers/status"))
        .and(body_json(json!({
            "workerId": "W001",
            "status": "OCCUPIED"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    gateway
        .update_worker_status("W001", ResourceStatus::Occupied)
        .await
        .unwrap();
}

/// Vehicle status mutation carries the expected wire shape
#[tokio::test]
async fn test_vehicle_status_update_payload() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/vehicles/status"))
        .and(body_json(json!({
            "vehicleId": "V001",
            "status": "AVAILABLE"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    gateway
        .update_vehicle_status("V001", ResourceStatus::Available)
        .await
        .unwrap();
}

/// Status mutations are sent once; a failure is reported, not retried
#[tokio::test]
async fn test_status_update_does_not_retry() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/workers/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = HttpResourceGateway::new(&endpoints_for(&server)).unwrap();
    let err = gateway
        .update_worker_status("W001", ResourceStatus::Available)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Http { status: 503, .. }));
}
