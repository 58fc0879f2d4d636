//! Error scenario integration tests
//!
//! Tests various failure modes and error handling:
//! 1. Missing credentials (nothing sent)
//! 2. HTTP error responses (401, 404, 500)
//! 3. `errors` payloads on a success status
//! 4. Malformed bodies
//! 5. Partial catalog failure

use pco_live::error::{
    ControlError, Error, ErrorCategory, FetchError, LiveErrorTrait, NavError, RequestError,
};
use pco_live::session::{Action, PlanTarget, SessionStatus};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::fixtures::{
    config_for, live_descriptor, plans, service_types, session_for, LIVE_PATH, NEXT_PATH,
    TOGGLE_PATH,
};

fn target() -> PlanTarget {
    PlanTarget::from_parts(Some("1"), Some("p1")).unwrap()
}

// ============================================================================
// Credential and HTTP Error Tests
// ============================================================================

#[tokio::test]
async fn test_missing_credentials_never_hit_the_network() {
    let mock_server = MockServer::start().await;

    let mut config = config_for(&mock_server.uri());
    config.api.secret_key = String::new();
    let session = pco_live::session::LiveSession::from_config(&config).unwrap();

    let result = session.perform(Action::Next, &target()).await;

    match result {
        Err(Error::Control(ControlError::Request { source, .. })) => {
            assert_eq!(source, RequestError::InvalidCredentials);
        }
        other => panic!("Expected InvalidCredentials, got {other:?}"),
    }

    let catalog = session.load_catalog().await;
    assert!(matches!(
        catalog,
        Err(Error::Fetch(FetchError::ServiceTypes(
            RequestError::InvalidCredentials
        )))
    ));

    let received = mock_server.received_requests().await.unwrap();
    assert!(received.is_empty(), "No request should be sent");
}

#[tokio::test]
async fn test_unauthorized_live_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOGGLE_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session
        .perform(Action::TakeControl, &target())
        .await
        .unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Auth);
    assert!(!err.is_recoverable());
    assert!(matches!(session.status().await, SessionStatus::Error(_)));
}

#[tokio::test]
async fn test_unknown_plan_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session
        .perform(Action::ReleaseControl, &target())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Control(ControlError::Request {
            source: RequestError::NotFound { .. },
            ..
        })
    ));
}

#[tokio::test]
async fn test_server_error_during_navigation_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_descriptor(None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOGGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(live_descriptor(Some("https://api.planningcenteronline.com/people/me"))),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session.perform(Action::Next, &target()).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Nav(NavError::Request(RequestError::Status { status: 503, .. }))
    ));
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_errors_payload_with_success_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_descriptor(None)))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(TOGGLE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(live_descriptor(Some("https://api.planningcenteronline.com/people/me"))),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path(NEXT_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "errors": [{"status": "422", "title": "Plan has no items"}]
        })))
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session.perform(Action::Next, &target()).await.unwrap_err();

    assert!(matches!(err, Error::Nav(NavError::Rejected { .. })));
    assert_eq!(session.navigation().await, None);
}

#[tokio::test]
async fn test_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session
        .perform(Action::TakeControl, &target())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Control(ControlError::Request {
            source: RequestError::MalformedBody(_),
            ..
        })
    ));
}

#[tokio::test]
async fn test_timeout_is_a_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIVE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(live_descriptor(None))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server.uri());
    config.api.request_timeout_secs = 1;
    let session = pco_live::session::LiveSession::from_config(&config).unwrap();

    let err = session
        .perform(Action::TakeControl, &target())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Control(ControlError::Request {
            source: RequestError::Transport(_),
            ..
        })
    ));
    assert_eq!(err.category(), ErrorCategory::Control);
    assert!(err.is_recoverable());
}

// ============================================================================
// Catalog Failure Tests
// ============================================================================

#[tokio::test]
async fn test_one_failing_service_type_does_not_abort_catalog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(service_types(&[("1", "Sunday"), ("2", "Wednesday")])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service_types/1/plans"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/service_types/2/plans"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(plans("2", &[("w1", "Jan 7"), ("w2", "Jan 14")])),
        )
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let catalog = session.load_catalog().await.unwrap();

    assert_eq!(catalog.service_types().len(), 2);
    assert_eq!(catalog.plans().len(), 2);
    assert!(catalog.plans().iter().all(|p| p.service_type_id == "2"));
    assert_eq!(catalog.degraded(), &["1".to_string()]);
    assert_eq!(session.status().await, SessionStatus::Ok);
}

#[tokio::test]
async fn test_service_type_listing_failure_aborts_catalog() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/service_types"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let session = session_for(&mock_server.uri());
    let err = session.load_catalog().await.unwrap_err();

    assert!(matches!(
        err,
        Error::Fetch(FetchError::ServiceTypes(RequestError::Status {
            status: 500,
            ..
        }))
    ));
    assert!(!session.catalog().await.is_loaded());
}
