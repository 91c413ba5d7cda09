//! Integration tests for the query path: caching, retry, and the
//! dual-channel success/error interpretation.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aparavi_client::{AparaviClient, HealthStatus, QueryReply, RetryPolicy};
use aparavi_core::{AparaviConfig, Error, QueryFormat};

const QUERY_PATH: &str = "/server/api/v3/database/query";

fn test_config(server: &MockServer) -> AparaviConfig {
    let address = server.address();
    AparaviConfig {
        host: address.ip().to_string(),
        port: address.port(),
        username: "root".to_string(),
        password: "root".to_string(),
        timeout_seconds: 5,
        ..Default::default()
    }
}

fn test_client(server: &MockServer) -> AparaviClient {
    // Zero base delay so retry paths run without real sleeps.
    let retry = RetryPolicy::new(2).with_base_delay(Duration::ZERO);
    AparaviClient::with_retry_policy(test_config(server), retry).expect("client")
}

fn ok_body() -> serde_json::Value {
    json!({"status": "OK", "data": {"objects": [{"name": "report.pdf"}]}})
}

#[tokio::test]
async fn second_execute_is_a_cache_hit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = "SELECT name FROM STORE('/') WHERE ClassID = 'idxobject'";

    let first = client
        .execute(query, QueryFormat::Json, true, false)
        .await
        .expect("first call");
    let second = client
        .execute(query, QueryFormat::Json, true, false)
        .await
        .expect("second call");

    assert_eq!(first, second);
    assert_eq!(client.cache_size().await, 1);
    // Mock::expect(1) verifies on drop that only one network call happened.
}

#[tokio::test]
async fn validate_only_never_touches_the_cache() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "data": {"valid": true}
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = "SELECT name FROM STORE('/') WHERE ClassID = 'idxobject'";

    for _ in 0..2 {
        client
            .execute(query, QueryFormat::Json, true, true)
            .await
            .expect("validate-only call");
    }

    assert_eq!(client.cache_size().await, 0);
}

#[tokio::test]
async fn query_text_is_sent_unencoded_to_the_transport() {
    let server = MockServer::start().await;
    let query = "SELECT name FROM STORE('/') WHERE ClassID = 'idxobject' LIMIT 1";

    // query_param matches the decoded value: a pre-encoded query would
    // arrive double-encoded and miss this matcher.
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param("select", query))
        .and(query_param(
            "options",
            r#"{"format":"json","stream":false,"validate":false}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    client
        .execute(query, QueryFormat::Json, false, false)
        .await
        .expect("call");
}

#[tokio::test]
async fn remote_error_body_is_returned_as_data() {
    let server = MockServer::start().await;
    let error_body = json!({"status": "error", "message": "syntax error"});

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&error_body))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let reply = client
        .execute("SELECT bogus", QueryFormat::Json, true, false)
        .await
        .expect("a 200 with an error body is not an Err");

    assert_eq!(reply, QueryReply::Json(error_body));
    // Error results are never cached.
    assert_eq!(client.cache_size().await, 0);
}

#[tokio::test]
async fn unauthorized_is_terminal_with_zero_retries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .execute("SELECT name", QueryFormat::Json, false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Auth));
}

#[tokio::test]
async fn bad_request_carries_the_response_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown column 'frobnicate'"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .execute("SELECT frobnicate", QueryFormat::Json, false, false)
        .await
        .unwrap_err();

    match err {
        Error::BadRequest(body) => assert!(body.contains("frobnicate")),
        other => panic!("expected BadRequest, got {:?}", other),
    }
}

#[tokio::test]
async fn not_found_is_terminal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .execute("SELECT name", QueryFormat::Json, false, false)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotFound));
}

#[tokio::test]
async fn server_errors_are_retried_then_wrapped() {
    let server = MockServer::start().await;

    // RetryPolicy::new(2) → initial attempt + 2 retries = 3 calls.
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(3)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .execute("SELECT name", QueryFormat::Json, false, false)
        .await
        .unwrap_err();

    match err {
        Error::Transport { attempts, message } => {
            assert_eq!(attempts, 2);
            assert!(message.contains("503"));
        }
        other => panic!("expected Transport, got {:?}", other),
    }
}

#[tokio::test]
async fn retry_recovers_when_the_server_comes_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let reply = client
        .execute("SELECT name", QueryFormat::Json, false, false)
        .await
        .expect("recovered after one retry");

    assert_eq!(reply, QueryReply::Json(ok_body()));
}

#[tokio::test]
async fn csv_format_returns_raw_text() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param(
            "options",
            r#"{"format":"csv","stream":false,"validate":false}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_string("name,size\na.txt,10\n"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let reply = client
        .execute("SELECT name, size", QueryFormat::Csv, false, false)
        .await
        .expect("csv call");

    assert_eq!(reply, QueryReply::Csv("name,size\na.txt,10\n".to_string()));
}

#[tokio::test]
async fn validate_is_a_bare_status_probe() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .and(query_param(
            "options",
            r#"{"format":"json","stream":false,"validate":true}"#,
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "data": {"valid": true}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert!(client.validate("SELECT name").await);
}

#[tokio::test]
async fn health_check_distinguishes_the_three_outcomes() {
    // Reachable, query executed.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok_body()))
        .mount(&server)
        .await;
    let client = test_client(&server);
    assert!(matches!(client.health_check().await, HealthStatus::Passed(_)));

    // Reachable, remote reported a query error.
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error", "message": "store offline"
        })))
        .mount(&server)
        .await;
    let client = test_client(&server);
    assert_eq!(
        client.health_check().await,
        HealthStatus::QueryError("store offline".to_string())
    );

    // Unreachable (HTTP error status).
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let client = test_client(&server);
    assert!(matches!(
        client.health_check().await,
        HealthStatus::Unreachable(_)
    ));
}

#[tokio::test]
async fn discovery_extracts_the_first_row() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"objects": [{"node": "primary", "nodeObjectId": "co-123"}]}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(
        client.discover_client_object_id().await.expect("discovery"),
        Some("co-123".to_string())
    );
    assert_eq!(
        client.discover_base_url().await.expect("discovery"),
        Some("primary".to_string())
    );
}

#[tokio::test]
async fn discovery_returns_none_on_no_rows() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "data": {"objects": []}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.discover_client_object_id().await.expect("discovery"), None);
}

#[tokio::test]
async fn ensure_client_object_id_memoizes_discovery() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "data": {"objects": [{"node": "primary", "nodeObjectId": "co-123"}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.ensure_client_object_id().await.expect("first"), "co-123");
    // Second call is served from client state, not the network.
    assert_eq!(client.ensure_client_object_id().await.expect("second"), "co-123");
}

#[tokio::test]
async fn ensure_client_object_id_prefers_the_configured_value() {
    let server = MockServer::start().await;
    // No mock mounted: a network call would fail the test.
    let config = AparaviConfig {
        client_object_id: Some("configured-id".to_string()),
        ..test_config(&server)
    };
    let client = AparaviClient::new(config).expect("client");

    assert_eq!(
        client.ensure_client_object_id().await.expect("configured"),
        "configured-id"
    );
}

#[tokio::test]
async fn ensure_client_object_id_names_the_override_when_discovery_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(QUERY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK", "data": {"objects": []}
        })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client.ensure_client_object_id().await.unwrap_err();
    assert!(err.to_string().contains("APARAVI_CLIENT_OBJECT_ID"));
}
