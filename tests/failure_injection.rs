//! Failure injection tests: every upstream failure becomes a JSON error.

use std::time::{Duration, Instant};

use axum::http::StatusCode;
use serde_json::json;

use syntax_relay::http::ErrorBody;

mod common;

async fn assert_json_error(res: reqwest::Response, status: StatusCode, kind: &str) {
    assert_eq!(res.status(), status);
    assert_eq!(
        res.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
    assert!(res
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body: ErrorBody = res.json().await.expect("error body must be JSON");
    assert_eq!(body.error, kind);
    assert!(!body.message.is_empty());
}

#[tokio::test]
async fn test_unreachable_upstream_returns_bad_gateway() {
    // Bind then drop to get a port with nothing listening
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let relay = common::start_relay(common::relay_config(&format!(
        "http://{}/v1/documents:analyzeSyntax",
        dead_addr
    )))
    .await;

    let res = common::client()
        .post(relay.url())
        .json(&json!({"document": {"content": "hello"}}))
        .send()
        .await
        .expect("relay must answer");

    assert_json_error(res, StatusCode::BAD_GATEWAY, "upstream_unavailable").await;
}

#[tokio::test]
async fn test_error_message_does_not_leak_key() {
    let dead = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let dead_addr = dead.local_addr().unwrap();
    drop(dead);

    let relay = common::start_relay(common::relay_config(&format!("http://{}/analyze", dead_addr))).await;

    let text = common::client()
        .post(relay.url())
        .json(&json!({}))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(!text.contains(common::TEST_KEY));
}

#[tokio::test]
async fn test_non_json_upstream_body_returns_bad_gateway() {
    let upstream = common::start_mock_upstream(|_| async {
        (200, "<html><body>Service temporarily unavailable</body></html>".to_string())
    })
    .await;
    let relay = common::start_relay(common::relay_config(&upstream.url())).await;

    let res = common::client()
        .post(relay.url())
        .json(&json!({"document": {"content": "hello"}}))
        .send()
        .await
        .unwrap();

    assert_json_error(res, StatusCode::BAD_GATEWAY, "upstream_invalid_response").await;
    assert_eq!(upstream.calls().len(), 1, "no retry after a bad reply");
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let upstream = common::start_mock_upstream(|_| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        (200, "{}".to_string())
    })
    .await;
    let mut config = common::relay_config(&upstream.url());
    config.timeouts.upstream_secs = 1;
    let relay = common::start_relay(config).await;

    let start = Instant::now();
    let res = common::client()
        .post(relay.url())
        .json(&json!({"document": {"content": "hello"}}))
        .send()
        .await
        .unwrap();

    assert!(start.elapsed() < Duration::from_secs(4), "relay must not wait for the upstream");
    assert_json_error(res, StatusCode::GATEWAY_TIMEOUT, "upstream_timeout").await;
    assert_eq!(upstream.calls().len(), 1);
}

#[tokio::test]
async fn test_oversized_upstream_body_rejected() {
    let upstream = common::start_mock_upstream(|_| async {
        (200, format!(r#"{{"tokens":"{}"}}"#, "x".repeat(4096)))
    })
    .await;
    let mut config = common::relay_config(&upstream.url());
    config.limits.max_upstream_body_bytes = 1024;
    let relay = common::start_relay(config).await;

    let res = common::client()
        .post(relay.url())
        .json(&json!({"document": {"content": "hello"}}))
        .send()
        .await
        .unwrap();

    assert_json_error(res, StatusCode::BAD_GATEWAY, "upstream_response_too_large").await;
    assert_eq!(upstream.calls().len(), 1);
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let upstream = common::start_fixed_upstream("{}").await;
    let mut config = common::relay_config(&upstream.url());
    config.limits.max_body_bytes = 64;
    let relay = common::start_relay(config).await;

    let big = json!({"document": {"content": "x".repeat(1024)}});
    let res = common::client().post(relay.url()).json(&big).send().await.unwrap();

    assert_json_error(res, StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large").await;
    assert!(upstream.calls().is_empty());
}

#[tokio::test]
async fn test_relay_keeps_serving_after_failures() {
    let upstream = common::start_fixed_upstream(r#"{"ok":true}"#).await;
    let mut config = common::relay_config(&upstream.url());
    config.rate_limit.enabled = false;
    let relay = common::start_relay(config).await;
    let client = common::client();

    for _ in 0..3 {
        let res = client.post(relay.url()).json(&json!({"n": 1})).send().await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);

        let res = client
            .post(relay.url())
            .body("{broken")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
