//! Integration tests for the HTTP API: full produce/consume flow against a
//! real log in a temp directory.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use http_body_util::BodyExt;
use tempfile::TempDir;
use tower::ServiceExt;

use driftlog_storage::{Log, LogConfig};

fn test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let log = Arc::new(Log::open(temp_dir.path().join("log"), LogConfig::default()).unwrap());
    (driftlog_server::router(log), temp_dir)
}

async fn post_json(app: &Router, path: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(path)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get_json(app: &Router, path: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app();
    let (status, _) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_produce_then_consume() {
    let (app, _dir) = test_app();

    let value = STANDARD.encode(b"hello driftlog");
    let (status, body) = post_json(&app, "/api/v1/produce", serde_json::json!({"value": value})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["offset"], 0);

    let (status, body) = get_json(&app, "/api/v1/consume?offset=0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["record"]["offset"], 0);
    let decoded = STANDARD
        .decode(body["record"]["value"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, b"hello driftlog");
}

#[tokio::test]
async fn test_offsets_advance() {
    let (app, _dir) = test_app();

    for i in 0..3 {
        let value = STANDARD.encode(format!("value-{i}"));
        let (status, body) =
            post_json(&app, "/api/v1/produce", serde_json::json!({"value": value})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["offset"], i);
    }

    let (status, body) = get_json(&app, "/api/v1/offsets").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["lowest"], 0);
    assert_eq!(body["highest"], 2);
}

#[tokio::test]
async fn test_consume_out_of_range_is_404() {
    let (app, _dir) = test_app();

    let (status, _) = get_json(&app, "/api/v1/consume?offset=0").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let value = STANDARD.encode(b"only");
    post_json(&app, "/api/v1/produce", serde_json::json!({"value": value})).await;

    let (status, _) = get_json(&app, "/api/v1/consume?offset=0").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = get_json(&app, "/api/v1/consume?offset=1").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_produce_rejects_invalid_base64() {
    let (app, _dir) = test_app();

    let (status, _) = post_json(
        &app,
        "/api/v1/produce",
        serde_json::json!({"value": "not base64!!!"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_binary_payload_roundtrip() {
    let (app, _dir) = test_app();

    let payload: Vec<u8> = (0..=255u8).collect();
    let value = STANDARD.encode(&payload);
    let (status, body) = post_json(&app, "/api/v1/produce", serde_json::json!({"value": value})).await;
    assert_eq!(status, StatusCode::OK);

    let offset = body["offset"].as_u64().unwrap();
    let (status, body) = get_json(&app, &format!("/api/v1/consume?offset={offset}")).await;
    assert_eq!(status, StatusCode::OK);
    let decoded = STANDARD
        .decode(body["record"]["value"].as_str().unwrap())
        .unwrap();
    assert_eq!(decoded, payload);
}
