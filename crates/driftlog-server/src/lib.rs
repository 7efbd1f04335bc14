//! HTTP API over the commit log.
//!
//! A thin JSON layer: producers POST a record, consumers GET one back by
//! offset. Record payloads travel base64-encoded since they are arbitrary
//! bytes.
//!
//! ## Endpoints
//!
//! | Method | Path | Body / query | Response |
//! |---|---|---|---|
//! | POST | `/api/v1/produce` | `{"value": "<base64>"}` | `{"offset": N}` |
//! | GET | `/api/v1/consume?offset=N` | - | `{"record": {"value": "<base64>", "offset": N}}` |
//! | GET | `/api/v1/offsets` | - | `{"lowest": N, "highest": N}` |
//! | GET | `/health` | - | 200 |
//!
//! A consume of an offset the log does not hold answers 404; a payload that
//! is not valid base64 answers 400. The log's disk work is synchronous, so
//! handlers push it onto the blocking pool rather than stalling the
//! runtime.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::error;

use driftlog_core::{Error, Record};
use driftlog_storage::Log;

/// Shared handler state: the log behind an [`Arc`].
#[derive(Clone)]
pub struct AppState {
    log: Arc<Log>,
}

/// Builds the API router over `log`.
pub fn router(log: Arc<Log>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/produce", post(produce))
        .route("/api/v1/consume", get(consume))
        .route("/api/v1/offsets", get(offsets))
        .with_state(AppState { log })
}

#[derive(Debug, Deserialize)]
pub struct ProduceRequest {
    /// Record payload, base64-encoded.
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct ProduceResponse {
    /// Offset the log assigned to the record.
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
pub struct ConsumeRequest {
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct ConsumeResponse {
    pub record: ApiRecord,
}

/// JSON rendering of a stored record.
#[derive(Debug, Serialize)]
pub struct ApiRecord {
    /// Record payload, base64-encoded.
    pub value: String,
    pub offset: u64,
}

#[derive(Debug, Serialize)]
pub struct OffsetsResponse {
    pub lowest: u64,
    pub highest: u64,
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn produce(
    State(state): State<AppState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, StatusCode> {
    let value = STANDARD
        .decode(&req.value)
        .map_err(|_| StatusCode::BAD_REQUEST)?;

    let log = Arc::clone(&state.log);
    let offset = tokio::task::spawn_blocking(move || log.append(Record::new(value)))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| {
            error!(error = %e, "append failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    Ok(Json(ProduceResponse { offset }))
}

async fn consume(
    State(state): State<AppState>,
    Query(req): Query<ConsumeRequest>,
) -> Result<Json<ConsumeResponse>, StatusCode> {
    let log = Arc::clone(&state.log);
    let record = tokio::task::spawn_blocking(move || log.read(req.offset))
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .map_err(|e| match e {
            Error::OffsetOutOfRange(_) => StatusCode::NOT_FOUND,
            other => {
                error!(error = %other, offset = req.offset, "read failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        })?;

    Ok(Json(ConsumeResponse {
        record: ApiRecord {
            value: STANDARD.encode(&record.value),
            offset: record.offset,
        },
    }))
}

async fn offsets(State(state): State<AppState>) -> Json<OffsetsResponse> {
    Json(OffsetsResponse {
        lowest: state.log.lowest_offset(),
        highest: state.log.highest_offset(),
    })
}
