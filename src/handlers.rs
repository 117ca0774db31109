use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, ConnectInfo, OriginalUri, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use tracing::{info, instrument, Span};

use crate::constants::{SERVICE_NAME, UNKNOWN_SOURCE};
use crate::error::{IngestError, Result};
use crate::ingest::decode_body;
use crate::metrics;
use crate::state::AppState;
use crate::types::{
    ErrorBody, IngestResponse, Payload, QueryResponse, RecordResponse, ResponseStatus,
};

/// Serialize `body` up front so a serialization failure surfaces as our 500
/// rather than axum's plain-text one.
fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Result<Response> {
    let bytes = serde_json::to_vec(body)?;
    Ok((
        status,
        [(header::CONTENT_TYPE, "application/json")],
        bytes,
    )
        .into_response())
}

/// Accept one webhook delivery and append it to the log.
#[instrument(name = "ingest_webhook", skip_all, fields(source, kind))]
pub async fn ingest(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let source_address = connect_info
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());
    Span::current().record("source", source_address.as_str());

    let body = body.map_err(|rejection| {
        metrics::record_rejected();
        info!(source = %source_address, error = %rejection, "Request body could not be read");
        IngestError::from(rejection)
    })?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());

    let payload = decode_body(content_type, &body, state.policy).map_err(|e| {
        metrics::record_rejected();
        info!(source = %source_address, error = %e, "Rejected webhook payload");
        e
    })?;
    Span::current().record("kind", payload.kind());

    match &payload {
        Payload::Json(_) => info!(
            source = %source_address,
            "Webhook received (JSON):\n{}",
            payload.preview(state.preview_chars)
        ),
        Payload::Text(_) => info!(
            source = %source_address,
            "Webhook received (raw text): {}",
            payload.preview(state.preview_chars)
        ),
    }

    let record = state.store.append(source_address, payload).await?;
    metrics::record_ingested(&record.payload, body.len());

    json_response(StatusCode::OK, &IngestResponse::accepted(record.id))
}

/// Return every record in insertion order.
#[instrument(name = "query_records", skip_all)]
pub async fn query(State(state): State<AppState>) -> Result<Response> {
    let records = state.store.snapshot().await?;
    metrics::record_query();
    info!("Query served with {} records", records.len());

    json_response(StatusCode::OK, &QueryResponse::from_records(records))
}

/// Return a single record by its 1-based id.
#[instrument(name = "get_record", skip_all)]
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response> {
    let id: usize = id
        .parse()
        .map_err(|_| IngestError::InvalidRecordId(format!("'{id}' is not a record id")))?;

    let record = state
        .store
        .get(id)
        .await?
        .ok_or_else(|| IngestError::NotFound(format!("No record with id {id}")))?;

    json_response(
        StatusCode::OK,
        &RecordResponse {
            status: ResponseStatus::Success,
            data: record,
        },
    )
}

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> Result<Response> {
    let records = state.store.count().await?;
    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "records": records
    }))
    .into_response())
}

/// Prometheus text exposition of the ingestion metrics
pub async fn render_metrics(State(state): State<AppState>) -> Response {
    match &state.metrics {
        Some(handle) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        )
            .into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new("Metrics recorder is not installed.")),
        )
            .into_response(),
    }
}

pub async fn method_not_allowed(method: Method, uri: OriginalUri) -> IngestError {
    IngestError::MethodNotAllowed(format!("{method} not allowed on {}", uri.0.path()))
}

pub async fn not_found(uri: OriginalUri) -> IngestError {
    IngestError::NotFound(format!("not found: {}", uri.0.path()))
}
