//! Ingestion metrics.
//!
//! Counters are recorded through the `metrics` facade and are no-ops until
//! [`init_metrics`] installs the Prometheus recorder. The recorder is rendered
//! in-process by the `/metrics` route rather than through a separate listener.

use crate::types::Payload;
use ::metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit,
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::{info, warn};

pub const RECORDS_INGESTED: &str = "webhook_sink_records_ingested_total";
pub const PAYLOADS_REJECTED: &str = "webhook_sink_payloads_rejected_total";
pub const QUERIES: &str = "webhook_sink_queries_total";
pub const PAYLOAD_BYTES: &str = "webhook_sink_payload_bytes";
pub const LOG_RECORDS: &str = "webhook_sink_log_records";

/// Install the global Prometheus recorder.
///
/// Returns `None` when a recorder is already installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            register_metrics();
            info!("Prometheus recorder installed");
            Some(handle)
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
            None
        }
    }
}

fn register_metrics() {
    describe_counter!(RECORDS_INGESTED, "Records appended to the log, by payload kind");
    describe_counter!(PAYLOADS_REJECTED, "Request bodies refused by the payload policy");
    describe_counter!(QUERIES, "Log queries served");
    describe_histogram!(PAYLOAD_BYTES, Unit::Bytes, "Size of accepted request bodies");
    describe_gauge!(LOG_RECORDS, "Records currently held in the log");
}

pub fn record_ingested(payload: &Payload, body_bytes: usize) {
    counter!(RECORDS_INGESTED, "kind" => payload.kind()).increment(1);
    histogram!(PAYLOAD_BYTES).record(body_bytes as f64);
    // Records are never removed, so the gauge only moves up by one per append
    gauge!(LOG_RECORDS).increment(1.0);
}

pub fn record_rejected() {
    counter!(PAYLOADS_REJECTED).increment(1);
}

pub fn record_query() {
    counter!(QUERIES).increment(1);
}
