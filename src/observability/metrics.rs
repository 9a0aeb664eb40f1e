//! Metrics collection and exposition.
//!
//! # Metrics
//! - `s3_proxy_requests_total` (counter): requests by outcome and status
//! - `s3_proxy_request_duration_seconds` (histogram): time to response headers
//!
//! Recording is a no-op until a recorder is installed, so handlers and
//! tests can record unconditionally.

use std::net::SocketAddr;
use std::time::Instant;

use axum::http::StatusCode;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

/// How a request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    PathNotFound,
    StorageFault,
    TransportFault,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::PathNotFound => "not_found_path",
            Outcome::StorageFault => "storage_fault",
            Outcome::TransportFault => "transport_fault",
        }
    }
}

/// Install the Prometheus recorder and serve it on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished request.
pub fn record_request(outcome: Outcome, status: StatusCode, start: Instant) {
    metrics::counter!(
        "s3_proxy_requests_total",
        "outcome" => outcome.as_str(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);

    metrics::histogram!(
        "s3_proxy_request_duration_seconds",
        "outcome" => outcome.as_str()
    )
    .record(start.elapsed().as_secs_f64());
}
