//! The proxy handler: `/bucket/key` in, object (or fault) out.
//!
//! ```text
//! ParsePath ──missing bucket/key──▶ 404, backend untouched
//!     │
//!     ▼
//!   Fetch ──Ok──────────────▶ WriteSuccess (mirror status, headers, body)
//!     ├──StorageFault───────▶ WriteStructuredError (backend status, XML)
//!     └──TransportFault─────▶ WriteTransportError (500, message)
//! ```

use std::time::Instant;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::Response;

use crate::http::request::{forwarded_headers, request_id};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics::{self, Outcome};
use crate::storage::{BackendError, BucketKey};

/// Serve one request against the object store.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request_id(request.headers()).to_string();
    let path = request.uri().path();

    let Some(location) = BucketKey::from_path(path) else {
        tracing::debug!(request_id = %request_id, path = %path, "Path has no bucket and key");
        let response = response::path_not_found();
        metrics::record_request(Outcome::PathNotFound, response.status(), start_time);
        return response;
    };

    tracing::debug!(
        request_id = %request_id,
        method = %request.method(),
        bucket = location.bucket(),
        key = location.key(),
        "Fetching object"
    );

    let headers = forwarded_headers(request.headers(), &state.forward_headers);

    let (response, outcome) = match state.store.get_object(&location, &headers).await {
        Ok(backend) => (
            response::passthrough(backend, request_id),
            Outcome::Success,
        ),
        Err(BackendError::StorageFault { status, fault }) => {
            match response::storage_fault(status, &fault) {
                Ok((rendered, fault_xml)) => {
                    if response::is_redirect(status) {
                        tracing::debug!(
                            request_id = %request_id,
                            status = status.as_u16(),
                            fault = %fault_xml,
                            "Backend redirected"
                        );
                    } else {
                        tracing::error!(
                            request_id = %request_id,
                            status = status.as_u16(),
                            fault = %fault_xml,
                            "Backend returned error"
                        );
                    }
                    (rendered, Outcome::StorageFault)
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request_id,
                        status = status.as_u16(),
                        fault = %fault,
                        error = %e,
                        "Failed to render backend error"
                    );
                    (
                        response::plain_error(fault.to_string()),
                        Outcome::StorageFault,
                    )
                }
            }
        }
        Err(BackendError::TransportFault { message }) => {
            tracing::error!(
                request_id = %request_id,
                location = %location,
                error = %message,
                "Backend request failed"
            );
            (response::transport_fault(&message), Outcome::TransportFault)
        }
    };

    metrics::record_request(outcome, response.status(), start_time);
    response
}
