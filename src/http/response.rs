//! Response rendering.
//!
//! # Responsibilities
//! - Mirror a backend response (status, headers, streaming body)
//! - Render structured faults as an XML `<Error>` document
//! - Render transport faults and malformed paths
//!
//! # Design Decisions
//! - `Server` is overridden by a layer in `server.rs`, so it is set on
//!   every response, including ones produced by middleware
//! - Streaming responses avoid buffering the body

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use futures_util::TryStreamExt;

use crate::storage::{BackendResponse, S3ErrorBody};

/// Value of the `Server` header on every response.
pub const SERVER_NAME: &str = "s3_proxy";

const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Mirror a successful backend response.
///
/// Backend read errors after the headers are sent are logged; the client
/// connection is then closed by the server.
pub fn passthrough(backend: BackendResponse, request_id: String) -> Response {
    let BackendResponse {
        status,
        headers,
        body,
    } = backend;

    let stream = body.into_data_stream().inspect_err(move |e| {
        tracing::error!(request_id = %request_id, error = %e, "Streaming object body failed");
    });

    let mut response = Response::new(Body::from_stream(stream));
    *response.status_mut() = status;
    let outbound = response.headers_mut();
    for (name, value) in headers.iter() {
        outbound.append(name.clone(), value.clone());
    }
    response
}

/// Full error document: `<?xml ...?><Error>{fault}</Error>`.
pub fn fault_document(fault_xml: &str) -> String {
    format!("{XML_DECLARATION}<Error>{fault_xml}</Error>")
}

/// Render a structured fault with the backend's status.
///
/// Returns the serialized fault alongside the response so the caller can log it.
pub fn storage_fault(
    status: StatusCode,
    fault: &S3ErrorBody,
) -> Result<(Response, String), quick_xml::errors::serialize::SeError> {
    let fault_xml = fault.to_xml()?;
    let response = (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/xml"),
        )],
        fault_document(&fault_xml),
    )
        .into_response();
    Ok((response, fault_xml))
}

/// Render a transport fault: 500 with the message as the body.
pub fn transport_fault(message: &str) -> Response {
    plain_error(message.to_string())
}

/// Plain-text 500.
pub fn plain_error(message: String) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
}

/// 404 with an empty body for paths without a bucket and key.
pub fn path_not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

/// Structured faults in this range are expected and are not logged as errors.
pub fn is_redirect(status: StatusCode) -> bool {
    status.is_redirection()
}
