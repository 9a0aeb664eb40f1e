//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) unless the client sent one
//! - Select the inbound headers that are forwarded to the backend
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Only an allow-list of headers reaches the backend; everything else
//!   (Host, Authorization, cookies) stays at the proxy

use axum::http::{HeaderMap, HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Issues a fresh UUID v4 for every request without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read the request ID for logging.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Copy the allow-listed headers, keeping every value in its original order.
pub fn forwarded_headers(inbound: &HeaderMap, allowed: &[HeaderName]) -> HeaderMap {
    let mut forwarded = HeaderMap::new();
    for name in allowed {
        for value in inbound.get_all(name) {
            forwarded.append(name.clone(), value.clone());
        }
    }
    forwarded
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    #[test]
    fn forwards_only_allowed_headers() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("proxy.local"));
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer secret"));
        inbound.insert(header::RANGE, HeaderValue::from_static("bytes=0-99"));
        inbound.append(header::IF_NONE_MATCH, HeaderValue::from_static("\"a\""));
        inbound.append(header::IF_NONE_MATCH, HeaderValue::from_static("\"b\""));

        let allowed = [header::RANGE, header::IF_NONE_MATCH, header::IF_MATCH];
        let forwarded = forwarded_headers(&inbound, &allowed);

        assert_eq!(forwarded.len(), 3);
        assert_eq!(forwarded[header::RANGE], "bytes=0-99");
        let etags: Vec<_> = forwarded.get_all(header::IF_NONE_MATCH).iter().collect();
        assert_eq!(etags, ["\"a\"", "\"b\""]);
        assert!(!forwarded.contains_key(header::HOST));
        assert!(!forwarded.contains_key(header::AUTHORIZATION));
    }

    #[test]
    fn request_id_defaults_to_unknown() {
        assert_eq!(request_id(&HeaderMap::new()), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(request_id(&headers), "abc-123");
    }

    #[test]
    fn generated_ids_are_unique() {
        let mut maker = UuidRequestId;
        let request = Request::new(());
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
