//! Backend failure types.

use std::error::Error as StdError;
use std::fmt;

use axum::http::{HeaderMap, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of a single backend fetch.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend answered with a structured error document.
    #[error("storage fault ({status}): {fault}")]
    StorageFault {
        status: StatusCode,
        fault: S3ErrorBody,
    },

    /// The request never produced a backend answer.
    #[error("{message}")]
    TransportFault { message: String },
}

impl BackendError {
    pub fn storage(status: StatusCode, fault: S3ErrorBody) -> Self {
        Self::StorageFault { status, fault }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::TransportFault {
            message: message.into(),
        }
    }

    /// Build a transport fault from an error and its whole source chain.
    pub fn from_error_chain(err: &(dyn StdError + 'static)) -> Self {
        let mut message = err.to_string();
        let mut source = err.source();
        while let Some(cause) = source {
            let text = cause.to_string();
            // Some errors already embed their cause in their own message.
            if !message.ends_with(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::transport(message)
    }
}

/// Error document returned by an S3-compatible backend.
///
/// Field names follow the backend's PascalCase elements. `StatusCode` is not
/// part of the backend document; it is filled in from the HTTP response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct S3ErrorBody {
    pub status_code: u16,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub code: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub bucket_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub request_id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub host_id: String,
}

impl S3ErrorBody {
    /// Build the fault for a non-success backend response.
    ///
    /// An unparsable or empty body still yields a fault: the message falls
    /// back to the status line and request ids come from the headers.
    pub fn from_response(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Self {
        let mut fault = std::str::from_utf8(body)
            .ok()
            .filter(|text| !text.trim().is_empty())
            .and_then(|text| quick_xml::de::from_str::<S3ErrorBody>(text).ok())
            .unwrap_or_default();

        fault.status_code = status.as_u16();
        if fault.message.is_empty() {
            fault.message = status.to_string();
        }
        if fault.request_id.is_empty() {
            fault.request_id = header_string(headers, "x-amz-request-id");
        }
        if fault.host_id.is_empty() {
            fault.host_id = header_string(headers, "x-amz-id-2");
        }
        fault
    }

    /// Serialize as a standalone `<Error>` element.
    pub fn to_xml(&self) -> Result<String, quick_xml::errors::serialize::SeError> {
        quick_xml::se::to_string_with_root("Error", self)
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

impl fmt::Display for S3ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.code, self.message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const NO_SUCH_KEY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>NoSuchKey</Code><Message>The specified key does not exist.</Message><Key>missing.txt</Key><RequestId>4442587FB7D0A2F9</RequestId><HostId>host-id-value</HostId></Error>"#;

    #[test]
    fn parses_backend_document() {
        let fault = S3ErrorBody::from_response(
            StatusCode::NOT_FOUND,
            &HeaderMap::new(),
            NO_SUCH_KEY.as_bytes(),
        );
        assert_eq!(fault.status_code, 404);
        assert_eq!(fault.code, "NoSuchKey");
        assert_eq!(fault.message, "The specified key does not exist.");
        assert_eq!(fault.key, "missing.txt");
        assert_eq!(fault.request_id, "4442587FB7D0A2F9");
        assert_eq!(fault.host_id, "host-id-value");
    }

    #[test]
    fn empty_body_falls_back_to_status_and_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-amz-request-id", HeaderValue::from_static("REQ123"));
        headers.insert("x-amz-id-2", HeaderValue::from_static("HOST456"));

        let fault = S3ErrorBody::from_response(StatusCode::NOT_MODIFIED, &headers, b"");
        assert_eq!(fault.status_code, 304);
        assert_eq!(fault.code, "");
        assert_eq!(fault.message, "304 Not Modified");
        assert_eq!(fault.request_id, "REQ123");
        assert_eq!(fault.host_id, "HOST456");
    }

    #[test]
    fn non_xml_body_is_tolerated() {
        let fault =
            S3ErrorBody::from_response(StatusCode::BAD_GATEWAY, &HeaderMap::new(), b"<html>oops");
        assert_eq!(fault.status_code, 502);
        assert_eq!(fault.message, "502 Bad Gateway");
    }

    #[test]
    fn serializes_populated_fields_only() {
        let fault = S3ErrorBody {
            status_code: 404,
            code: "NoSuchKey".into(),
            message: "The specified key does not exist.".into(),
            key: "a&b.txt".into(),
            ..Default::default()
        };
        assert_eq!(
            fault.to_xml().unwrap(),
            "<Error><StatusCode>404</StatusCode><Code>NoSuchKey</Code>\
             <Message>The specified key does not exist.</Message><Key>a&amp;b.txt</Key></Error>"
        );
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct SendError(#[source] std::io::Error);

    #[test]
    fn transport_message_includes_causes() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = BackendError::from_error_chain(&SendError(io));
        assert_eq!(err.to_string(), "error sending request: connection refused");
        assert!(matches!(err, BackendError::TransportFault { .. }));
    }
}
