//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges and formats.
//! Every failing rule is reported, not just the first.

use axum::http::HeaderName;
use std::net::SocketAddr;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// Longest lifetime S3 accepts for a presigned URL (7 days).
const MAX_PRESIGN_EXPIRY_SECS: u64 = 604_800;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a valid socket address")]
    InvalidBindAddress(String),

    #[error("storage.endpoint_url `{url}` is not a valid URL: {reason}")]
    InvalidEndpointUrl { url: String, reason: String },

    #[error("storage.endpoint_url scheme `{0}` is not http or https")]
    UnsupportedEndpointScheme(String),

    #[error("storage.presign_expiry_secs must be between 1 and 604800, got {0}")]
    PresignExpiryOutOfRange(u64),

    #[error("storage.forward_headers entry `{0}` is not a valid header name")]
    InvalidForwardHeader(String),

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),

    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),

    #[error("observability.metrics_address `{0}` is not a valid socket address")]
    InvalidMetricsAddress(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.socket_addr().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if let Some(endpoint) = &config.storage.endpoint_url {
        match Url::parse(endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(ValidationError::UnsupportedEndpointScheme(
                url.scheme().to_string(),
            )),
            Err(e) => errors.push(ValidationError::InvalidEndpointUrl {
                url: endpoint.clone(),
                reason: e.to_string(),
            }),
        }
    }

    let expiry = config.storage.presign_expiry_secs;
    if expiry == 0 || expiry > MAX_PRESIGN_EXPIRY_SECS {
        errors.push(ValidationError::PresignExpiryOutOfRange(expiry));
    }

    for name in &config.storage.forward_headers {
        if HeaderName::from_bytes(name.as_bytes()).is_err() {
            errors.push(ValidationError::InvalidForwardHeader(name.clone()));
        }
    }

    if config.storage.max_error_body_bytes == 0 {
        errors.push(ValidationError::ZeroValue("storage.max_error_body_bytes"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroValue("timeouts.request_secs"));
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
