//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::HeaderName;
use serde::{Deserialize, Serialize};

/// Root configuration for the S3 proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Object storage backend settings.
    pub storage: StorageConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:2380" or ":2380").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:2380".to_string(),
        }
    }
}

impl ListenerConfig {
    /// Parse the bind address. A bare `:port` binds every interface.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        if self.bind_address.starts_with(':') {
            format!("0.0.0.0{}", self.bind_address).parse()
        } else {
            self.bind_address.parse()
        }
    }
}

/// Object storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// AWS region. Falls back to the SDK provider chain when unset.
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible stores.
    pub endpoint_url: Option<String>,

    /// Address buckets as `endpoint/bucket/key` instead of `bucket.endpoint/key`.
    pub force_path_style: bool,

    /// Lifetime of each presigned GET in seconds.
    pub presign_expiry_secs: u64,

    /// Inbound request headers forwarded to the backend.
    pub forward_headers: Vec<String>,

    /// Upper bound on how much of a fault body is read for parsing.
    pub max_error_body_bytes: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            region: None,
            endpoint_url: None,
            force_path_style: false,
            presign_expiry_secs: 300,
            forward_headers: vec![
                "range".to_string(),
                "if-match".to_string(),
                "if-none-match".to_string(),
                "if-modified-since".to_string(),
                "if-unmodified-since".to_string(),
            ],
            max_error_body_bytes: 64 * 1024,
        }
    }
}

impl StorageConfig {
    /// Forwarded header names. Invalid entries are skipped; validation reports them.
    pub fn forward_header_names(&self) -> Vec<HeaderName> {
        self.forward_headers
            .iter()
            .filter_map(|name| HeaderName::from_bytes(name.as_bytes()).ok())
            .collect()
    }

    pub fn presign_expiry(&self) -> Duration {
        Duration::from_secs(self.presign_expiry_secs)
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed from request arrival until response headers, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_port() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:2380");
        assert_eq!(config.timeouts.request_secs, 30);
        assert!(!config.observability.metrics_enabled);
    }

    #[test]
    fn bare_port_binds_all_interfaces() {
        let listener = ListenerConfig {
            bind_address: ":2380".to_string(),
        };
        assert_eq!(listener.socket_addr().unwrap(), "0.0.0.0:2380".parse().unwrap());
    }

    #[test]
    fn default_forward_headers_are_conditional_and_range() {
        let names = StorageConfig::default().forward_header_names();
        assert_eq!(names.len(), 5);
        assert!(names.contains(&axum::http::header::RANGE));
        assert!(names.contains(&axum::http::header::IF_NONE_MATCH));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [storage]
            region = "eu-west-1"
            force_path_style = true

            [observability]
            log_format = "compact"
            "#,
        )
        .unwrap();

        assert_eq!(config.storage.region.as_deref(), Some("eu-west-1"));
        assert!(config.storage.force_path_style);
        assert_eq!(config.storage.presign_expiry_secs, 300);
        assert_eq!(config.observability.log_format, LogFormat::Compact);
        assert_eq!(config.listener.bind_address, "0.0.0.0:2380");
    }
}
