//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve configuration (file, then command-line overrides, then validation)
//! - Initialize subsystems in dependency order
//! - Bind the listener last, so traffic arrives only when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Nothing started here is mutable once serving

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::loader::read_config;
use crate::config::validation::validate_config;
use crate::config::{ConfigError, ProxyConfig};
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::storage::{S3SetupError, S3Store};

/// Settings given on the command line. `None` keeps the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub bind_address: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to initialize metrics: {0}")]
    Metrics(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to initialize S3 backend: {0}")]
    Storage(#[from] S3SetupError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the effective configuration.
pub fn resolve_config(
    path: Option<&Path>,
    overrides: Overrides,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ProxyConfig::default(),
    };

    if let Some(bind_address) = overrides.bind_address {
        config.listener.bind_address = bind_address;
    }
    if let Some(region) = overrides.region.filter(|r| !r.is_empty()) {
        config.storage.region = Some(region);
    }
    if let Some(endpoint_url) = overrides.endpoint_url {
        config.storage.endpoint_url = Some(endpoint_url);
    }
    if let Some(log_level) = overrides.log_level {
        config.observability.log_level = log_level;
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Start every subsystem and serve until `shutdown` fires.
pub async fn run(config: ProxyConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Validation guarantees the address parses.
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr)?;
        }
    }

    let store = S3Store::from_env(&config.storage).await?;
    let region = store
        .region()
        .map(ToString::to_string)
        .unwrap_or_default();

    let bind_address = config.listener.bind_address.clone();
    let addr = config
        .listener
        .socket_addr()
        .map_err(|e| StartupError::Bind {
            address: bind_address.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;

    tracing::info!("s3_proxy starting at {} for {} region", bind_address, region);

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Bind {
            address: bind_address,
            source,
        })?;

    let server = HttpServer::new(&config, Arc::new(store));
    server
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}
