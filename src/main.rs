//! S3 Object Proxy
//!
//! Maps `GET /{bucket}/{key...}` onto an S3 GET and streams the answer back.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────┐
//!                         │                  S3 PROXY                    │
//!                         │                                              │
//!   Client Request        │  ┌─────────┐    ┌─────────┐    ┌──────────┐  │
//!   ──────────────────────┼─▶│  http   │───▶│  proxy  │───▶│ storage  │──┼──▶ S3
//!                         │  │ server  │    │ handler │    │ (presign │  │
//!   Client Response       │  │ + layers│◀───│         │◀───│  + GET)  │◀─┼─── S3
//!   ◀─────────────────────┼──│         │    └─────────┘    └──────────┘  │
//!                         │  └─────────┘                                 │
//!                         │                                              │
//!                         │  config · observability · lifecycle          │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use s3_proxy::config::ProxyConfig;
use s3_proxy::lifecycle::signals::spawn_signal_listener;
use s3_proxy::lifecycle::startup::{self, Overrides};
use s3_proxy::lifecycle::Shutdown;
use s3_proxy::observability::logging::init_logging;

#[derive(Parser, Debug)]
#[command(name = "s3-proxy")]
#[command(about = "HTTP proxy serving S3 objects at /{bucket}/{key}", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// HTTP bind address, e.g. ":2380" or "127.0.0.1:2380"
    #[arg(long)]
    bind: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,

    /// Custom S3-compatible endpoint URL
    #[arg(long)]
    endpoint_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config: ProxyConfig = startup::resolve_config(
        cli.config.as_deref(),
        Overrides {
            bind_address: cli.bind,
            region: cli.region,
            endpoint_url: cli.endpoint_url,
            log_level: cli.log_level,
        },
    )?;

    init_logging(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        metrics_enabled = config.observability.metrics_enabled,
        "Configuration loaded"
    );

    let shutdown = Shutdown::new();
    spawn_signal_listener(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
