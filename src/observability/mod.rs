//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and startup produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every handler log event
//! - Metrics are recorded unconditionally; exposition is opt-in

pub mod logging;
pub mod metrics;
