//! S3 Object Proxy Library
//!
//! Serves `GET /{bucket}/{key...}` by fetching the object from an
//! S3-compatible store and mirroring the backend's response.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod storage;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use storage::{BackendError, BackendResponse, BucketKey, ObjectStore, S3Store};
