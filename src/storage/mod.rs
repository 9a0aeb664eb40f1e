//! Object storage subsystem.
//!
//! # Data Flow
//! ```text
//! request path
//!     → BucketKey::from_path (decode, split, reject empty segments)
//!     → ObjectStore::get_object (s3.rs presigns and sends the GET)
//!     → BackendResponse (status, raw headers, streaming body)
//!       or BackendError (StorageFault | TransportFault)
//! ```
//!
//! # Design Decisions
//! - The store is a trait object so the handler can be driven without S3
//! - Raw backend headers are kept as a `HeaderMap`, never re-typed
//! - Bodies stay streaming; nothing is buffered on the success path

pub mod error;
pub mod s3;

use std::fmt;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use percent_encoding::percent_decode_str;

pub use error::{BackendError, S3ErrorBody};
pub use s3::{S3SetupError, S3Store};

/// Bucket and object key addressed by a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketKey {
    bucket: String,
    key: String,
}

impl BucketKey {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Parse `/bucket/key...`.
    ///
    /// The path is percent-decoded first and then split on `/` into at most
    /// three parts, so the key keeps any further slashes, including encoded
    /// ones. Returns `None` when the bucket or key is empty or the path is
    /// not valid percent-encoded UTF-8.
    pub fn from_path(path: &str) -> Option<Self> {
        let decoded = percent_decode_str(path).decode_utf8().ok()?;
        let mut parts = decoded.splitn(3, '/');
        // Whatever precedes the leading slash.
        parts.next()?;
        let bucket = parts.next().filter(|segment| !segment.is_empty())?;
        let key = parts.next().filter(|segment| !segment.is_empty())?;
        Some(Self::new(bucket, key))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for BucketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// A successful object fetch.
///
/// Dropping the body releases the backend connection.
#[derive(Debug)]
pub struct BackendResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Body,
}

/// Fetches objects from a bucket/key store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// GET `location`, forwarding `headers` to the backend.
    async fn get_object(
        &self,
        location: &BucketKey,
        headers: &HeaderMap,
    ) -> Result<BackendResponse, BackendError>;
}
