//! S3 backend.
//!
//! # Responsibilities
//! - Resolve region and credentials once at startup (aws-config chain)
//! - Presign each GET with the SDK and send it with a shared HTTP client
//! - Hand raw status, headers and body stream back untouched
//! - Turn non-success responses into structured faults
//!
//! # Design Decisions
//! - Presigning keeps the SDK's signing while leaving the raw response
//!   (header order, multi-valued headers, body bytes) under our control
//! - Redirects are not followed; a 3xx is the backend's answer
//! - Transport error messages never include the presigned URL

use std::time::Duration;

use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::error::CredentialsError;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_s3::presigning::PresigningConfig;
use axum::body::Body;
use axum::http::{HeaderMap, StatusCode};
use thiserror::Error;

use crate::config::StorageConfig;
use crate::storage::{BackendError, BackendResponse, BucketKey, ObjectStore, S3ErrorBody};

/// Errors building the S3 backend at startup.
#[derive(Debug, Error)]
pub enum S3SetupError {
    #[error("can't determine region name")]
    MissingRegion,

    #[error("no AWS credentials provider is configured")]
    NoCredentialsProvider,

    #[error("can't load AWS credentials: {0}")]
    MissingCredentials(#[source] CredentialsError),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// [`ObjectStore`] backed by S3 or an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3Store {
    client: aws_sdk_s3::Client,
    http: reqwest::Client,
    presign_expiry: Duration,
    max_error_body_bytes: usize,
}

impl S3Store {
    /// Resolve region and credentials from the environment and build a store.
    ///
    /// `config.region` wins over the SDK's default region chain, which
    /// covers `AWS_REGION`, profiles and instance metadata.
    pub async fn from_env(config: &StorageConfig) -> Result<Self, S3SetupError> {
        let region_provider =
            RegionProviderChain::first_try(config.region.clone().map(Region::new))
                .or_default_provider();

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .load()
            .await;

        Self::from_sdk_config(&sdk_config, config).await
    }

    /// Build a store from loaded SDK settings.
    ///
    /// Fails unless both a region and a set of credentials resolve now,
    /// so a process without credentials never starts serving.
    pub async fn from_sdk_config(
        sdk_config: &SdkConfig,
        config: &StorageConfig,
    ) -> Result<Self, S3SetupError> {
        let region = sdk_config.region().ok_or(S3SetupError::MissingRegion)?;
        let credentials = sdk_config
            .credentials_provider()
            .ok_or(S3SetupError::NoCredentialsProvider)?;
        credentials
            .provide_credentials()
            .await
            .map_err(S3SetupError::MissingCredentials)?;

        tracing::info!(
            region = %region,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            path_style = config.force_path_style,
            "S3 backend configured"
        );

        let mut builder = aws_sdk_s3::config::Builder::from(sdk_config)
            .force_path_style(config.force_path_style);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(aws_sdk_s3::Client::from_conf(builder.build()), config)
    }

    /// Wrap an already configured SDK client.
    pub fn new(client: aws_sdk_s3::Client, config: &StorageConfig) -> Result<Self, S3SetupError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            http,
            presign_expiry: config.presign_expiry(),
            max_error_body_bytes: config.max_error_body_bytes,
        })
    }

    /// Region the SDK client signs for.
    pub fn region(&self) -> Option<&Region> {
        self.client.config().region()
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn get_object(
        &self,
        location: &BucketKey,
        headers: &HeaderMap,
    ) -> Result<BackendResponse, BackendError> {
        let presigning = PresigningConfig::expires_in(self.presign_expiry)
            .map_err(|e| BackendError::from_error_chain(&e))?;

        let presigned = self
            .client
            .get_object()
            .bucket(location.bucket())
            .key(location.key())
            .presigned(presigning)
            .await
            .map_err(|e| BackendError::from_error_chain(&e))?;

        let mut request = self.http.get(presigned.uri());
        for (name, value) in presigned.headers() {
            request = request.header(name, value);
        }

        let response = request
            .headers(headers.clone())
            .send()
            .await
            .map_err(|e| BackendError::from_error_chain(&e.without_url()))?;

        let status = response.status();
        if is_success(status) {
            return Ok(BackendResponse {
                status,
                headers: response.headers().clone(),
                body: Body::from_stream(response.bytes_stream()),
            });
        }

        let headers = response.headers().clone();
        let body = read_error_body(response, self.max_error_body_bytes).await;
        tracing::debug!(
            status = %status,
            bucket = location.bucket(),
            key = location.key(),
            body_bytes = body.len(),
            "Backend returned non-success status"
        );

        Err(BackendError::storage(
            status,
            S3ErrorBody::from_response(status, &headers, &body),
        ))
    }
}

/// Statuses passed through as object data; every other status is a fault.
pub fn is_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::NO_CONTENT | StatusCode::PARTIAL_CONTENT
    )
}

/// Read at most `limit` bytes of a fault body, then drop the response.
async fn read_error_body(mut response: reqwest::Response, limit: usize) -> Vec<u8> {
    let mut body = Vec::new();
    while body.len() < limit {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                let take = chunk.len().min(limit - body.len());
                body.extend_from_slice(&chunk[..take]);
            }
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e.without_url(), "Failed to read backend error body");
                break;
            }
        }
    }
    body
}
