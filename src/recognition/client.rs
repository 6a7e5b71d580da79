//! # Recognition Client
//!
//! The network seam of a scan. [`RecognitionClient`] uploads one normalized
//! image and returns the raw response; interpretation is left to
//! [`classify_response`](super::response::classify_response) so every
//! client implementation is classified the same way.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::multipart::{Form, Part};
use reqwest::redirect::Policy;
use reqwest::Url;
use tracing::debug;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::normalize::payload::OCTET_STREAM;
use crate::normalize::NormalizedImage;
use crate::recognition::response::EndpointResponse;

/// Multipart field carrying the image.
pub const IMAGE_FIELD: &str = "image";

/// Abstract upload interface.
/// Implement this trait to reach a recognition service over another transport.
#[async_trait]
pub trait RecognitionClient: Send + Sync {
    /// Upload `image` once and return the raw response.
    ///
    /// # Errors
    ///
    /// Transport failures only (`Network`/`Timeout`). HTTP error statuses are
    /// returned as responses.
    async fn submit(&self, image: &NormalizedImage) -> ScanResult<EndpointResponse>;
}

#[async_trait]
impl<T: RecognitionClient + ?Sized> RecognitionClient for Arc<T> {
    async fn submit(&self, image: &NormalizedImage) -> ScanResult<EndpointResponse> {
        (**self).submit(image).await
    }
}

/// reqwest-backed client posting `multipart/form-data` to the endpoint.
///
/// Redirects are never followed: a redirect is how the server says a login is
/// required, and following it would land on an HTML login page.
#[derive(Debug, Clone)]
pub struct HttpRecognitionClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl HttpRecognitionClient {
    pub fn new(config: &ScanConfig) -> ScanResult<Self> {
        let endpoint = config.endpoint_url()?;
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScanError::network_with_source("build http client", e))?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl RecognitionClient for HttpRecognitionClient {
    async fn submit(&self, image: &NormalizedImage) -> ScanResult<EndpointResponse> {
        let form = Form::new().part(IMAGE_FIELD, image_part(image)?);

        debug!(
            endpoint = %self.endpoint,
            name = %image.name,
            content_type = %image.content_type,
            bytes = image.len(),
            "uploading image"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?.to_vec();

        debug!(status, bytes = body.len(), "recognition response received");

        Ok(EndpointResponse {
            status,
            location,
            body,
        })
    }
}

/// Build the single multipart part; an unparseable content type degrades to
/// `application/octet-stream` rather than failing the upload.
fn image_part(image: &NormalizedImage) -> ScanResult<Part> {
    let part = || Part::bytes(image.data.as_ref().clone()).file_name(image.name.clone());
    part()
        .mime_str(&image.content_type)
        .or_else(|_| part().mime_str(OCTET_STREAM))
        .map_err(|e| ScanError::network_with_source("build multipart body", e))
}
