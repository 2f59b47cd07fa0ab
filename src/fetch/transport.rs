//! Network transport for upstream fetches.
//!
//! # Responsibilities
//! - Perform exactly one upstream exchange per call
//! - Read only the head for HEAD, buffer the whole body otherwise
//! - Enforce connect/request timeouts and the body size limit
//! - Classify failures into [`NetworkErrorKind`]

use std::future::Future;
use std::time::Duration;

use axum::http::{HeaderMap, Method};
use bytes::BytesMut;
use url::Url;

use crate::config::UpstreamConfig;
use crate::fetch::types::{CacheEntry, NetworkError, NetworkErrorKind};

/// A fully prepared outbound request.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
}

/// Something that can carry an [`OutboundRequest`] to the network.
pub trait Transport: Send + Sync + 'static {
    /// Execute the exchange. A received response of any status is `Ok`.
    fn execute(
        &self,
        request: OutboundRequest,
    ) -> impl Future<Output = Result<CacheEntry, NetworkError>> + Send;
}

/// Production transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    max_body_bytes: usize,
}

impl HttpTransport {
    pub fn new(config: &UpstreamConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self {
            client,
            max_body_bytes: config.max_body_bytes,
        })
    }
}

impl Transport for HttpTransport {
    async fn execute(&self, request: OutboundRequest) -> Result<CacheEntry, NetworkError> {
        let OutboundRequest { url, method, headers } = request;
        let is_head = method == Method::HEAD;

        let mut response = self
            .client
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(classify)?;

        let mut entry = CacheEntry {
            status: response.status(),
            headers: response.headers().clone(),
            body: None,
            url: response.url().to_string(),
        };

        if is_head {
            return Ok(entry);
        }

        let mut body = BytesMut::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    if body.len() + chunk.len() > self.max_body_bytes {
                        tracing::warn!(
                            url = %entry.url,
                            limit = self.max_body_bytes,
                            "Upstream body exceeds limit"
                        );
                        entry.body = Some(body.freeze());
                        return Err(
                            NetworkError::new(NetworkErrorKind::BodyTooLarge).with_partial(entry)
                        );
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(e) => {
                    let kind = if e.is_timeout() {
                        NetworkErrorKind::Timeout
                    } else {
                        NetworkErrorKind::Body
                    };
                    tracing::warn!(url = %entry.url, error = %e, "Upstream body read failed");
                    entry.body = Some(body.freeze());
                    return Err(NetworkError::new(kind).with_partial(entry));
                }
            }
        }

        entry.body = Some(body.freeze());
        Ok(entry)
    }
}

/// Map a `reqwest` send error to a caller-safe [`NetworkError`].
fn classify(error: reqwest::Error) -> NetworkError {
    let kind = if error.is_timeout() {
        NetworkErrorKind::Timeout
    } else if error.is_connect() {
        NetworkErrorKind::Connect
    } else if error.is_builder() {
        NetworkErrorKind::InvalidUrl
    } else if error.is_body() || error.is_decode() {
        NetworkErrorKind::Body
    } else {
        NetworkErrorKind::Request
    };

    tracing::warn!(
        kind = kind.as_label(),
        error = ?error,
        "Upstream exchange failed"
    );
    NetworkError::new(kind)
}
