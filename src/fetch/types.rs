//! Fetch request, cache entry and error types.

use std::fmt;

use axum::http::{header, HeaderMap, Method, StatusCode};
use bytes::Bytes;
use thiserror::Error;
use url::Url;

/// Methods whose responses are stored in the cache.
const CACHEABLE_METHODS: [Method; 2] = [Method::GET, Method::HEAD];

/// Normalize a caller-supplied method name.
///
/// Anything outside HEAD/POST/PUT/DELETE/PATCH/OPTIONS becomes GET.
pub fn normalize_method(raw: &str) -> Method {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HEAD" => Method::HEAD,
        "POST" => Method::POST,
        "PUT" => Method::PUT,
        "DELETE" => Method::DELETE,
        "PATCH" => Method::PATCH,
        "OPTIONS" => Method::OPTIONS,
        _ => Method::GET,
    }
}

/// Whether responses to `method` go through the cache.
pub fn is_cacheable(method: &Method) -> bool {
    CACHEABLE_METHODS.contains(method)
}

/// Identity of a cacheable fetch: `METHOD:normalized-url`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(method: &Method, url: &Url) -> Self {
        Self(format!("{}:{}", method, url))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A captured upstream response.
///
/// Stored as-is in the cache and shared by reference afterwards.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Absent for HEAD.
    pub body: Option<Bytes>,
    /// Final URL after redirects.
    pub url: String,
}

impl CacheEntry {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }

    /// Content-Length as advertised by the upstream, if it parses.
    pub fn declared_length(&self) -> Option<u64> {
        self.headers
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse().ok())
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().unwrap_or_default()
    }
}

/// One outbound fetch as requested by the orchestration layer.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    /// Extra headers merged over the defaults.
    pub headers: HeaderMap,
    /// Let a caller `User-Agent` replace the identifying one.
    pub override_user_agent: bool,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, method: Method) -> Self {
        Self {
            url: url.into(),
            method,
            headers: HeaderMap::new(),
            override_user_agent: false,
        }
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn override_user_agent(mut self, enabled: bool) -> Self {
        self.override_user_agent = enabled;
        self
    }
}

/// Category of a failed upstream exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Target is not an absolute http(s) URL.
    InvalidUrl,
    /// DNS failure, refused or reset connection.
    Connect,
    /// Deadline elapsed before the exchange completed.
    Timeout,
    /// Any other failure sending the request or reading the head.
    Request,
    /// Response head arrived but the body could not be read.
    Body,
    /// Body exceeded the configured buffer limit.
    BodyTooLarge,
}

impl NetworkErrorKind {
    /// Caller-facing phrase. Transport internals never leak past this.
    pub fn describe(self) -> &'static str {
        match self {
            NetworkErrorKind::InvalidUrl => "invalid target url",
            NetworkErrorKind::Connect => "could not connect to upstream",
            NetworkErrorKind::Timeout => "request timed out",
            NetworkErrorKind::Request => "upstream request failed",
            NetworkErrorKind::Body => "failed to read upstream body",
            NetworkErrorKind::BodyTooLarge => "upstream body too large",
        }
    }

    /// Metric/log label.
    pub fn as_label(self) -> &'static str {
        match self {
            NetworkErrorKind::InvalidUrl => "invalid_url",
            NetworkErrorKind::Connect => "connect",
            NetworkErrorKind::Timeout => "timeout",
            NetworkErrorKind::Request => "request",
            NetworkErrorKind::Body => "body",
            NetworkErrorKind::BodyTooLarge => "body_too_large",
        }
    }
}

/// The upstream exchange could not be completed.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct NetworkError {
    pub kind: NetworkErrorKind,
    pub message: String,
    /// Whatever was received before the failure (status and headers).
    pub partial: Option<Box<CacheEntry>>,
}

impl NetworkError {
    /// Wire code reported to callers.
    pub const CODE: &'static str = "NETWORK_ERROR";

    pub fn new(kind: NetworkErrorKind) -> Self {
        Self {
            kind,
            message: kind.describe().to_string(),
            partial: None,
        }
    }

    pub fn with_partial(mut self, partial: CacheEntry) -> Self {
        self.partial = Some(Box::new(partial));
        self
    }
}

impl From<NetworkErrorKind> for NetworkError {
    fn from(kind: NetworkErrorKind) -> Self {
        Self::new(kind)
    }
}
