//! Canonical output shapes.

use bytes::Bytes;
use serde::Serialize;

/// Requested rendering of a fetched resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Decoded text plus status (default).
    Contents,
    /// Body bytes passed through untouched.
    Raw,
    /// Status line and headers only.
    Info,
}

impl OutputMode {
    /// Map a URL path segment (`get`, `json`, `raw`, `info`) to a mode.
    pub fn from_format(format: &str) -> Option<Self> {
        match format.to_ascii_lowercase().as_str() {
            "get" | "json" => Some(OutputMode::Contents),
            "raw" => Some(OutputMode::Raw),
            "info" => Some(OutputMode::Info),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OutputMode::Contents => "contents",
            OutputMode::Raw => "raw",
            OutputMode::Info => "info",
        }
    }
}

/// Result of translating a fetch. Built once, then rendered.
#[derive(Debug, Clone)]
pub enum OutputEnvelope {
    Contents(PageContents),
    Raw(RawPage),
    Info(PageInfo),
}

impl OutputEnvelope {
    /// True when no upstream response was available at all.
    pub fn is_error(&self) -> bool {
        matches!(self, OutputEnvelope::Contents(page) if page.status.error.is_some())
    }

    /// Upstream status code, when one was received.
    pub fn http_code(&self) -> Option<u16> {
        match self {
            OutputEnvelope::Contents(page) => page.status.http_code,
            OutputEnvelope::Raw(_) => None,
            OutputEnvelope::Info(info) => Some(info.http_code),
        }
    }
}

/// `{"contents": ..., "status": {...}}`
#[derive(Debug, Clone, Serialize)]
pub struct PageContents {
    pub contents: Option<String>,
    pub status: Status,
}

/// Status block of a contents envelope.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Status {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_length: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDescriptor>,
}

/// Reported in place of a response when the transport produced none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDescriptor {
    pub code: &'static str,
    pub message: String,
}

/// Untouched body for passthrough.
#[derive(Debug, Clone)]
pub struct RawPage {
    pub bytes: Bytes,
    pub content_type: Option<String>,
    /// Actual byte length of `bytes`.
    pub content_length: usize,
}

/// `{"url", "content_type", "content_length", "http_code"}`
#[derive(Debug, Clone, Serialize)]
pub struct PageInfo {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Declared Content-Length, or -1.
    pub content_length: i64,
    pub http_code: u16,
}
