//! Caller parameter parsing.
//!
//! # Responsibilities
//! - Pick the output format from the first path segment
//! - Read `url`, `charset`, `callback`, `disableCache`, `cacheMaxAge`
//! - Normalize the inbound method and apply the HEAD → info override

use axum::http::{Method, Uri};
use url::form_urlencoded;

use crate::fetch::normalize_method;
use crate::http::error::RelayError;
use crate::translate::OutputMode;

/// Format used when the path has no segment.
const DEFAULT_FORMAT: &str = "json";

/// Everything the handler needs from one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayParams {
    /// Lowercased path segment as given (`get`, `json`, `raw`, `info`).
    pub format: String,
    pub mode: OutputMode,
    /// Normalized inbound method.
    pub method: Method,
    pub url: String,
    pub charset: Option<String>,
    pub callback: Option<String>,
    pub disable_cache: bool,
    pub cache_max_age: Option<String>,
}

impl RelayParams {
    /// Parse from the inbound method and URI.
    pub fn parse(method: &Method, uri: &Uri) -> Result<Self, RelayError> {
        let format = uri
            .path()
            .split('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(DEFAULT_FORMAT)
            .to_ascii_lowercase();

        let mode = OutputMode::from_format(&format)
            .ok_or_else(|| RelayError::UnsupportedFormat(format.clone()))?;

        let query = QueryParams::parse(uri.query().unwrap_or_default());
        let url = query
            .url
            .filter(|u| !u.trim().is_empty())
            .ok_or(RelayError::MissingParameter)?;

        Ok(Self {
            format,
            mode,
            method: normalize_method(method.as_str()),
            url,
            charset: query.charset.filter(|c| !c.trim().is_empty()),
            callback: query.callback.filter(|c| !c.is_empty()),
            disable_cache: query.disable_cache.as_deref() == Some("true"),
            cache_max_age: query.cache_max_age,
        })
    }

    /// Mode and upstream method actually used for the fetch.
    ///
    /// `info` always fetches with HEAD, and a HEAD request always renders
    /// as `info`.
    pub fn fetch_plan(&self) -> (OutputMode, Method) {
        if self.mode == OutputMode::Info || self.method == Method::HEAD {
            (OutputMode::Info, Method::HEAD)
        } else {
            (self.mode, self.method.clone())
        }
    }

    /// Whether the inbound request is cacheable by the caller.
    pub fn is_idempotent_read(&self) -> bool {
        self.method == Method::GET || self.method == Method::HEAD
    }
}

/// Raw query values. First occurrence of each key wins.
#[derive(Debug, Default)]
struct QueryParams {
    url: Option<String>,
    charset: Option<String>,
    callback: Option<String>,
    disable_cache: Option<String>,
    cache_max_age: Option<String>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let mut params = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match &*key {
                "url" => &mut params.url,
                "charset" => &mut params.charset,
                "callback" => &mut params.callback,
                "disableCache" => &mut params.disable_cache,
                "cacheMaxAge" => &mut params.cache_max_age,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}
