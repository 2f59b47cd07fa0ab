//! Caching upstream client.
//!
//! # Responsibilities
//! - Normalize the method and validate the target URL
//! - Attach the identifying User-Agent, merge caller headers
//! - Serve GET/HEAD from the shared cache, store them after a fetch
//! - Never cache transport failures
//!
//! The cache is written only after the transport call has fully completed.
//! Concurrent misses on the same key may both fetch; the last insert wins.

use std::sync::Arc;
use std::time::Instant;

use axum::http::{header, HeaderMap, HeaderValue};
use url::Url;

use crate::cache::SharedCache;
use crate::config::RelayConfig;
use crate::fetch::transport::{HttpTransport, OutboundRequest, Transport};
use crate::fetch::types::{
    is_cacheable, normalize_method, CacheEntry, CacheKey, FetchRequest, NetworkError,
    NetworkErrorKind,
};
use crate::observability::metrics;

/// Outcome of a successful [`FetchClient::fetch`].
#[derive(Debug, Clone)]
pub struct Fetched {
    pub entry: Arc<CacheEntry>,
    /// Served without touching the network.
    pub from_cache: bool,
}

/// Upstream client with an in-memory LRU in front of the transport.
pub struct FetchClient<T = HttpTransport> {
    transport: T,
    cache: SharedCache<CacheKey, Arc<CacheEntry>>,
    user_agent: HeaderValue,
}

impl FetchClient<HttpTransport> {
    /// Build the production client from configuration.
    pub fn from_config(config: &RelayConfig) -> reqwest::Result<Self> {
        let transport = HttpTransport::new(&config.upstream)?;
        let user_agent = HeaderValue::from_str(&config.upstream.user_agent())
            .unwrap_or_else(|_| HeaderValue::from_static("origin-relay"));
        Ok(Self::new(transport, config.cache.max_entries, user_agent))
    }
}

impl<T: Transport> FetchClient<T> {
    pub fn new(transport: T, max_entries: usize, user_agent: HeaderValue) -> Self {
        Self {
            transport,
            cache: SharedCache::new(max_entries),
            user_agent,
        }
    }

    /// Fetch `url` with a caller-supplied method name.
    pub async fn request(&self, url: &str, method: &str) -> Result<Fetched, NetworkError> {
        self.fetch(FetchRequest::new(url, normalize_method(method))).await
    }

    /// Fetch through the cache.
    pub async fn fetch(&self, request: FetchRequest) -> Result<Fetched, NetworkError> {
        let method = normalize_method(request.method.as_str());
        let url = parse_target(&request.url)?;
        let headers = self.outbound_headers(&request);

        let key = is_cacheable(&method).then(|| CacheKey::new(&method, &url));

        if let Some(key) = &key {
            if let Some(entry) = self.cache.get(key) {
                metrics::record_cache_lookup(true);
                tracing::debug!(key = %key, "Cache hit");
                return Ok(Fetched {
                    entry,
                    from_cache: true,
                });
            }
            metrics::record_cache_lookup(false);
        }

        let start = Instant::now();
        let method_label = method.to_string();
        let outbound = OutboundRequest {
            url,
            method,
            headers,
        };

        let entry = match self.transport.execute(outbound).await {
            Ok(entry) => Arc::new(entry),
            Err(e) => {
                metrics::record_upstream_fetch(&method_label, e.kind.as_label(), start);
                return Err(e);
            }
        };

        metrics::record_upstream_fetch(&method_label, "ok", start);
        tracing::debug!(
            method = %method_label,
            url = %entry.url,
            status = entry.status.as_u16(),
            "Upstream fetch complete"
        );

        if let Some(key) = key {
            if let Some(evicted) = self.cache.insert(key, entry.clone()) {
                tracing::trace!(key = %evicted, "Evicted least-recently-used entry");
            }
            metrics::record_cache_size(self.cache.len());
        }

        Ok(Fetched {
            entry,
            from_cache: false,
        })
    }

    /// Number of responses currently cached.
    pub fn cached_entries(&self) -> usize {
        self.cache.len()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn outbound_headers(&self, request: &FetchRequest) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent.clone());

        for (name, value) in request.headers.iter() {
            if name == header::USER_AGENT {
                if request.override_user_agent {
                    headers.insert(header::USER_AGENT, value.clone());
                }
                continue;
            }
            headers.append(name.clone(), value.clone());
        }
        headers
    }
}

/// Parse and normalize an absolute http(s) target.
fn parse_target(raw: &str) -> Result<Url, NetworkError> {
    match Url::parse(raw.trim()) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(url),
        _ => {
            tracing::debug!(url = %raw, "Rejected target url");
            Err(NetworkError::new(NetworkErrorKind::InvalidUrl))
        }
    }
}
