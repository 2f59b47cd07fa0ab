//! Upstream fetch subsystem.
//!
//! # Data Flow
//! ```text
//! FetchRequest (url, method, headers)
//!     → client.rs (normalize method, parse url, build headers)
//!     → GET/HEAD: cache lookup by "METHOD:url"
//!         → hit: stored CacheEntry, no network I/O
//!     → transport.rs (one exchange; HEAD reads head only)
//!     → GET/HEAD: store CacheEntry (any HTTP status)
//!     → CacheEntry or NetworkError
//! ```
//!
//! # Design Decisions
//! - Any response the transport received is a success, 4xx/5xx included
//! - Transport failures carry an optional partial response, never cached
//! - Transport is a trait so tests can swap in an in-memory fake

pub mod client;
pub mod transport;
pub mod types;

pub use client::{FetchClient, Fetched};
pub use transport::{HttpTransport, OutboundRequest, Transport};
pub use types::{
    is_cacheable, normalize_method, CacheEntry, CacheKey, FetchRequest, NetworkError,
    NetworkErrorKind,
};
