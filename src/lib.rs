//! Origin relay library.
//!
//! Fetches an arbitrary URL on behalf of a caller and returns it with
//! permissive CORS headers, either as a JSON envelope (`get`/`json`), the
//! raw bytes (`raw`) or metadata only (`info`). GET and HEAD upstream
//! responses are kept in a bounded in-memory LRU.

pub mod cache;
pub mod config;
pub mod fetch;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod translate;

pub use cache::{BoundedCache, SharedCache};
pub use config::RelayConfig;
pub use fetch::{FetchClient, NetworkError};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use translate::{OutputEnvelope, OutputMode};
