//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → request.rs (request id)
//!     → cors.rs (CORS headers on the way out)
//!     → params.rs (format, url, charset, callback, freshness hints)
//!     → fetch::FetchClient (cache or upstream)
//!     → translate (contents / raw / info envelope)
//!     → response.rs (Cache-Control, JSON/JSONP or raw bytes)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod params;
pub mod request;
pub mod response;
pub mod server;

pub use error::RelayError;
pub use params::RelayParams;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
