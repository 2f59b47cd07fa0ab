//! Cross-origin headers.
//!
//! Every response carries the CORS headers browsers need to read it from
//! any origin. The caller's `Origin` is echoed back (credentials are
//! allowed, so `*` is only used when no origin was sent).

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

const ALLOW_HEADERS: &str = "Origin, X-Requested-With, Content-Type, Content-Encoding, Accept";
const ALLOW_METHODS: &str = "OPTIONS, GET, POST, PATCH, PUT, DELETE";

/// Append CORS headers to whatever the inner service returns.
pub async fn cors_middleware(request: Request<Body>, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .cloned()
        .unwrap_or_else(|| HeaderValue::from_static("*"));

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    response
}
