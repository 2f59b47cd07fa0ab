//! HTTP server setup and request orchestration.
//!
//! # Responsibilities
//! - Create the Axum router; every path reaches one handler
//! - Wire up middleware (request id, tracing, CORS, Via, timeout)
//! - Parse caller parameters and plan the upstream fetch
//! - Translate the fetch result and render it with Cache-Control
//! - Log and count every processed request

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderValue, Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{FreshnessConfig, RelayConfig};
use crate::fetch::{FetchClient, FetchRequest};
use crate::http::cors::cors_middleware;
use crate::http::params::RelayParams;
use crate::http::request::{request_id, UuidRequestId};
use crate::http::response::render;
use crate::lifecycle::shutdown;
use crate::observability::metrics;
use crate::translate::{translate, translate_failure};

/// Value of the `Via` header on every response.
const VIA: &str = concat!("origin-relay v", env!("CARGO_PKG_VERSION"));

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub fetcher: Arc<FetchClient>,
    pub freshness: FreshnessConfig,
}

/// HTTP server for the relay.
pub struct HttpServer {
    router: Router,
    config: RelayConfig,
}

impl HttpServer {
    /// Create a server around an already constructed fetch client.
    pub fn new(config: RelayConfig, fetcher: Arc<FetchClient>) -> Self {
        let state = AppState {
            fetcher,
            freshness: config.freshness.clone(),
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Create a server with a fresh production fetch client.
    pub fn from_config(config: RelayConfig) -> reqwest::Result<Self> {
        let fetcher = Arc::new(FetchClient::from_config(&config)?);
        Ok(Self::new(config, fetcher))
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &RelayConfig, state: AppState) -> Router {
        Router::new()
            .route("/", any(relay_handler))
            .route("/{*path}", any(relay_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(SetResponseHeaderLayer::overriding(
                        header::VIA,
                        HeaderValue::from_static(VIA),
                    ))
                    .layer(middleware::from_fn(cors_middleware))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            cache_capacity = self.config.cache.max_entries,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &RelayConfig {
        &self.config
    }
}

/// Main relay handler.
/// Parses parameters, fetches through the cache, and renders the envelope.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request_id(&request);

    // Preflight: CORS headers are added by the middleware.
    if request.method() == Method::OPTIONS {
        metrics::record_request("preflight", 200, start);
        return StatusCode::OK.into_response();
    }

    let params = match RelayParams::parse(request.method(), request.uri()) {
        Ok(params) => params,
        Err(e) => {
            tracing::debug!(
                request_id = %request_id,
                uri = %request.uri(),
                error = %e,
                "Rejected request"
            );
            metrics::record_request("invalid", 400, start);
            return e.into_response();
        }
    };

    let (mode, fetch_method) = params.fetch_plan();
    tracing::debug!(
        request_id = %request_id,
        format = %params.format,
        method = %fetch_method,
        url = %params.url,
        "Relaying request"
    );

    let fetch = FetchRequest::new(params.url.clone(), fetch_method);
    let (envelope, from_cache) = match state.fetcher.fetch(fetch).await {
        Ok(fetched) => (
            translate(&fetched.entry, &params.url, mode, params.charset.as_deref()),
            fetched.from_cache,
        ),
        Err(e) => {
            tracing::warn!(
                request_id = %request_id,
                url = %params.url,
                kind = e.kind.as_label(),
                partial = e.partial.is_some(),
                "Upstream fetch failed"
            );
            (translate_failure(&e), false)
        }
    };

    let response = match render(&envelope, &params, &state.freshness, start.elapsed()) {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    tracing::info!(
        request_id = %request_id,
        format = %params.format,
        method = %params.method,
        url = %params.url,
        http_code = ?envelope.http_code(),
        error = envelope.is_error(),
        from_cache,
        response_time_ms = start.elapsed().as_millis() as u64,
        "Request processed"
    );
    metrics::record_request(mode.as_str(), response.status().as_u16(), start);

    response
}
