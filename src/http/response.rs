//! Response rendering.
//!
//! # Responsibilities
//! - Cache-Control for GET/HEAD (caller freshness, clamped)
//! - Raw passthrough with upstream Content-Type and real Content-Length
//! - JSON envelopes with `response_time`, optionally JSONP-wrapped
//!
//! # Design Decisions
//! - Envelopes are rendered with HTTP 200 even when the upstream failed;
//!   the failure lives in `status.error`
//! - JSONP callbacks are limited to identifier characters, anything else is
//!   ignored and plain JSON is returned

use std::time::Duration;

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use serde_json::Value;

use crate::config::FreshnessConfig;
use crate::http::error::RelayError;
use crate::http::params::RelayParams;
use crate::translate::{charset, OutputEnvelope};

/// Cache-Control for the relay response, if the request is a GET/HEAD.
pub fn cache_control(params: &RelayParams, freshness: &FreshnessConfig) -> Option<String> {
    if !params.is_idempotent_read() {
        return None;
    }

    let max_age = if params.disable_cache {
        0
    } else {
        let requested = params
            .cache_max_age
            .as_deref()
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite() && *v > 0.0)
            .map(|v| v as u64)
            .unwrap_or(freshness.default_max_age_secs);
        requested.max(freshness.min_max_age_secs)
    };

    Some(format!(
        "public, max-age={}, stale-if-error={}",
        max_age, freshness.stale_if_error_secs
    ))
}

/// A JSONP callback name we are willing to echo.
pub fn valid_callback(callback: &str) -> bool {
    !callback.is_empty()
        && callback.len() <= 128
        && callback
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '.'))
        && !callback.starts_with(|c: char| c.is_ascii_digit() || c == '.')
}

/// Render an envelope into the final HTTP response.
pub fn render(
    envelope: &OutputEnvelope,
    params: &RelayParams,
    freshness: &FreshnessConfig,
    elapsed: Duration,
) -> Result<Response, RelayError> {
    let mut builder = Response::builder().status(StatusCode::OK);
    if let Some(value) = cache_control(params, freshness) {
        builder = builder.header(header::CACHE_CONTROL, value);
    }

    if let OutputEnvelope::Raw(raw) = envelope {
        builder = builder.header(header::CONTENT_LENGTH, raw.content_length);
        if let Some(content_type) = raw
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        return Ok(builder.body(Body::from(raw.bytes.clone()))?);
    }

    let payload = json_payload(envelope, elapsed.as_millis() as u64)?;

    let callback = params
        .callback
        .as_deref()
        .filter(|cb| valid_callback(cb));
    let (body, content_type) = match callback {
        Some(cb) => (
            format!("{}({})", cb, payload),
            "application/javascript".to_string(),
        ),
        None => (payload.to_string(), json_content_type(params.charset.as_deref())),
    };

    Ok(builder
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))?)
}

/// Serialize a JSON envelope and stamp `response_time` (ms) onto it.
fn json_payload(envelope: &OutputEnvelope, response_time: u64) -> Result<Value, RelayError> {
    let mut value = match envelope {
        OutputEnvelope::Contents(page) => serde_json::to_value(page)?,
        OutputEnvelope::Info(info) => serde_json::to_value(info)?,
        OutputEnvelope::Raw(_) => {
            return Err(RelayError::Internal("raw envelope has no JSON form".into()))
        }
    };

    let stamp = Value::from(response_time);
    if let Some(Value::Object(status)) = value.get_mut("status") {
        status.insert("response_time".into(), stamp);
    } else if let Some(object) = value.as_object_mut() {
        object.insert("response_time".into(), stamp);
    }
    Ok(value)
}

fn json_content_type(charset: Option<&str>) -> String {
    let label = charset
        .map(str::trim)
        .filter(|c| charset::is_known(c) && c.chars().all(|ch| ch.is_ascii_graphic()))
        .unwrap_or("utf-8");
    format!("application/json; charset={}", label)
}
