//! Response translation subsystem.
//!
//! # Data Flow
//! ```text
//! CacheEntry + OutputMode + charset
//!     → info:     declared Content-Length (or -1), no body decoding
//!     → raw:      bytes untouched, length counted from the bytes
//!     → contents: charset.rs decodes the body, status block attached
//!
//! NetworkError
//!     → partial response: contents-shaped, body decoded as UTF-8
//!     → no response:      contents = null, status.error set
//! ```
//!
//! # Design Decisions
//! - Translation is pure; it never performs I/O and never fails
//! - Undecodable text degrades to replacement characters
//! - `url` in the output is the caller's target, not the post-redirect URL

pub mod charset;
pub mod envelope;

pub use envelope::{
    ErrorDescriptor, OutputEnvelope, OutputMode, PageContents, PageInfo, RawPage, Status,
};

use crate::fetch::{CacheEntry, NetworkError};

/// Turn a captured response into the requested output shape.
pub fn translate(
    entry: &CacheEntry,
    target_url: &str,
    mode: OutputMode,
    charset: Option<&str>,
) -> OutputEnvelope {
    let content_type = entry.content_type().map(str::to_owned);

    match mode {
        OutputMode::Info => OutputEnvelope::Info(PageInfo {
            url: target_url.to_owned(),
            content_type,
            content_length: entry
                .declared_length()
                .and_then(|len| i64::try_from(len).ok())
                .unwrap_or(-1),
            http_code: entry.status.as_u16(),
        }),
        OutputMode::Raw => {
            let bytes = entry.body.clone().unwrap_or_default();
            OutputEnvelope::Raw(RawPage {
                content_length: bytes.len(),
                bytes,
                content_type,
            })
        }
        OutputMode::Contents => {
            let text = charset::decode(entry.body_bytes(), charset);
            OutputEnvelope::Contents(PageContents {
                status: Status {
                    url: Some(target_url.to_owned()),
                    content_type,
                    content_length: Some(text_length(&text)),
                    http_code: Some(entry.status.as_u16()),
                    error: None,
                },
                contents: Some(text),
            })
        }
    }
}

/// Render a failed fetch. Always contents-shaped and always carries
/// `status.error`, even when part of the response was received.
pub fn translate_failure(error: &NetworkError) -> OutputEnvelope {
    let descriptor = ErrorDescriptor {
        code: NetworkError::CODE,
        message: error.message.clone(),
    };

    let page = match &error.partial {
        Some(partial) => {
            let body = partial.body_bytes();
            PageContents {
                contents: Some(charset::decode(body, None)),
                status: Status {
                    url: Some(partial.url.clone()),
                    content_type: partial.content_type().map(str::to_owned),
                    content_length: Some(body.len()),
                    http_code: Some(partial.status.as_u16()),
                    error: Some(descriptor),
                },
            }
        }
        None => PageContents {
            contents: None,
            status: Status {
                error: Some(descriptor),
                ..Default::default()
            },
        },
    };
    OutputEnvelope::Contents(page)
}

/// Length as browser clients count it (UTF-16 code units).
fn text_length(text: &str) -> usize {
    text.encode_utf16().count()
}
