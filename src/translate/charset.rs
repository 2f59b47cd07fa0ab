//! Body decoding.
//!
//! Unknown or missing charset labels decode as UTF-8. Malformed input is
//! replaced with U+FFFD rather than rejected, so a body always yields text.

use encoding_rs::{Encoding, UTF_8};

/// Resolve a WHATWG charset label, falling back to UTF-8.
pub fn resolve(label: Option<&str>) -> &'static Encoding {
    label
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .and_then(|l| Encoding::for_label(l.as_bytes()))
        .unwrap_or(UTF_8)
}

/// Whether `label` names an encoding we can decode.
pub fn is_known(label: &str) -> bool {
    Encoding::for_label(label.trim().as_bytes()).is_some()
}

/// Decode `bytes` with the encoding named by `label`.
pub fn decode(bytes: &[u8], label: Option<&str>) -> String {
    let encoding = resolve(label);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::debug!(
            encoding = encoding.name(),
            "Malformed input replaced while decoding body"
        );
    }
    text.into_owned()
}
