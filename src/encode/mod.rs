//! M3U8 text encoder
//!
//! Pure functions turning a playlist model into playlist text. The
//! playlists call these from their cached `encode()`; hosts may call them
//! directly to render a snapshot without touching the cache.

mod master;
mod media;

pub use master::encode_master;
pub use media::encode_media;

use chrono::{DateTime, FixedOffset, SecondsFormat};

use crate::playlist::types::{Key, Map};

/// Shortest decimal form that round-trips, never in exponent notation.
pub(crate) fn format_float(value: f64) -> String {
    format!("{}", value)
}

/// Fixed-point with three decimals, e.g. `FRAME-RATE`.
pub(crate) fn format_fixed3(value: f64) -> String {
    format!("{:.3}", value)
}

/// RFC 3339 timestamp with `Z` for UTC. Trailing zeros of the fraction are
/// trimmed, and a zero fraction is left out.
pub(crate) fn format_datetime(value: &DateTime<FixedOffset>) -> String {
    let text = value.to_rfc3339_opts(SecondsFormat::Nanos, true);
    let dot = match text.find('.') {
        Some(dot) => dot,
        None => return text,
    };
    let end = text[dot + 1..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(text.len(), |i| dot + 1 + i);
    let fraction = text[dot + 1..end].trim_end_matches('0');
    if fraction.is_empty() {
        format!("{}{}", &text[..dot], &text[end..])
    } else {
        format!("{}.{}{}", &text[..dot], fraction, &text[end..])
    }
}

/// `,NAME="value"`
pub(crate) fn push_quoted(output: &mut String, name: &str, value: &str) {
    output.push_str(&format!(",{}=\"{}\"", name, value));
}

/// `,NAME=value`
pub(crate) fn push_plain(output: &mut String, name: &str, value: &str) {
    output.push_str(&format!(",{}={}", name, value));
}

/// Append a query string to a URI, joining with `&` when the URI already
/// has one and `check_existing` is set, with `?` otherwise.
pub(crate) fn push_uri(output: &mut String, uri: &str, args: &str, check_existing: bool) {
    output.push_str(uri);
    if !args.is_empty() {
        if check_existing && uri.contains('?') {
            output.push('&');
        } else {
            output.push('?');
        }
        output.push_str(args);
    }
    output.push('\n');
}

/// `#EXT-X-KEY` line
pub(crate) fn write_key(output: &mut String, key: &Key) {
    output.push_str("#EXT-X-KEY:METHOD=");
    output.push_str(&key.method);
    if !key.is_none_method() {
        output.push_str(&format!(",URI=\"{}\"", key.uri));
        if let Some(iv) = &key.iv {
            push_plain(output, "IV", iv);
        }
        if let Some(keyformat) = &key.keyformat {
            push_quoted(output, "KEYFORMAT", keyformat);
        }
        if let Some(versions) = &key.keyformat_versions {
            push_quoted(output, "KEYFORMATVERSIONS", versions);
        }
    }
    output.push('\n');
}

/// `#EXT-X-MAP` line
pub(crate) fn write_map(output: &mut String, map: &Map) {
    output.push_str(&format!("#EXT-X-MAP:URI=\"{}\"", map.uri));
    if map.length > 0 {
        output.push_str(&format!(",BYTERANGE={}@{}", map.length, map.offset));
    }
    output.push('\n');
}
