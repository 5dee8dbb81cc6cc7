//! Attribute line decoding and value encoding.

use std::borrow::Cow;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{LdifError, Result};
use crate::resolve::UrlResolver;

/// Right-hand side of an attribute line, before decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawValue<'a> {
    /// `type: value`
    Plain(&'a [u8]),
    /// `type:: base64`
    Base64(&'a [u8]),
    /// `type:< url`
    Url(&'a [u8]),
}

/// Split a logical line into its attribute type and raw value.
///
/// Returns `None` when the line has no colon or the type is empty, not
/// UTF-8, or contains a space.
pub fn split_line(text: &[u8]) -> Option<(&str, RawValue<'_>)> {
    let colon = text.iter().position(|&c| c == b':')?;
    let name = std::str::from_utf8(&text[..colon]).ok()?;
    if name.is_empty() || name.contains(' ') {
        return None;
    }
    let rest = &text[colon + 1..];
    let raw = match rest.first() {
        Some(b':') => RawValue::Base64(&rest[1..]),
        Some(b'<') => RawValue::Url(&rest[1..]),
        _ => RawValue::Plain(rest.strip_prefix(b" ").unwrap_or(rest)),
    };
    Some((name, raw))
}

/// Resolve a raw value to its bytes: base64 is decoded, URLs are fetched
/// through `resolver`.
pub fn decode(raw: RawValue<'_>, line: usize, resolver: &dyn UrlResolver) -> Result<Vec<u8>> {
    match raw {
        RawValue::Plain(v) => Ok(v.to_vec()),
        RawValue::Base64(v) => STANDARD
            .decode(v.trim_ascii())
            .map_err(|e| LdifError::MalformedValue {
                line,
                reason: format!("invalid base64: {}", e),
            }),
        RawValue::Url(v) => {
            let url = String::from_utf8_lossy(v.trim_ascii()).into_owned();
            tracing::trace!(line, url = %url, "fetching external value");
            resolver
                .fetch(&url)
                .map_err(|source| LdifError::ExternalValueUnavailable { line, url, source })
        }
    }
}

/// True if `value` has to be written as base64: any byte outside the
/// printable ASCII range 0x20..=0x7E.
pub fn needs_base64(value: &[u8]) -> bool {
    value.iter().any(|&c| !(0x20..=0x7e).contains(&c))
}

/// Encode a value for output. The flag is true when base64 was used.
pub fn encode(value: &[u8]) -> (Cow<'_, str>, bool) {
    if needs_base64(value) {
        (Cow::Owned(STANDARD.encode(value)), true)
    } else {
        (String::from_utf8_lossy(value), false)
    }
}

/// Build an unfolded `type: value` or `type:: base64` line.
pub fn attr_line(name: &str, value: &[u8]) -> String {
    let (encoded, base64) = encode(value);
    let sep = if base64 { ":: " } else { ": " };
    let mut line = String::with_capacity(name.len() + sep.len() + encoded.len());
    line.push_str(name);
    line.push_str(sep);
    line.push_str(&encoded);
    line
}
