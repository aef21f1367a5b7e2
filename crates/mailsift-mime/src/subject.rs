//! Subject decoding.
//!
//! Subjects from some servers arrive as raw GBK bytes wrapped around
//! encoded words, so the raw value is transcoded from a source charset
//! before the encoded words are expanded.

use crate::encoding::{decode_encoded_words, transcode};
use crate::error::Result;

/// Source charset assumed for raw header bytes.
pub const DEFAULT_HEADER_CHARSET: &str = "gbk";

/// True when `value` contains both an encoded-word opener and closer.
#[must_use]
pub fn has_encoding(value: &str) -> bool {
    value.contains("=?") && value.contains("?=")
}

/// Strict check: `value` is exactly one `=?charset?enc?text?=` token.
///
/// Advisory only; decoding does not require it.
#[must_use]
pub fn is_encoded_word(value: &str) -> bool {
    value.starts_with("=?") && value.ends_with("?=") && value.matches('?').count() == 4
}

/// Expands encoded words in an already-transcoded header value. Values
/// without encoding markers come back unchanged.
#[must_use]
pub fn decode_header_value(value: &str) -> String {
    if has_encoding(value) {
        decode_encoded_words(value)
    } else {
        value.to_string()
    }
}

/// Decodes a raw subject header value.
///
/// Without encoding markers the bytes are returned as they are (invalid
/// UTF-8 replaced). Otherwise the bytes are transcoded from
/// `source_charset` and the encoded words expanded, even when they are not
/// strictly well formed.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] when `source_charset` is unknown.
pub fn decode_subject(raw: &[u8], source_charset: &str) -> Result<String> {
    let has_opener = raw.windows(2).any(|w| w == b"=?");
    let has_closer = raw.windows(2).any(|w| w == b"?=");
    if !(has_opener && has_closer) {
        return Ok(String::from_utf8_lossy(raw).into_owned());
    }
    let text = transcode(raw, source_charset)?;
    Ok(decode_encoded_words(&text))
}
