//! Transfer-encoding and charset decoding.
//!
//! Base64 and quoted-printable body decoders, charset transcoding through
//! `encoding_rs`, and RFC 2047 encoded-word decoding for header values.

use std::borrow::Cow;

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use encoding_rs::Encoding;

use crate::error::{Error, Result};

/// Standard alphabet, padding optional. Mail clients routinely drop the
/// trailing `=` in encoded words.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Decodes a base64 body, ignoring line breaks and other whitespace.
///
/// # Errors
///
/// Returns [`Error::Decode`] on characters outside the alphabet or a bad
/// final quantum.
pub fn decode_base64(data: &[u8]) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = data
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(LENIENT_BASE64.decode(cleaned)?)
}

/// Decodes a quoted-printable body into Windows-style text.
///
/// Soft line breaks (`=` at end of line) are removed, every hard line break
/// comes out as CRLF whatever the input used, and trailing spaces and tabs
/// on encoded lines are dropped.
///
/// # Errors
///
/// Returns [`Error::Decode`] when `=` is followed by anything other than two
/// hex digits or a line break.
pub fn decode_quoted_printable(data: &[u8]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    let mut lines = data.split(|&b| b == b'\n').peekable();

    while let Some(line) = lines.next() {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let line = trim_end_blanks(line);
        let (line, soft_break) = match line.strip_suffix(b"=") {
            Some(stripped) => (stripped, true),
            None => (line, false),
        };
        unescape_into(line, &mut out, false)?;
        if !soft_break && lines.peek().is_some() {
            out.extend_from_slice(b"\r\n");
        }
    }
    Ok(out)
}

fn trim_end_blanks(line: &[u8]) -> &[u8] {
    let end = line
        .iter()
        .rposition(|&b| b != b' ' && b != b'\t')
        .map_or(0, |i| i + 1);
    &line[..end]
}

/// Expands `=XX` escapes (and `_` when `underscore_is_space`).
fn unescape_into(input: &[u8], out: &mut Vec<u8>, underscore_is_space: bool) -> Result<()> {
    let mut i = 0;
    while i < input.len() {
        match input[i] {
            b'=' => {
                let byte = input
                    .get(i + 1..i + 3)
                    .and_then(|hex| Some((hex_value(hex[0])? << 4) | hex_value(hex[1])?))
                    .ok_or_else(|| {
                        Error::decode(format!("quoted-printable: malformed escape at byte {i}"))
                    })?;
                out.push(byte);
                i += 3;
            }
            b'_' if underscore_is_space => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    Ok(())
}

const fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'A'..=b'F' => Some(b - b'A' + 10),
        b'a'..=b'f' => Some(b - b'a' + 10),
        _ => None,
    }
}

/// Looks up a charset by any of its WHATWG labels (`gbk`, `latin1`,
/// `utf-8`, ...).
#[must_use]
pub fn lookup_charset(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Transcodes `bytes` from `charset` to UTF-8. Malformed sequences become
/// U+FFFD.
///
/// # Errors
///
/// Returns [`Error::Decode`] when the charset label is unknown.
pub fn transcode<'a>(bytes: &'a [u8], charset: &str) -> Result<Cow<'a, str>> {
    let encoding =
        lookup_charset(charset).ok_or_else(|| Error::decode(format!("unknown charset {charset:?}")))?;
    let (text, _had_errors) = encoding.decode_without_bom_handling(bytes);
    Ok(text)
}

/// One `=?charset?encoding?text?=` token.
struct EncodedWord<'a> {
    charset: &'a str,
    encoding: &'a str,
    text: &'a str,
}

impl EncodedWord<'_> {
    /// Parses an encoded word at the start of `s`, returning it with its
    /// length in bytes.
    fn parse_prefix(s: &str) -> Option<(EncodedWord<'_>, usize)> {
        let body = s.strip_prefix("=?")?;
        let (charset, rest) = body.split_once('?')?;
        let (encoding, rest) = rest.split_once('?')?;
        let end = rest.find("?=")?;
        let text = &rest[..end];
        if charset.is_empty()
            || encoding.len() != 1
            || charset.contains(|c: char| c.is_whitespace() || c == '=')
            || text.contains(|c: char| c.is_whitespace() || c == '?')
        {
            return None;
        }
        let len = 2 + charset.len() + 1 + encoding.len() + 1 + text.len() + 2;
        Some((EncodedWord { charset, encoding, text }, len))
    }

    fn decode(&self) -> Option<String> {
        let payload = match self.encoding {
            "B" | "b" => LENIENT_BASE64.decode(self.text).ok()?,
            "Q" | "q" => {
                let mut out = Vec::with_capacity(self.text.len());
                unescape_into(self.text.as_bytes(), &mut out, true).ok()?;
                out
            }
            _ => return None,
        };
        // RFC 2231 language suffix: `utf-8*en`.
        let charset = self.charset.split('*').next().unwrap_or(self.charset);
        transcode(&payload, charset).ok().map(Cow::into_owned)
    }
}

/// Decodes every RFC 2047 encoded word in a header value.
///
/// Whitespace between two adjacent encoded words is dropped. Words with an
/// unknown charset or an undecodable payload are left verbatim, as is any
/// `=?` that does not start a well-formed word.
#[must_use]
pub fn decode_encoded_words(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    let mut after_word = false;

    while let Some(start) = rest.find("=?") {
        let (before, candidate) = rest.split_at(start);
        let Some((word, len)) = EncodedWord::parse_prefix(candidate) else {
            out.push_str(before);
            out.push_str("=?");
            rest = &candidate[2..];
            after_word = false;
            continue;
        };

        if let Some(text) = word.decode() {
            if !(after_word && before.chars().all(char::is_whitespace)) {
                out.push_str(before);
            }
            out.push_str(&text);
            after_word = true;
        } else {
            out.push_str(before);
            out.push_str(&candidate[..len]);
            after_word = false;
        }
        rest = &candidate[len..];
    }
    out.push_str(rest);
    out
}
