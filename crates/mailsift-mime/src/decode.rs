//! Body decoding: multipart walk, charset and transfer decoding, and
//! HTML/text classification.

use std::borrow::Cow;

use crate::content_type::ContentType;
use crate::encoding::{decode_base64, decode_quoted_printable, transcode};
use crate::error::{Error, Result};
use crate::header::{Headers, split_header_body};
use crate::multipart::split_parts;

/// HTML and plain-text payloads pulled out of a message.
///
/// Either payload may be empty. Bytes are in the part's own charset unless
/// it was ISO-8859-1, which is converted to UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedBody {
    /// Last `text/html` payload found.
    pub html: Vec<u8>,
    /// Declared charset of `html`, when it is still in that charset.
    pub html_charset: Option<String>,
    /// Last `text/plain` payload found.
    pub text: Vec<u8>,
    /// Whether the top-level type was `multipart/*`.
    pub is_multipart: bool,
}

/// Which output slot a decoded part fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Html,
    Text,
}

impl Slot {
    fn classify(media_type: &str) -> Option<Self> {
        if media_type.contains("text/html") {
            Some(Self::Html)
        } else if media_type.contains("text/plain") {
            Some(Self::Text)
        } else {
            None
        }
    }
}

/// Decodes the body of a message.
///
/// `headers` are the top-level message headers; `raw` is the full message as
/// returned by `BODY[]`, headers included.
///
/// For `multipart/*` each part is decoded on its own. When several parts map
/// to the same slot the last one wins; parts that are neither HTML nor text
/// are skipped. A part whose `Content-Type` cannot be parsed ends the walk
/// with what was collected so far.
///
/// # Errors
///
/// - [`Error::Decode`] for an unparseable top-level `Content-Type` or a
///   failed transfer decode.
/// - [`Error::MalformedMessage`] for a multipart without a boundary, or a
///   single-part message without a blank line after its headers.
pub fn decode_body(headers: &Headers, raw: &[u8]) -> Result<DecodedBody> {
    let content_type = headers
        .get("content-type")
        .map_or_else(|| Ok(ContentType::default()), ContentType::parse)?;

    let mut decoded = DecodedBody::default();

    if content_type.is_multipart() {
        decoded.is_multipart = true;
        let boundary = content_type
            .boundary()
            .ok_or_else(|| Error::malformed("multipart body without boundary"))?;

        for part in split_parts(raw, boundary) {
            let Ok(part_type) = part.content_type() else {
                break;
            };
            let slot = decode_part(
                &part_type,
                part.transfer_encoding(),
                part.body,
            )?;
            decoded.store(slot);
        }
        return Ok(decoded);
    }

    let (_, body) = split_header_body(raw).ok_or_else(|| {
        Error::malformed("single part message without a blank line after the headers")
    })?;
    let encoding = headers.get_or_empty("content-transfer-encoding");
    decoded.store(decode_part(&content_type, encoding, body)?);
    Ok(decoded)
}

impl DecodedBody {
    fn store(&mut self, decoded: Option<DecodedPart>) {
        match decoded {
            Some(DecodedPart {
                slot: Slot::Html,
                bytes,
                charset,
            }) => {
                self.html = bytes;
                self.html_charset = charset;
            }
            Some(DecodedPart {
                slot: Slot::Text,
                bytes,
                ..
            }) => self.text = bytes,
            None => {}
        }
    }

    /// The HTML payload as text, converted from its declared charset.
    ///
    /// Without a charset, or with one that is not recognised, the bytes are
    /// read as UTF-8. Malformed sequences become U+FFFD either way.
    #[must_use]
    pub fn html_text(&self) -> Cow<'_, str> {
        html_text(&self.html, self.html_charset.as_deref())
    }
}

/// Converts an HTML payload from `charset` to text, falling back to lossy
/// UTF-8.
#[must_use]
pub fn html_text<'a>(html: &'a [u8], charset: Option<&str>) -> Cow<'a, str> {
    charset
        .and_then(|label| transcode(html, label).ok())
        .unwrap_or_else(|| String::from_utf8_lossy(html))
}

/// One classified part after transfer decoding.
struct DecodedPart {
    slot: Slot,
    bytes: Vec<u8>,
    /// Charset the bytes are still in; `None` once converted to UTF-8.
    charset: Option<String>,
}

/// Transcodes, undoes the transfer encoding and classifies one part.
fn decode_part(
    content_type: &ContentType,
    transfer_encoding: &str,
    body: &[u8],
) -> Result<Option<DecodedPart>> {
    let latin1;
    let (body, charset) = match content_type.charset() {
        Some(charset) if charset.eq_ignore_ascii_case("iso-8859-1") => {
            latin1 = transcode(body, charset)?.into_owned();
            (latin1.as_bytes(), None)
        }
        charset => (body, charset.map(str::to_string)),
    };

    let bytes = match transfer_encoding.trim().to_ascii_lowercase().as_str() {
        "quoted-printable" => decode_quoted_printable(body)?,
        "base64" => decode_base64(body)?,
        _ => body.to_vec(),
    };

    Ok(Slot::classify(&content_type.media_type()).map(|slot| DecodedPart {
        slot,
        bytes,
        charset,
    }))
}
