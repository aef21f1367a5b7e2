//! Whole-message decoding.

use crate::address::{Address, parse_address_list};
use crate::decode::{DecodedBody, decode_body};
use crate::encoding::transcode;
use crate::error::Result;
use crate::header::Headers;
use crate::subject::decode_header_value;

/// A fetched message with its headers and bodies decoded.
#[derive(Debug, Clone)]
pub struct Message {
    /// Parsed top-level headers, after charset conversion.
    pub headers: Headers,
    /// Sender, or [`Address::unknown`] when `From` is missing or invalid.
    pub from: Address,
    /// Recipients; empty when `To` is missing or invalid.
    pub to: Vec<Address>,
    /// Subject with encoded words expanded.
    pub subject: String,
    /// `Precedence` header (`bulk`, `list`, ...), or empty.
    pub precedence: String,
    /// HTML and text payloads.
    pub body: DecodedBody,
}

impl Message {
    /// Decodes a message from its raw header block and full body.
    ///
    /// `header` is the `RFC822.HEADER` data and `raw` the `BODY[]` data. The
    /// header block is transcoded from `header_charset` before parsing;
    /// bodies keep their declared charsets (see [`decode_body`]).
    ///
    /// # Errors
    ///
    /// Fails when `header_charset` is unknown or the body cannot be decoded.
    pub fn decode(header: &[u8], raw: &[u8], header_charset: &str) -> Result<Self> {
        let header_text = transcode(header, header_charset)?;
        let headers = Headers::parse(&header_text);

        let from = headers
            .get("from")
            .and_then(Address::parse)
            .unwrap_or_else(Address::unknown);
        let to = headers
            .get("to")
            .and_then(parse_address_list)
            .unwrap_or_default();
        let subject = decode_header_value(headers.get_or_empty("subject"));
        let precedence = headers.get_or_empty("precedence").to_string();
        let body = decode_body(&headers, raw)?;

        Ok(Self {
            headers,
            from,
            to,
            subject,
            precedence,
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::subject::DEFAULT_HEADER_CHARSET;

    const HEADER: &[u8] = b"From: =?UTF-8?B?5rWL6K+V?= <news@example.cn>\r\n\
To: a@example.com, B <b@example.com>\r\n\
Subject: =?UTF-8?B?5rWL6K+V?=\r\n\
Precedence: bulk\r\n\
Content-Type: text/html; charset=utf-8\r\n\
Content-Transfer-Encoding: base64\r\n";

    #[test]
    fn test_decode_full_message() {
        let mut raw = HEADER.to_vec();
        raw.extend_from_slice(b"\r\nPGI+aGk8L2I+\r\n");
        let message = Message::decode(HEADER, &raw, DEFAULT_HEADER_CHARSET).unwrap();
        assert_eq!(message.from.name.as_deref(), Some("测试"));
        assert_eq!(message.to.len(), 2);
        assert_eq!(message.subject, "测试");
        assert_eq!(message.precedence, "bulk");
        assert_eq!(message.body.html, b"<b>hi</b>");
    }

    #[test]
    fn test_gbk_header_block() {
        let mut header = b"Subject: ".to_vec();
        header.extend_from_slice(&[0xb2, 0xe2, 0xca, 0xd4]);
        header.extend_from_slice(b"\r\nTo: nobody\r\n");
        let mut raw = header.clone();
        raw.extend_from_slice(b"\r\nbody");
        let message = Message::decode(&header, &raw, "gbk").unwrap();
        assert_eq!(message.subject, "测试");
        assert_eq!(message.from, Address::unknown());
        assert!(message.to.is_empty());
        assert_eq!(message.body.text, b"body");
    }

    #[test]
    fn test_body_errors_propagate() {
        let header = b"Content-Type: multipart/mixed\r\n";
        let err = Message::decode(header, header, DEFAULT_HEADER_CHARSET).unwrap_err();
        assert!(matches!(err, Error::MalformedMessage(_)));
    }
}
