//! Decoded email records.

use std::borrow::Cow;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use mailsift_imap::FetchedMessage;
use mailsift_mime::{Address, Message, html_text, visible_text};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::error::{Error, Result};

const INTERNAL_DATE_FORMAT: &str = "%d-%b-%Y %H:%M:%S %z";

/// A fetched message reduced to the parts callers act on.
///
/// Serializes with both payloads as strings; the HTML is converted from
/// its declared charset first.
#[derive(Debug, Clone)]
pub struct DecodedEmail {
    /// Sender, or `Unknown <unknown@example.com>`.
    pub from: Address,
    /// Recipients.
    pub to: Vec<Address>,
    /// Server arrival time.
    pub internal_date: Option<DateTime<FixedOffset>>,
    /// `Precedence` header, often `bulk` or `list`.
    pub precedence: String,
    /// Decoded subject.
    pub subject: String,
    /// HTML payload; may be empty.
    pub html: Vec<u8>,
    /// Charset `html` is still encoded in, if it was not converted.
    pub html_charset: Option<String>,
    /// Plain-text payload; may be empty.
    pub text: Vec<u8>,
    /// The top-level body was `multipart/*`.
    pub is_multipart: bool,
    /// UID within the folder it was fetched from.
    pub uid: u32,
}

impl Serialize for DecodedEmail {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("DecodedEmail", 9)?;
        s.serialize_field("from", &self.from)?;
        s.serialize_field("to", &self.to)?;
        s.serialize_field("internal_date", &self.internal_date)?;
        s.serialize_field("precedence", &self.precedence)?;
        s.serialize_field("subject", &self.subject)?;
        s.serialize_field("html", &self.html_str())?;
        s.serialize_field("text", &self.text_str())?;
        s.serialize_field("is_multipart", &self.is_multipart)?;
        s.serialize_field("uid", &self.uid)?;
        s.end()
    }
}

/// Parses an IMAP `INTERNALDATE` value such as `17-Jul-2023 02:44:25 -0700`.
#[must_use]
pub fn parse_internal_date(value: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_str(value.trim(), INTERNAL_DATE_FORMAT).ok()
}

impl DecodedEmail {
    /// Decodes one FETCH record.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] when the UID, header or body is missing, or the
    /// MIME structure cannot be decoded.
    pub fn from_fetched(message: &FetchedMessage, header_charset: &str) -> Result<Self> {
        let uid = message.uid.map(mailsift_imap::Uid::get);
        let fail = |source| Error::Decode { uid, source };

        let header = message
            .header
            .as_deref()
            .ok_or_else(|| fail(mailsift_mime::Error::MalformedMessage("no RFC822.HEADER".into())))?;
        let raw = message
            .body
            .as_deref()
            .ok_or_else(|| fail(mailsift_mime::Error::MalformedMessage("no BODY[]".into())))?;
        let uid = uid.ok_or_else(|| fail(mailsift_mime::Error::MalformedMessage("no UID".into())))?;

        let decoded = Message::decode(header, raw, header_charset).map_err(fail)?;
        let internal_date = message.internal_date.as_deref().and_then(parse_internal_date);

        Ok(Self {
            from: decoded.from,
            to: decoded.to,
            internal_date,
            precedence: decoded.precedence,
            subject: decoded.subject,
            html: decoded.body.html,
            html_charset: decoded.body.html_charset,
            text: decoded.body.text,
            is_multipart: decoded.body.is_multipart,
            uid,
        })
    }

    /// HTML payload as text, converted from its declared charset.
    #[must_use]
    pub fn html_str(&self) -> Cow<'_, str> {
        html_text(&self.html, self.html_charset.as_deref())
    }

    /// Plain-text payload as text.
    #[must_use]
    pub fn text_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.text)
    }

    /// Human-visible text chunks. Without HTML the text payload is returned
    /// as a single chunk.
    #[must_use]
    pub fn visible_text(&self) -> Vec<String> {
        if self.html.is_empty() {
            return vec![self.text_str().into_owned()];
        }
        visible_text(&self.html_str())
    }
}

impl fmt::Display for DecodedEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let to = self
            .to
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        let date = self
            .internal_date
            .map(|d| d.to_rfc2822())
            .unwrap_or_default();

        writeln!(f, "----------------------------")?;
        writeln!(f, "From:           {}", self.from)?;
        writeln!(f, "To:             {to}")?;
        writeln!(f, "Internal Date:  {date}")?;
        writeln!(f, "Precedence:     {}", self.precedence)?;
        writeln!(f, "Subject:        {}", self.subject)?;
        writeln!(f, "HTML:           {}", self.html_str())?;
        writeln!(f, "Text:           {}", self.text_str())?;
        writeln!(f, "----------------------------")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use mailsift_imap::Uid;

    fn fetched(uid: u32, header: &[u8], body: &[u8]) -> FetchedMessage {
        FetchedMessage {
            uid: Uid::new(uid),
            internal_date: Some(" 7-Jul-2023 02:44:25 -0700".into()),
            header: Some(header.to_vec()),
            body: Some(body.to_vec()),
            ..FetchedMessage::default()
        }
    }

    const HEADER: &[u8] = b"From: News <news@example.com>\r\nTo: a@example.com\r\n\
Subject: =?UTF-8?B?5rWL6K+V?=\r\nContent-Type: text/html; charset=utf-8\r\n";

    fn raw(body: &[u8]) -> Vec<u8> {
        let mut raw = HEADER.to_vec();
        raw.extend_from_slice(b"\r\n");
        raw.extend_from_slice(body);
        raw
    }

    #[test]
    fn test_from_fetched() {
        let email =
            DecodedEmail::from_fetched(&fetched(42, HEADER, &raw(b"<p>hi<style>p{}</style></p>")), "gbk")
                .unwrap();
        assert_eq!(email.uid, 42);
        assert_eq!(email.subject, "测试");
        assert_eq!(email.from.email, "news@example.com");
        assert_eq!(email.to.len(), 1);
        assert_eq!(
            email.internal_date.unwrap().to_rfc3339(),
            "2023-07-07T02:44:25-07:00"
        );
        assert_eq!(email.visible_text(), ["hi"]);
    }

    #[test]
    fn test_text_only_visible_text_is_one_chunk() {
        let header = b"Subject: plain\r\n";
        let mut body = header.to_vec();
        body.extend_from_slice(b"\r\nline one\r\nline two");
        let email = DecodedEmail::from_fetched(&fetched(1, header, &body), "gbk").unwrap();
        assert_eq!(email.visible_text(), ["line one\r\nline two"]);
    }

    #[test]
    fn test_gbk_html_visible_text_and_json() {
        let header = b"Subject: gbk\r\nContent-Type: text/html; charset=GBK\r\n";
        let mut body = header.to_vec();
        body.extend_from_slice(b"\r\n<p>");
        body.extend_from_slice(&[0xb2, 0xe2, 0xca, 0xd4]);
        body.extend_from_slice(b"</p><script>x()</script>");
        let email = DecodedEmail::from_fetched(&fetched(8, header, &body), "gbk").unwrap();
        assert_eq!(email.html_charset.as_deref(), Some("GBK"));
        assert_eq!(email.visible_text(), ["测试"]);

        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["html"], "<p>测试</p><script>x()</script>");
        assert!(json.get("html_charset").is_none());
    }

    #[test]
    fn test_decode_failure_carries_uid() {
        let header = b"Content-Type: multipart/mixed\r\n";
        let err = DecodedEmail::from_fetched(&fetched(5, header, header), "gbk").unwrap_err();
        assert_eq!(err.uid(), Some(5));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_json_and_display() {
        let email = DecodedEmail::from_fetched(&fetched(3, HEADER, &raw(b"<b>x</b>")), "gbk").unwrap();
        let json = serde_json::to_value(&email).unwrap();
        assert_eq!(json["html"], "<b>x</b>");
        assert_eq!(json["uid"], 3);
        assert_eq!(json["is_multipart"], false);

        let shown = email.to_string();
        assert!(shown.contains("Subject:        测试"));
        assert!(shown.contains("HTML:           <b>x</b>"));
    }

    #[test]
    fn test_unparseable_internal_date_is_none() {
        assert!(parse_internal_date("yesterday").is_none());
    }
}
