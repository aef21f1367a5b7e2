//! Decoding constructed messages end to end.

#![allow(clippy::unwrap_used)]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use mailsift_mime::{DEFAULT_HEADER_CHARSET, Message};
use proptest::prelude::*;

/// Quoted-printable with soft breaks every 60 output bytes. Input must not
/// contain line breaks.
fn encode_quoted_printable(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut line = 0;
    for &b in data {
        if line >= 60 {
            out.extend_from_slice(b"=\r\n");
            line = 0;
        }
        if (b'!'..=b'~').contains(&b) && b != b'=' {
            out.push(b);
            line += 1;
        } else {
            out.extend_from_slice(format!("={b:02X}").as_bytes());
            line += 3;
        }
    }
    out
}

fn message(content_type: &str, encoding: &str, body: &[u8]) -> (Vec<u8>, Vec<u8>) {
    let header = format!(
        "From: Sender <sender@example.com>\r\n\
         To: rcpt@example.com\r\n\
         Subject: round trip\r\n\
         Content-Type: {content_type}\r\n\
         Content-Transfer-Encoding: {encoding}\r\n"
    )
    .into_bytes();
    let mut raw = header.clone();
    raw.extend_from_slice(b"\r\n");
    raw.extend_from_slice(body);
    (header, raw)
}

proptest! {
    #[test]
    fn quoted_printable_plain_text_round_trips(
        data in proptest::collection::vec(any::<u8>().prop_filter("no line breaks", |b| *b != b'\r' && *b != b'\n'), 0..400)
    ) {
        let (header, raw) = message(
            "text/plain; charset=utf-8",
            "quoted-printable",
            &encode_quoted_printable(&data),
        );
        let decoded = Message::decode(&header, &raw, DEFAULT_HEADER_CHARSET).unwrap();
        prop_assert_eq!(decoded.body.text, data);
        prop_assert!(decoded.body.html.is_empty());
    }

    #[test]
    fn base64_html_round_trips(html in "<p>[a-zA-Z0-9 .,;!?]{0,300}</p>") {
        let encoded = STANDARD.encode(html.as_bytes());
        let wrapped: Vec<u8> = encoded
            .as_bytes()
            .chunks(76)
            .flat_map(|line| line.iter().copied().chain(*b"\r\n"))
            .collect();
        let (header, raw) = message("text/html", "base64", &wrapped);
        let decoded = Message::decode(&header, &raw, DEFAULT_HEADER_CHARSET).unwrap();
        prop_assert_eq!(decoded.body.html, html.into_bytes());
    }
}

#[test]
fn multipart_keeps_last_html_part() {
    let header = b"Content-Type: multipart/alternative; boundary=\"=_b\"\r\n";
    let raw = b"Content-Type: multipart/alternative; boundary=\"=_b\"\r\n\
\r\n\
--=_b\r\n\
Content-Type: text/html; charset=utf-8\r\n\
\r\n\
<p>first</p>\r\n\
--=_b\r\n\
Content-Type: text/html; charset=utf-8\r\n\
Content-Transfer-Encoding: quoted-printable\r\n\
\r\n\
<p>sec=\r\nond</p>\r\n\
--=_b--\r\n";
    let decoded = Message::decode(header, raw, DEFAULT_HEADER_CHARSET).unwrap();
    assert!(decoded.body.is_multipart);
    assert_eq!(decoded.body.html, b"<p>second</p>");
    assert_eq!(decoded.from.to_string(), "Unknown <unknown@example.com>");
}
