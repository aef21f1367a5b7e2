//! Boundary splitting for `multipart/*` bodies.

use crate::content_type::ContentType;
use crate::error::Result;
use crate::header::Headers;

/// One body part: its own headers plus the still-encoded content.
#[derive(Debug, Clone)]
pub struct Part<'a> {
    /// Part headers.
    pub headers: Headers,
    /// Raw part content, transfer encoding not yet undone.
    pub body: &'a [u8],
}

impl Part<'_> {
    /// The part's media type; `text/plain` when the header is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the header is present but unparseable.
    pub fn content_type(&self) -> Result<ContentType> {
        self.headers
            .get("content-type")
            .map_or_else(|| Ok(ContentType::default()), ContentType::parse)
    }

    /// Value of `Content-Transfer-Encoding`, or empty.
    #[must_use]
    pub fn transfer_encoding(&self) -> &str {
        self.headers.get_or_empty("content-transfer-encoding")
    }
}

/// Splits `body` on `--boundary` delimiter lines.
///
/// Anything before the first delimiter (the preamble, which includes the
/// message headers when a whole `BODY[]` is passed) and after the closing
/// `--boundary--` is ignored. A missing closing delimiter ends the last part
/// at the end of input. Delimiters must start a line; the line break before
/// a delimiter belongs to the delimiter, not to the part.
#[must_use]
pub fn split_parts<'a>(body: &'a [u8], boundary: &str) -> Vec<Part<'a>> {
    let delimiter = format!("--{boundary}").into_bytes();
    let mut parts = Vec::new();

    let Some(first) = find_delimiter(body, &delimiter, 0) else {
        return parts;
    };
    let mut cursor = first + delimiter.len();

    loop {
        if body[cursor..].starts_with(b"--") {
            break;
        }
        // Rest of the delimiter line (transport padding) is ignored.
        let Some(content_start) = next_line(body, cursor) else {
            break;
        };
        let (content_end, next) = match find_delimiter(body, &delimiter, content_start) {
            Some(at) => (strip_line_break(body, content_start, at), Some(at + delimiter.len())),
            None => (body.len(), None),
        };
        parts.push(parse_part(&body[content_start..content_end]));
        match next {
            Some(after) => cursor = after,
            None => break,
        }
    }
    parts
}

/// True when the delimiter ending at `end` is not just a prefix of a longer
/// token such as `--separator` for boundary `sep`.
fn delimiter_ends(body: &[u8], end: usize) -> bool {
    let rest = &body[end..];
    rest.starts_with(b"--") || matches!(rest.first(), None | Some(b' ' | b'\t' | b'\r' | b'\n'))
}

/// Position of the next `delimiter` that starts a line and ends at a
/// delimiter boundary, at or after `from`.
fn find_delimiter(body: &[u8], delimiter: &[u8], from: usize) -> Option<usize> {
    let mut search = from;
    while search + delimiter.len() <= body.len() {
        let at = search
            + body[search..]
                .windows(delimiter.len())
                .position(|w| w == delimiter)?;
        if (at == 0 || body[at - 1] == b'\n') && delimiter_ends(body, at + delimiter.len()) {
            return Some(at);
        }
        search = at + 1;
    }
    None
}

fn next_line(body: &[u8], from: usize) -> Option<usize> {
    body[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| from + i + 1)
}

/// Drops the CRLF (or LF) that precedes a delimiter.
fn strip_line_break(body: &[u8], start: usize, delimiter_at: usize) -> usize {
    let mut end = delimiter_at;
    if end > start && body[end - 1] == b'\n' {
        end -= 1;
        if end > start && body[end - 1] == b'\r' {
            end -= 1;
        }
    }
    end
}

fn parse_part(raw: &[u8]) -> Part<'_> {
    // A part may start directly with the blank line (no headers at all).
    let (head, body) = if raw.starts_with(b"\r\n") {
        (&raw[..0], &raw[2..])
    } else if raw.starts_with(b"\n") {
        (&raw[..0], &raw[1..])
    } else {
        split_part_headers(raw)
    };
    Part {
        headers: Headers::parse(&String::from_utf8_lossy(head)),
        body,
    }
}

/// Splits at the first empty line, accepting CRLF or LF endings.
fn split_part_headers(raw: &[u8]) -> (&[u8], &[u8]) {
    let crlf = raw.windows(4).position(|w| w == b"\r\n\r\n").map(|i| (i, 4));
    let lf = raw.windows(2).position(|w| w == b"\n\n").map(|i| (i, 2));
    let split = match (crlf, lf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    };
    match split {
        Some((at, len)) => (&raw[..at], &raw[at + len..]),
        None => (raw, &raw[raw.len()..]),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MESSAGE: &[u8] = b"Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
\r\n\
This is a preamble.\r\n\
--b1\r\n\
Content-Type: text/plain; charset=utf-8\r\n\
\r\n\
plain body\r\n\
--b1 \r\n\
Content-Type: text/html\r\n\
Content-Transfer-Encoding: base64\r\n\
\r\n\
PGI+aGk8L2I+\r\n\
--b1--\r\n\
epilogue\r\n";

    #[test]
    fn test_split_two_parts() {
        let parts = split_parts(MESSAGE, "b1");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].body, b"plain body");
        assert_eq!(parts[0].content_type().unwrap().charset(), Some("utf-8"));
        assert_eq!(parts[1].transfer_encoding(), "base64");
        assert_eq!(parts[1].body, b"PGI+aGk8L2I+");
    }

    #[test]
    fn test_delimiter_must_start_line() {
        let body = b"--b\r\n\r\nsee --b inline\r\n--b--";
        let parts = split_parts(body, "b");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, b"see --b inline");
    }

    #[test]
    fn test_longer_boundary_is_not_a_delimiter() {
        let body = b"--sep\r\n\r\none\r\n--separator\r\nstill one\r\n--sep \r\n\r\ntwo\r\n--sep--";
        let parts = split_parts(body, "sep");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].body, b"one\r\n--separator\r\nstill one");
        assert_eq!(parts[1].body, b"two");
    }

    #[test]
    fn test_missing_close_delimiter() {
        let parts = split_parts(b"--x\nContent-Type: text/html\n\n<p>cut", "x");
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].body, b"<p>cut");
        assert_eq!(parts[0].content_type().unwrap().media_type(), "text/html");
    }

    #[test]
    fn test_part_without_headers() {
        let parts = split_parts(b"--x\r\n\r\nbare\r\n--x--", "x");
        assert!(parts[0].headers.is_empty());
        assert_eq!(parts[0].content_type().unwrap().media_type(), "text/plain");
        assert_eq!(parts[0].body, b"bare");
    }

    #[test]
    fn test_no_delimiter_means_no_parts() {
        assert!(split_parts(b"just text", "x").is_empty());
    }
}
