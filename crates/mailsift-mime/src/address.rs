//! Mailbox and address-list parsing for `From` and `To`.

use std::fmt;

use crate::subject::decode_header_value;

/// Sender used when `From` is missing or unparseable.
pub const UNKNOWN_SENDER: &str = "Unknown <unknown@example.com>";

/// A single mailbox: optional display name plus address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Address {
    /// Decoded display name.
    pub name: Option<String>,
    /// `local@domain`.
    pub email: String,
}

impl Address {
    /// The placeholder sender, see [`UNKNOWN_SENDER`].
    #[must_use]
    pub fn unknown() -> Self {
        Self {
            name: Some("Unknown".to_string()),
            email: "unknown@example.com".to_string(),
        }
    }

    /// Parses one mailbox: `Name <a@b>`, `"Quoted, Name" <a@b>`, `<a@b>`,
    /// `a@b` or `a@b (Name)`. Encoded words in the name are decoded.
    ///
    /// Returns `None` unless the input is exactly one well-formed mailbox.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if let Some(open) = find_unquoted(input, b'<') {
            let close = open + input[open..].find('>')?;
            if !strip_comments(&input[close + 1..]).trim().is_empty() {
                return None;
            }
            let email = input[open + 1..close].trim();
            let name = display_name(&input[..open]);
            return valid_email(email).then(|| Self {
                name,
                email: email.to_string(),
            });
        }

        let (spec, comment) = match (input.find('('), input.rfind(')')) {
            (Some(open), Some(close)) if open < close => {
                (&input[..open], Some(&input[open + 1..close]))
            }
            _ => (input, None),
        };
        let email = spec.trim();
        valid_email(email).then(|| Self {
            name: comment.and_then(display_name),
            email: email.to_string(),
        })
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            None => write!(f, "<{}>", self.email),
            Some(name) if name.contains(|c: char| "()<>[]:;@\\,.\"".contains(c)) => {
                write!(f, "\"{}\" <{}>", name.replace('"', "\\\""), self.email)
            }
            Some(name) => write!(f, "{name} <{}>", self.email),
        }
    }
}

/// Parses a comma-separated address list.
///
/// Returns `None` when the list is empty or any entry fails to parse.
#[must_use]
pub fn parse_address_list(input: &str) -> Option<Vec<Address>> {
    let addresses = split_list(input)
        .into_iter()
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(Address::parse)
        .collect::<Option<Vec<_>>>()?;
    (!addresses.is_empty()).then_some(addresses)
}

/// Splits on commas outside quotes, angle brackets and comments.
fn split_list(input: &str) -> Vec<&str> {
    let mut entries = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_angle = false;
    let mut depth = 0_u32;
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_quotes => escaped = true,
            '"' if depth == 0 => in_quotes = !in_quotes,
            '<' if !in_quotes => in_angle = true,
            '>' if !in_quotes => in_angle = false,
            '(' if !in_quotes => depth += 1,
            ')' if !in_quotes => depth = depth.saturating_sub(1),
            ',' if !in_quotes && !in_angle && depth == 0 => {
                entries.push(&input[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    entries.push(&input[start..]);
    entries
}

fn find_unquoted(input: &str, needle: u8) -> Option<usize> {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, b) in input.bytes().enumerate() {
        match b {
            _ if escaped => escaped = false,
            b'\\' if in_quotes => escaped = true,
            b'"' => in_quotes = !in_quotes,
            _ if b == needle && !in_quotes => return Some(i),
            _ => {}
        }
    }
    None
}

fn strip_comments(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut depth = 0_u32;
    for c in input.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}

fn display_name(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let unquoted = match raw.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\"").replace("\\\\", "\\"),
        None => raw.to_string(),
    };
    let name = decode_header_value(&unquoted);
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

fn valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !email.contains(|c: char| c.is_whitespace() || "<>(),;".contains(c))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_forms() {
        let a = Address::parse("Alice Liddell <alice@example.com>").unwrap();
        assert_eq!(a.name.as_deref(), Some("Alice Liddell"));
        assert_eq!(a.email, "alice@example.com");

        let b = Address::parse("\"Smith, Bob\" <bob@example.org>").unwrap();
        assert_eq!(b.name.as_deref(), Some("Smith, Bob"));

        let c = Address::parse("carol@example.net").unwrap();
        assert_eq!(c.name, None);

        let d = Address::parse("dave@example.net (Dave)").unwrap();
        assert_eq!(d.name.as_deref(), Some("Dave"));

        let e = Address::parse("<eve@example.com>").unwrap();
        assert_eq!(e.name, None);
    }

    #[test]
    fn test_encoded_display_name() {
        let a = Address::parse("=?UTF-8?B?5rWL6K+V?= <test@example.cn>").unwrap();
        assert_eq!(a.name.as_deref(), Some("测试"));
    }

    #[test]
    fn test_parse_rejects() {
        assert!(Address::parse("").is_none());
        assert!(Address::parse("no at sign").is_none());
        assert!(Address::parse("Name <a@b> trailing").is_none());
        assert!(Address::parse("Name <a@b").is_none());
    }

    #[test]
    fn test_address_list() {
        let list =
            parse_address_list("a@x.com, \"Last, First\" <b@y.com>,\r\n C <c@z.com>").unwrap();
        let emails: Vec<_> = list.iter().map(|a| a.email.as_str()).collect();
        assert_eq!(emails, ["a@x.com", "b@y.com", "c@z.com"]);
        assert!(parse_address_list("").is_none());
        assert!(parse_address_list("a@x.com, broken").is_none());
    }

    #[test]
    fn test_display() {
        assert_eq!(Address::unknown().to_string(), UNKNOWN_SENDER);
        let a = Address::parse("\"Smith, Bob\" <bob@example.org>").unwrap();
        assert_eq!(a.to_string(), "\"Smith, Bob\" <bob@example.org>");
        assert_eq!(Address::parse("x@y").unwrap().to_string(), "<x@y>");
    }
}
