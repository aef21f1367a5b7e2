//! Header block parsing.

use std::collections::HashMap;

/// Header fields of a message or body part, keyed case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    fields: HashMap<String, Vec<String>>,
}

impl Headers {
    /// Creates an empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, keeping earlier values for the same name.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into().to_lowercase();
        self.fields.entry(name).or_default().push(value.into());
    }

    /// First value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(&name.to_lowercase())
            .and_then(|v| v.first().map(String::as_str))
    }

    /// First value for `name`, or the empty string.
    #[must_use]
    pub fn get_or_empty(&self, name: &str) -> &str {
        self.get(name).unwrap_or_default()
    }

    /// All values for `name` in the order they appeared.
    #[must_use]
    pub fn get_all(&self, name: &str) -> Vec<&str> {
        self.fields
            .get(&name.to_lowercase())
            .map(|v| v.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Number of distinct field names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when no fields were parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parses a header block, stopping at the first empty line.
    ///
    /// Folded lines (starting with space or tab) are joined to the previous
    /// field with a single space. Lines without a colon are skipped. Both
    /// CRLF and bare LF line endings are accepted.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut headers = Self::new();
        let mut current: Option<(String, String)> = None;

        for line in text.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            if line.is_empty() {
                break;
            }
            if line.starts_with([' ', '\t']) {
                if let Some((_, value)) = current.as_mut() {
                    value.push(' ');
                    value.push_str(line.trim());
                }
                continue;
            }
            if let Some((name, value)) = current.take() {
                headers.add(name, value.trim());
            }
            if let Some((name, value)) = line.split_once(':') {
                current = Some((name.trim().to_string(), value.trim().to_string()));
            }
        }
        if let Some((name, value)) = current {
            headers.add(name, value.trim());
        }
        headers
    }
}

/// Splits raw bytes at the first `\r\n\r\n` into header block and body.
#[must_use]
pub fn split_header_body(raw: &[u8]) -> Option<(&[u8], &[u8])> {
    const SEPARATOR: &[u8] = b"\r\n\r\n";
    raw.windows(SEPARATOR.len())
        .position(|w| w == SEPARATOR)
        .map(|at| (&raw[..at], &raw[at + SEPARATOR.len()..]))
}
