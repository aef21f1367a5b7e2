//! `Content-Type` parsing.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Media type with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "multipart"), lower-cased.
    pub main_type: String,
    /// Subtype (e.g., "plain", "alternative"), lower-cased.
    pub sub_type: String,
    /// Parameters keyed by lower-cased name (charset, boundary, ...).
    pub parameters: HashMap<String, String>,
}

impl Default for ContentType {
    /// `text/plain`, the type assumed when a part has no `Content-Type`.
    fn default() -> Self {
        Self::new("text", "plain")
    }
}

impl ContentType {
    /// Creates a content type without parameters.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: HashMap::new(),
        }
    }

    /// Parses the value of a `Content-Type` header.
    ///
    /// Format: `type/subtype; name=value; name="quoted value"`. Parameters
    /// without `=` are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] when the value is empty or the media type
    /// is not a `type/subtype` pair of tokens.
    pub fn parse(value: &str) -> Result<Self> {
        let mut segments = split_parameters(value).into_iter();
        let media = segments.next().unwrap_or_default();
        let media = media.trim();
        if media.is_empty() {
            return Err(Error::decode("no media type"));
        }

        let (main_type, sub_type) = media
            .split_once('/')
            .ok_or_else(|| Error::decode(format!("expected slash in media type {media:?}")))?;
        let (main_type, sub_type) = (main_type.trim(), sub_type.trim());
        if !is_token(main_type) || !is_token(sub_type) {
            return Err(Error::decode(format!("invalid media type {media:?}")));
        }

        let mut content_type = Self::new(main_type.to_lowercase(), sub_type.to_lowercase());
        for segment in segments {
            if let Some((name, value)) = segment.split_once('=') {
                let name = name.trim().to_lowercase();
                if name.is_empty() {
                    continue;
                }
                content_type.parameters.insert(name, unquote(value.trim()));
            }
        }
        Ok(content_type)
    }

    /// `type/subtype`.
    #[must_use]
    pub fn media_type(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Returns the charset parameter if present.
    #[must_use]
    pub fn charset(&self) -> Option<&str> {
        self.parameters.get("charset").map(String::as_str)
    }

    /// Returns the boundary parameter if present and non-empty.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameters
            .get("boundary")
            .map(String::as_str)
            .filter(|b| !b.is_empty())
    }

    /// Checks if this is a `multipart/*` type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type == "multipart"
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;
        let mut names: Vec<_> = self.parameters.keys().collect();
        names.sort();
        for name in names {
            let value = &self.parameters[name];
            if value.is_empty() || !is_token(value) {
                write!(f, "; {name}=\"{}\"", value.replace('"', "\\\""))?;
            } else {
                write!(f, "; {name}={value}")?;
            }
        }
        Ok(())
    }
}

/// Splits on `;` outside quoted strings.
fn split_parameters(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .map(|v| v.strip_suffix('"').unwrap_or(v))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// RFC 2045 token: printable ASCII without spaces or tspecials.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes()
            .all(|b| b.is_ascii_graphic() && !b"()<>@,;:\\\"/[]?=".contains(&b))
}
