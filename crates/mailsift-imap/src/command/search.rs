//! Search compiler.
//!
//! Builds the argument list of a `UID SEARCH` from an optional base keyword
//! and a set of criteria. Only keys from a fixed vocabulary reach the wire;
//! anything else is dropped without error, so the compiled query is always a
//! subset of what the caller asked for. Values that cannot be quoted (CR, LF,
//! NUL) and base keywords that are not plain atoms are dropped the same way,
//! so the compiled tokens never end the command line early.

use chrono::NaiveDate;

use super::serialize::{astring, is_atom_list, is_quotable};

/// A recognised search key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum SearchKey {
    All,
    Answered,
    Bcc,
    Before,
    Body,
    Cc,
    Deleted,
    Draft,
    Flagged,
    From,
    Header,
    Keyword,
    Larger,
    New,
    Not,
    Old,
    On,
    Or,
    Recent,
    Seen,
    SentBefore,
    SentOn,
    SentSince,
    Since,
    Smaller,
    Subject,
    Text,
    To,
    Uid,
    Unanswered,
    Undeleted,
    Undraft,
    Unflagged,
    Unkeyword,
    Unseen,
}

impl SearchKey {
    /// The whole vocabulary, in wire order.
    pub const ALL_KEYS: [Self; 35] = [
        Self::All,
        Self::Answered,
        Self::Bcc,
        Self::Before,
        Self::Body,
        Self::Cc,
        Self::Deleted,
        Self::Draft,
        Self::Flagged,
        Self::From,
        Self::Header,
        Self::Keyword,
        Self::Larger,
        Self::New,
        Self::Not,
        Self::Old,
        Self::On,
        Self::Or,
        Self::Recent,
        Self::Seen,
        Self::SentBefore,
        Self::SentOn,
        Self::SentSince,
        Self::Since,
        Self::Smaller,
        Self::Subject,
        Self::Text,
        Self::To,
        Self::Uid,
        Self::Unanswered,
        Self::Undeleted,
        Self::Undraft,
        Self::Unflagged,
        Self::Unkeyword,
        Self::Unseen,
    ];

    /// Looks up a key by its exact upper-case token.
    #[must_use]
    pub fn lookup(token: &str) -> Option<Self> {
        let key = match token {
            "ALL" => Self::All,
            "ANSWERED" => Self::Answered,
            "BCC" => Self::Bcc,
            "BEFORE" => Self::Before,
            "BODY" => Self::Body,
            "CC" => Self::Cc,
            "DELETED" => Self::Deleted,
            "DRAFT" => Self::Draft,
            "FLAGGED" => Self::Flagged,
            "FROM" => Self::From,
            "HEADER" => Self::Header,
            "KEYWORD" => Self::Keyword,
            "LARGER" => Self::Larger,
            "NEW" => Self::New,
            "NOT" => Self::Not,
            "OLD" => Self::Old,
            "ON" => Self::On,
            "OR" => Self::Or,
            "RECENT" => Self::Recent,
            "SEEN" => Self::Seen,
            "SENTBEFORE" => Self::SentBefore,
            "SENTON" => Self::SentOn,
            "SENTSINCE" => Self::SentSince,
            "SINCE" => Self::Since,
            "SMALLER" => Self::Smaller,
            "SUBJECT" => Self::Subject,
            "TEXT" => Self::Text,
            "TO" => Self::To,
            "UID" => Self::Uid,
            "UNANSWERED" => Self::Unanswered,
            "UNDELETED" => Self::Undeleted,
            "UNDRAFT" => Self::Undraft,
            "UNFLAGGED" => Self::Unflagged,
            "UNKEYWORD" => Self::Unkeyword,
            "UNSEEN" => Self::Unseen,
            _ => return None,
        };
        Some(key)
    }

    /// Wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Answered => "ANSWERED",
            Self::Bcc => "BCC",
            Self::Before => "BEFORE",
            Self::Body => "BODY",
            Self::Cc => "CC",
            Self::Deleted => "DELETED",
            Self::Draft => "DRAFT",
            Self::Flagged => "FLAGGED",
            Self::From => "FROM",
            Self::Header => "HEADER",
            Self::Keyword => "KEYWORD",
            Self::Larger => "LARGER",
            Self::New => "NEW",
            Self::Not => "NOT",
            Self::Old => "OLD",
            Self::On => "ON",
            Self::Or => "OR",
            Self::Recent => "RECENT",
            Self::Seen => "SEEN",
            Self::SentBefore => "SENTBEFORE",
            Self::SentOn => "SENTON",
            Self::SentSince => "SENTSINCE",
            Self::Since => "SINCE",
            Self::Smaller => "SMALLER",
            Self::Subject => "SUBJECT",
            Self::Text => "TEXT",
            Self::To => "TO",
            Self::Uid => "UID",
            Self::Unanswered => "UNANSWERED",
            Self::Undeleted => "UNDELETED",
            Self::Undraft => "UNDRAFT",
            Self::Unflagged => "UNFLAGGED",
            Self::Unkeyword => "UNKEYWORD",
            Self::Unseen => "UNSEEN",
        }
    }
}

impl std::fmt::Display for SearchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats a date the way search keys expect it (`02-Jan-2006`).
#[must_use]
pub fn format_search_date(date: NaiveDate) -> String {
    date.format("%d-%b-%Y").to_string()
}

/// A base keyword plus key/argument pairs, combined by the server with AND.
///
/// Keys are stored as given and only checked against the vocabulary when
/// compiled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    keyword: Option<String>,
    entries: Vec<(String, Vec<String>)>,
}

impl SearchCriteria {
    /// No keyword, no criteria.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `ALL`
    #[must_use]
    pub fn all() -> Self {
        Self::keyword("ALL")
    }

    /// `UNSEEN`
    #[must_use]
    pub fn unseen() -> Self {
        Self::keyword("UNSEEN")
    }

    /// `SINCE <date>`
    #[must_use]
    pub fn since(date: NaiveDate) -> Self {
        Self::new().with("SINCE", format_search_date(date))
    }

    /// Criteria with only a base keyword, sent unmodified when it is one or
    /// more space-separated atoms and dropped otherwise.
    #[must_use]
    pub fn keyword(keyword: impl Into<String>) -> Self {
        Self::new().with_keyword(keyword)
    }

    /// Sets the base keyword. An empty keyword clears it.
    #[must_use]
    pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
        let keyword = keyword.into();
        self.keyword = (!keyword.is_empty()).then_some(keyword);
        self
    }

    /// Adds a key with one argument.
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_args(key, [value.into()])
    }

    /// Adds a key without arguments, such as `SEEN`.
    #[must_use]
    pub fn with_flag(self, key: impl Into<String>) -> Self {
        self.with_args(key, std::iter::empty::<String>())
    }

    /// Adds a key with any number of arguments (`HEADER field value`).
    #[must_use]
    pub fn with_args<I, S>(mut self, key: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entries
            .push((key.into(), args.into_iter().map(Into::into).collect()));
        self
    }

    /// Base keyword, if any.
    #[must_use]
    pub fn base_keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    /// Keys as given by the caller, recognised or not.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Compiles to wire tokens: the keyword first, then every recognised key
    /// followed by its arguments as astrings, in insertion order.
    #[must_use]
    pub fn compile(&self) -> Vec<String> {
        let mut tokens = Vec::with_capacity(1 + self.entries.len() * 2);
        match &self.keyword {
            Some(keyword) if is_atom_list(keyword) => tokens.push(keyword.clone()),
            Some(keyword) => tracing::debug!(keyword, "dropping search keyword"),
            None => {}
        }
        for (key, args) in &self.entries {
            let Some(key) = SearchKey::lookup(key) else {
                continue;
            };
            if !args.iter().map(String::as_str).all(is_quotable) {
                tracing::debug!(key = key.as_str(), "dropping search key with unquotable value");
                continue;
            }
            tokens.push(key.as_str().to_string());
            tokens.extend(args.iter().map(|arg| astring(arg)));
        }
        tokens
    }
}
