//! Argument types for FETCH and STORE.

use crate::types::Flag;

/// A FETCH data item to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchAttribute {
    /// `FLAGS`
    Flags,
    /// `UID`
    Uid,
    /// `INTERNALDATE`
    InternalDate,
    /// `RFC822.SIZE`
    Rfc822Size,
    /// `RFC822.HEADER`
    Rfc822Header,
    /// `BODY[]`; marks the message seen on most servers.
    BodyFull,
    /// `BODY.PEEK[]`
    BodyPeek,
}

impl FetchAttribute {
    /// The attribute set that retrieves a whole message for decoding.
    pub const FULL_MESSAGE: [Self; 4] = [
        Self::InternalDate,
        Self::BodyFull,
        Self::Uid,
        Self::Rfc822Header,
    ];

    /// Wire form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flags => "FLAGS",
            Self::Uid => "UID",
            Self::InternalDate => "INTERNALDATE",
            Self::Rfc822Size => "RFC822.SIZE",
            Self::Rfc822Header => "RFC822.HEADER",
            Self::BodyFull => "BODY[]",
            Self::BodyPeek => "BODY.PEEK[]",
        }
    }
}

/// How a STORE changes the flag set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreAction {
    /// `+FLAGS`
    Add(Vec<Flag>),
    /// `-FLAGS`
    Remove(Vec<Flag>),
    /// `FLAGS`
    Replace(Vec<Flag>),
}

impl StoreAction {
    /// `+FLAGS (flag)` when `present`, `-FLAGS (flag)` otherwise.
    #[must_use]
    pub fn set(flag: Flag, present: bool) -> Self {
        if present {
            Self::Add(vec![flag])
        } else {
            Self::Remove(vec![flag])
        }
    }
}
