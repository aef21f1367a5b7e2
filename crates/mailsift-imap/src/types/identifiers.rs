//! Tags, sequence numbers, UIDs and UIDVALIDITY.

use std::fmt;
use std::num::NonZeroU32;

/// Command tag used to pair a command with its completion response.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag(String);

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

macro_rules! nonzero_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(NonZeroU32);

        impl $name {
            /// Wraps a raw value. Returns `None` for zero, which IMAP never assigns.
            #[must_use]
            pub fn new(n: u32) -> Option<Self> {
                NonZeroU32::new(n).map(Self)
            }

            /// Returns the raw value.
            #[must_use]
            pub const fn get(self) -> u32 {
                self.0.get()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

nonzero_id!(
    /// Message sequence number (position in the selected mailbox).
    SeqNum
);

nonzero_id!(
    /// Unique identifier of a message within one selected folder.
    Uid
);

nonzero_id!(
    /// UIDVALIDITY value of a mailbox.
    UidValidity
);

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn tag_display() {
        assert_eq!(Tag::new("A0003").to_string(), "A0003");
    }

    #[test]
    fn seq_num_zero_is_rejected() {
        assert!(SeqNum::new(0).is_none());
    }

    #[test]
    fn uid_ordering_and_display() {
        let a = Uid::new(100).unwrap();
        let b = Uid::new(200).unwrap();
        assert!(a < b);
        assert_eq!(format!("{a}"), "100");
    }

    #[test]
    fn uid_validity_get() {
        assert_eq!(UidValidity::new(42).unwrap().get(), 42);
    }
}
