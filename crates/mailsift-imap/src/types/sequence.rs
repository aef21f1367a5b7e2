//! UID sets for UID FETCH and UID STORE.

use std::fmt;

use super::Uid;

/// A set of UIDs in IMAP `sequence-set` syntax.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UidSet {
    /// One UID.
    Single(Uid),
    /// Inclusive range.
    Range(Uid, Uid),
    /// Comma-joined union of sets.
    Set(Vec<Self>),
}

impl UidSet {
    /// Set holding one UID.
    #[must_use]
    pub const fn single(uid: Uid) -> Self {
        Self::Single(uid)
    }

    /// Builds the shortest set covering `uids`, folding consecutive values
    /// into ranges. Returns `None` when `uids` is empty.
    #[must_use]
    pub fn from_uids(uids: &[Uid]) -> Option<Self> {
        let mut sorted = uids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let mut parts = Vec::new();
        let mut iter = sorted.into_iter();
        let first = iter.next()?;
        let (mut start, mut end) = (first, first);
        for uid in iter {
            if uid.get() == end.get() + 1 {
                end = uid;
            } else {
                parts.push(Self::span(start, end));
                start = uid;
                end = uid;
            }
        }
        parts.push(Self::span(start, end));

        Some(if parts.len() == 1 {
            parts.remove(0)
        } else {
            Self::Set(parts)
        })
    }

    fn span(start: Uid, end: Uid) -> Self {
        if start == end {
            Self::Single(start)
        } else {
            Self::Range(start, end)
        }
    }
}

impl fmt::Display for UidSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(uid) => write!(f, "{uid}"),
            Self::Range(start, end) => write!(f, "{start}:{end}"),
            Self::Set(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn uids(values: &[u32]) -> Vec<Uid> {
        values.iter().copied().filter_map(Uid::new).collect()
    }

    #[test]
    fn empty_input_has_no_set() {
        assert!(UidSet::from_uids(&[]).is_none());
    }

    #[test]
    fn single_uid() {
        let set = UidSet::from_uids(&uids(&[42])).unwrap();
        assert_eq!(set, UidSet::single(Uid::new(42).unwrap()));
        assert_eq!(set.to_string(), "42");
    }

    #[test]
    fn contiguous_run_becomes_range() {
        assert_eq!(UidSet::from_uids(&uids(&[3, 4, 5, 6])).unwrap().to_string(), "3:6");
    }

    #[test]
    fn duplicates_are_collapsed() {
        assert_eq!(UidSet::from_uids(&uids(&[7, 7, 8])).unwrap().to_string(), "7:8");
    }

    #[test]
    fn mixed_runs_and_singles() {
        let set = UidSet::from_uids(&uids(&[20, 1, 2, 10, 12, 11])).unwrap();
        assert_eq!(set.to_string(), "1:2,10:12,20");
    }
}
