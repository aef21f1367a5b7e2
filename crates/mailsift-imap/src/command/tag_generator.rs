//! Command tags.

use std::sync::atomic::{AtomicU32, Ordering};

/// Hands out `A0000`, `A0001`, … for one connection.
///
/// The counter wraps after `u32::MAX`; by then every earlier command has long
/// completed, so a reused tag cannot be confused with a pending one.
#[derive(Debug)]
pub struct TagGenerator {
    prefix: char,
    counter: AtomicU32,
}

impl TagGenerator {
    /// Generator with the given prefix, starting at zero.
    #[must_use]
    pub const fn new(prefix: char) -> Self {
        Self {
            prefix,
            counter: AtomicU32::new(0),
        }
    }

    /// Next tag.
    #[must_use]
    pub fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{}{n:04}", self.prefix)
    }

    /// Number of tags issued so far, modulo wrap-around.
    #[must_use]
    pub fn issued(&self) -> u32 {
        self.counter.load(Ordering::Relaxed)
    }
}

impl Default for TagGenerator {
    fn default() -> Self {
        Self::new('A')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_starts_at_zero() {
        let tags = TagGenerator::default();
        assert_eq!(tags.next(), "A0000");
        assert_eq!(tags.next(), "A0001");
        assert_eq!(tags.issued(), 2);
    }

    #[test]
    fn width_grows_past_four_digits() {
        let tags = TagGenerator::new('T');
        for _ in 0..10_000 {
            let _ = tags.next();
        }
        assert_eq!(tags.next(), "T10000");
    }
}
