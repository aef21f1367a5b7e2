//! Response status and selected-mailbox state.

use super::{Flags, SeqNum, Uid, UidValidity};

/// Status word of a tagged or untagged condition response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// `OK`
    Ok,
    /// `NO`: the command failed.
    No,
    /// `BAD`: the command was not understood.
    Bad,
    /// `PREAUTH` greeting.
    PreAuth,
    /// `BYE`: the server is closing the connection.
    Bye,
}

impl Status {
    /// Returns true for OK and PREAUTH.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, Self::Ok | Self::PreAuth)
    }
}

/// What SELECT or EXAMINE reported about the opened folder.
#[derive(Debug, Clone, Default)]
pub struct MailboxStatus {
    /// Number of messages (`* n EXISTS`).
    pub exists: u32,
    /// Number of recent messages.
    pub recent: u32,
    /// First unseen sequence number, if reported.
    pub unseen: Option<SeqNum>,
    /// Next UID the server will assign.
    pub uid_next: Option<Uid>,
    /// UIDVALIDITY of the folder.
    pub uid_validity: Option<UidValidity>,
    /// Flags defined in the folder.
    pub flags: Flags,
    /// Flags the client may store permanently.
    pub permanent_flags: Flags,
    /// Server opened the folder read-only.
    pub read_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preauth_counts_as_ok() {
        assert!(Status::PreAuth.is_ok());
        assert!(Status::Ok.is_ok());
        assert!(!Status::No.is_ok());
        assert!(!Status::Bye.is_ok());
    }

    #[test]
    fn default_status_is_empty() {
        let status = MailboxStatus::default();
        assert_eq!(status.exists, 0);
        assert!(status.uid_validity.is_none());
        assert!(!status.read_only);
    }
}
