//! Protocol state values carried by [`super::Client`].

use crate::types::MailboxStatus;

/// Greeting read, not logged in.
#[derive(Debug, Clone, Copy, Default)]
pub struct NotAuthenticated;

/// Logged in, no folder open.
#[derive(Debug, Clone, Copy, Default)]
pub struct Authenticated;

/// A folder is open.
#[derive(Debug, Clone)]
pub struct Selected {
    mailbox: String,
    read_only: bool,
    status: MailboxStatus,
}

impl Selected {
    pub(crate) const fn new(mailbox: String, read_only: bool, status: MailboxStatus) -> Self {
        Self {
            mailbox,
            read_only,
            status,
        }
    }

    /// Folder name as sent in SELECT/EXAMINE.
    #[must_use]
    pub fn mailbox(&self) -> &str {
        &self.mailbox
    }

    /// Opened with EXAMINE, or the server answered `[READ-ONLY]`.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only || self.status.read_only
    }

    /// What the server reported while opening the folder.
    #[must_use]
    pub const fn status(&self) -> &MailboxStatus {
        &self.status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn states_are_send_sync() {
        assert_send_sync::<NotAuthenticated>();
        assert_send_sync::<Authenticated>();
        assert_send_sync::<Selected>();
    }

    #[test]
    fn server_read_only_code_wins() {
        let status = MailboxStatus {
            read_only: true,
            ..MailboxStatus::default()
        };
        let selected = Selected::new("INBOX".to_string(), false, status);
        assert!(selected.is_read_only());
        assert_eq!(selected.mailbox(), "INBOX");
    }
}
