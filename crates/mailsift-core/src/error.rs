//! Error types for the core library.

use thiserror::Error;

/// Errors that can occur in core operations.
///
/// Session-level (`Connection`, `Auth`, `Folder`) and batch-level (`Search`,
/// `FetchCommand`) errors end the whole operation. `Decode` is reported per
/// message. `FlagMutation` stops a batch flag change at the failing UID.
#[derive(Debug, Error)]
pub enum Error {
    /// Dial, TLS handshake or greeting failed.
    #[error("connection failed: {0}")]
    Connection(#[source] mailsift_imap::Error),

    /// LOGIN was rejected.
    #[error("authentication failed: {0}")]
    Auth(#[source] mailsift_imap::Error),

    /// SELECT/EXAMINE failed: missing folder or no access.
    #[error("cannot open folder {folder:?}: {source}")]
    Folder {
        /// Folder that was requested.
        folder: String,
        /// Server or transport error.
        source: mailsift_imap::Error,
    },

    /// UID SEARCH failed.
    #[error("uid search failed: {0}")]
    Search(#[source] mailsift_imap::Error),

    /// UID FETCH failed.
    #[error("unable to perform uid fetch: {0}")]
    FetchCommand(#[source] mailsift_imap::Error),

    /// A fetched message could not be decoded.
    #[error("unable to parse email{}: {source}", uid_suffix(.uid.as_ref()))]
    Decode {
        /// UID of the message, when the server sent one.
        uid: Option<u32>,
        /// MIME decoding error.
        source: mailsift_mime::Error,
    },

    /// UID STORE failed.
    #[error("unable to {action} {flag} on message {uid}: {source}")]
    FlagMutation {
        /// Message UID.
        uid: u32,
        /// Flag being changed, e.g. `\Seen`.
        flag: String,
        /// `add` or `remove`.
        action: &'static str,
        /// Server or transport error.
        source: mailsift_imap::Error,
    },

    /// Configuration file could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

fn uid_suffix(uid: Option<&u32>) -> String {
    uid.map(|uid| format!(" {uid}")).unwrap_or_default()
}

impl Error {
    /// True for errors that end a whole fetch or flag operation rather than
    /// a single message.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Connection(_)
                | Self::Auth(_)
                | Self::Folder { .. }
                | Self::Search(_)
                | Self::FetchCommand(_)
                | Self::Config(_)
        )
    }

    /// The message UID the failed step was working on, where known.
    #[must_use]
    pub const fn uid(&self) -> Option<u32> {
        match self {
            Self::Decode { uid, .. } => *uid,
            Self::FlagMutation { uid, .. } => Some(*uid),
            _ => None,
        }
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
