//! Setting and clearing message flags by UID.

use mailsift_imap::{Flag, StoreAction, Uid, UidSet};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::MailboxConfig;
use crate::error::{Error, Result};
use crate::session::MailSession;

impl<S> MailSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// One `UID STORE` on exactly one UID: `+FLAGS (flag)` when `present`,
    /// `-FLAGS (flag)` otherwise.
    ///
    /// # Errors
    ///
    /// [`Error::FlagMutation`] carrying the UID.
    pub async fn set_flag(&mut self, uid: Uid, flag: Flag, present: bool) -> Result<()> {
        let action = if present { "add" } else { "remove" };
        tracing::trace!(uid = uid.get(), %flag, action, "storing flag");
        self.client
            .uid_store(&UidSet::single(uid), StoreAction::set(flag.clone(), present))
            .await
            .map_err(|source| Error::FlagMutation {
                uid: uid.get(),
                flag: flag.to_string(),
                action,
                source,
            })
    }

    /// Applies the same change to each UID in order, stopping at the first
    /// failure. Earlier changes stay applied.
    ///
    /// # Errors
    ///
    /// The first [`Error::FlagMutation`].
    pub async fn apply_flag(&mut self, uids: &[Uid], flag: &Flag, present: bool) -> Result<()> {
        for &uid in uids {
            self.set_flag(uid, flag.clone(), present).await?;
        }
        Ok(())
    }
}

async fn apply_in_session(config: &MailboxConfig, uids: &[Uid], flag: Flag, present: bool) -> Result<()> {
    let mut session = MailSession::open(config).await?;
    let result = session.apply_flag(uids, &flag, present).await;
    session.close().await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "flag change stopped early");
    }
    result
}

/// Adds `\Seen` to each UID in its own session.
///
/// # Errors
///
/// A session-level error, or the first [`Error::FlagMutation`].
pub async fn mark_read(config: &MailboxConfig, uids: &[Uid]) -> Result<()> {
    apply_in_session(config, uids, Flag::Seen, true).await
}

/// Removes `\Seen` from each UID in its own session.
///
/// # Errors
///
/// A session-level error, or the first [`Error::FlagMutation`].
pub async fn mark_unread(config: &MailboxConfig, uids: &[Uid]) -> Result<()> {
    apply_in_session(config, uids, Flag::Seen, false).await
}

/// Adds `\Deleted` to each UID in its own session. CLOSE at teardown
/// expunges them unless the folder was opened read-only.
///
/// # Errors
///
/// A session-level error, or the first [`Error::FlagMutation`].
pub async fn delete(config: &MailboxConfig, uids: &[Uid]) -> Result<()> {
    apply_in_session(config, uids, Flag::Deleted, true).await
}
