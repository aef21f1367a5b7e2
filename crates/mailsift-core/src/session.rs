//! Session lifecycle: connect, log in, open the folder, tear down.

use std::time::Duration;

use mailsift_imap::{
    Client, FetchAttribute, FetchedMessage, ImapStream, SearchCriteria, Selected, Uid, UidSet,
    connection,
};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::config::MailboxConfig;
use crate::error::{Error, Result};

/// An authenticated connection with the configured folder open.
///
/// A session serves one search and fetch plus the flag changes that follow,
/// then is consumed by [`MailSession::close`]. Commands take `&mut self`, so
/// one session is only ever driven by one caller at a time.
#[derive(Debug)]
pub struct MailSession<S = ImapStream> {
    pub(crate) client: Client<S, Selected>,
    logout_timeout: Duration,
    header_charset: String,
}

impl MailSession<ImapStream> {
    /// Dials the server and opens the configured folder.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] when dialing, the TLS handshake or the greeting
    /// fails, [`Error::Auth`] when LOGIN is rejected and [`Error::Folder`]
    /// when the folder cannot be opened.
    pub async fn open(config: &MailboxConfig) -> Result<Self> {
        let imap = config.imap_config();
        tracing::debug!(
            host = %imap.host,
            port = imap.port,
            tls = config.tls,
            "connecting to mail server"
        );
        let stream = connection::connect(&imap).await.map_err(Error::Connection)?;
        Self::from_stream(stream, config).await
    }
}

impl<S> MailSession<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Runs the greeting, LOGIN and SELECT (EXAMINE when read-only) over an
    /// already connected stream.
    ///
    /// # Errors
    ///
    /// Same as [`MailSession::open`], minus dialing.
    pub async fn from_stream(stream: S, config: &MailboxConfig) -> Result<Self> {
        let imap = config.imap_config();

        let client = Client::from_stream(stream)
            .await
            .map_err(Error::Connection)?
            .with_io_timeout(imap.io_timeout);

        let client = client
            .login(&config.user, &config.password)
            .await
            .map_err(Error::Auth)?;
        tracing::debug!(user = %config.user, "logged in");

        let opened = if config.read_only {
            client.examine(&config.folder).await
        } else {
            client.select(&config.folder).await
        };
        let client = opened.map_err(|source| Error::Folder {
            folder: config.folder.clone(),
            source,
        })?;
        tracing::debug!(
            folder = %config.folder,
            read_only = client.state().is_read_only(),
            exists = client.state().status().exists,
            "folder opened"
        );

        Ok(Self {
            client,
            logout_timeout: imap.logout_timeout,
            header_charset: config.header_charset.clone(),
        })
    }

    /// Name of the open folder.
    #[must_use]
    pub fn folder(&self) -> &str {
        self.client.mailbox()
    }

    /// Charset that raw header bytes are decoded from.
    #[must_use]
    pub fn header_charset(&self) -> &str {
        &self.header_charset
    }

    /// UID SEARCH with the compiled criteria.
    ///
    /// # Errors
    ///
    /// [`Error::Search`] when the command fails.
    pub async fn search(&mut self, criteria: &SearchCriteria) -> Result<Vec<Uid>> {
        let uids = self
            .client
            .uid_search(criteria)
            .await
            .map_err(Error::Search)?;
        tracing::debug!(count = uids.len(), "search finished");
        Ok(uids)
    }

    /// One batched UID FETCH of `INTERNALDATE BODY[] UID RFC822.HEADER` for
    /// every UID. An empty UID list sends nothing.
    ///
    /// # Errors
    ///
    /// [`Error::FetchCommand`] when the command fails.
    pub async fn fetch(&mut self, uids: &[Uid]) -> Result<Vec<FetchedMessage>> {
        let Some(set) = UidSet::from_uids(uids) else {
            return Ok(Vec::new());
        };
        let messages = self
            .client
            .uid_fetch(&set, &FetchAttribute::FULL_MESSAGE)
            .await
            .map_err(Error::FetchCommand)?;
        tracing::debug!(requested = uids.len(), received = messages.len(), "fetch finished");
        Ok(messages)
    }

    /// CLOSE, which expunges `\Deleted` messages in a writable folder, then
    /// LOGOUT. Failures here are logged, never returned, so they cannot hide
    /// an error the caller already has.
    pub async fn close(self) {
        let folder = self.folder().to_string();
        match tokio::time::timeout(self.logout_timeout, self.client.close_and_logout()).await {
            Ok(Ok(())) => tracing::debug!(%folder, "session closed"),
            Ok(Err(e)) => tracing::debug!(%folder, error = %e, "error during session teardown"),
            Err(_) => tracing::debug!(%folder, "session teardown timed out"),
        }
    }
}

/// Connects, logs in, opens the folder and closes again.
///
/// # Errors
///
/// The first session-level failure: [`Error::Connection`], [`Error::Auth`]
/// or [`Error::Folder`].
pub async fn validate_credentials(config: &MailboxConfig) -> Result<()> {
    let session = MailSession::open(config).await?;
    session.close().await;
    Ok(())
}
