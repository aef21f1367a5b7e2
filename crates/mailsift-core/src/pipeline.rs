//! Streaming search, fetch and decode.
//!
//! A [`FetchStream`] is backed by one worker task that owns the session.
//! The worker searches, fetches every match in one batch, decodes each
//! message and pushes the results into a bounded channel, applying the
//! requested flag changes after each delivered email. The session is closed
//! exactly once when the worker finishes, fails or is cancelled.

use mailsift_imap::{FetchedMessage, Flag, ImapStream, SearchCriteria};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};

use crate::config::MailboxConfig;
use crate::email::DecodedEmail;
use crate::error::{Error, Result};
use crate::session::MailSession;

/// Results that may wait in the channel before the worker blocks.
pub const DEFAULT_BUFFER_SIZE: usize = 100;

/// What to do with each delivered email, and how far the worker may run
/// ahead of the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    /// Add `\Seen` after delivery; when false `\Seen` is removed instead.
    pub mark_as_read: bool,
    /// Add `\Deleted` after delivery.
    pub delete: bool,
    /// Channel capacity. Zero is treated as one.
    pub buffer_size: usize,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            mark_as_read: false,
            delete: false,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

impl FetchOptions {
    /// Sets [`FetchOptions::mark_as_read`].
    #[must_use]
    pub const fn mark_as_read(mut self, mark_as_read: bool) -> Self {
        self.mark_as_read = mark_as_read;
        self
    }

    /// Sets [`FetchOptions::delete`].
    #[must_use]
    pub const fn delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Sets [`FetchOptions::buffer_size`].
    #[must_use]
    pub const fn buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }
}

/// One item on a [`FetchStream`].
#[derive(Debug)]
pub enum FetchResult {
    /// A decoded email.
    Email(DecodedEmail),
    /// Decoding or a flag change failed for one message. The batch goes on.
    Failed {
        /// UID of the message, when known.
        uid: Option<u32>,
        /// What went wrong.
        error: Error,
    },
    /// The search or fetch command failed. Always the last item.
    Aborted(Error),
}

impl FetchResult {
    /// The email, or the error for the other variants.
    ///
    /// # Errors
    ///
    /// The carried error for `Failed` and `Aborted`.
    pub fn into_result(self) -> Result<DecodedEmail> {
        match self {
            Self::Email(email) => Ok(email),
            Self::Failed { error, .. } | Self::Aborted(error) => Err(error),
        }
    }
}

/// Receiving end of a fetch. Dropping it cancels the worker, which then
/// closes its session.
#[derive(Debug)]
pub struct FetchStream {
    receiver: mpsc::Receiver<FetchResult>,
    worker: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl FetchStream {
    /// Starts a worker that searches with `criteria` over an open session.
    pub fn spawn<S>(session: MailSession<S>, criteria: SearchCriteria, options: FetchOptions) -> Self
    where
        S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(options.buffer_size.max(1));
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_worker(
            session,
            criteria,
            options,
            sender,
            cancel.clone(),
        ));
        Self {
            receiver,
            worker: Some(worker),
            _guard: cancel.clone().drop_guard(),
            cancel,
        }
    }

    /// Next result, or `None` once the worker is done.
    pub async fn next(&mut self) -> Option<FetchResult> {
        self.receiver.recv().await
    }

    /// Asks the worker to stop. Results already queued can still be read.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drains the stream into emails and errors, then waits for the worker
    /// to release its session.
    pub async fn collect(mut self) -> (Vec<DecodedEmail>, Vec<Error>) {
        let mut emails = Vec::new();
        let mut errors = Vec::new();
        while let Some(result) = self.next().await {
            match result.into_result() {
                Ok(email) => emails.push(email),
                Err(error) => errors.push(error),
            }
        }
        if let Some(worker) = self.worker.take()
            && let Err(e) = worker.await
        {
            tracing::warn!(error = %e, "fetch worker ended abnormally");
        }
        (emails, errors)
    }
}

async fn run_worker<S>(
    mut session: MailSession<S>,
    criteria: SearchCriteria,
    options: FetchOptions,
    sender: mpsc::Sender<FetchResult>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => tracing::debug!("fetch cancelled"),
        () = produce(&mut session, &criteria, options, &sender) => {}
    }
    session.close().await;
}

/// Sends one result. False when the consumer is gone.
async fn emit(sender: &mpsc::Sender<FetchResult>, result: FetchResult) -> bool {
    sender.send(result).await.is_ok()
}

async fn produce<S>(
    session: &mut MailSession<S>,
    criteria: &SearchCriteria,
    options: FetchOptions,
    sender: &mpsc::Sender<FetchResult>,
) where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    let uids = match session.search(criteria).await {
        Ok(uids) => uids,
        Err(e) => {
            tracing::debug!(error = %e, "search failed, aborting fetch");
            emit(sender, FetchResult::Aborted(e)).await;
            return;
        }
    };
    if uids.is_empty() {
        return;
    }

    let messages = match session.fetch(&uids).await {
        Ok(messages) => messages,
        Err(e) => {
            tracing::debug!(error = %e, "fetch failed, aborting");
            emit(sender, FetchResult::Aborted(e)).await;
            return;
        }
    };

    let charset = session.header_charset().to_string();
    for message in messages {
        if !deliver(session, &message, &charset, options, sender).await {
            tracing::debug!("consumer went away, stopping fetch");
            return;
        }
    }
}

/// Decodes, emits and flags one FETCH record. False when the consumer is
/// gone.
async fn deliver<S>(
    session: &mut MailSession<S>,
    message: &FetchedMessage,
    charset: &str,
    options: FetchOptions,
    sender: &mpsc::Sender<FetchResult>,
) -> bool
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    // Some servers push unsolicited FETCH data (flags only) mid-batch.
    if message.header.is_none() {
        tracing::debug!(seq = ?message.seq, uid = ?message.uid, "skipping FETCH response without RFC822.HEADER");
        return true;
    }

    let email = match DecodedEmail::from_fetched(message, charset) {
        Ok(email) => email,
        Err(error) => {
            tracing::warn!(uid = ?error.uid(), error = %error, "unable to decode message");
            return emit(sender, FetchResult::Failed { uid: error.uid(), error }).await;
        }
    };
    let Some(uid) = message.uid else {
        return true;
    };

    if !emit(sender, FetchResult::Email(email)).await {
        return false;
    }

    if let Err(error) = session.set_flag(uid, Flag::Seen, options.mark_as_read).await {
        tracing::warn!(uid = uid.get(), error = %error, "unable to change seen flag");
        return emit(sender, FetchResult::Failed { uid: Some(uid.get()), error }).await;
    }
    if options.delete
        && let Err(error) = session.set_flag(uid, Flag::Deleted, true).await
    {
        tracing::warn!(uid = uid.get(), error = %error, "unable to flag message deleted");
        return emit(sender, FetchResult::Failed { uid: Some(uid.get()), error }).await;
    }
    true
}

/// Opens a session and starts streaming the messages matching `criteria`.
///
/// # Errors
///
/// Session-level failures ([`Error::Connection`], [`Error::Auth`],
/// [`Error::Folder`]) are returned here and no stream is created.
pub async fn generate(
    config: &MailboxConfig,
    criteria: SearchCriteria,
    options: FetchOptions,
) -> Result<FetchStream> {
    let session: MailSession<ImapStream> = MailSession::open(config).await?;
    Ok(FetchStream::spawn(session, criteria, options))
}
