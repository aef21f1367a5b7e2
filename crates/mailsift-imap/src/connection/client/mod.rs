//! Type-state client.
//!
//! `Client<S, State>` moves through `NotAuthenticated → Authenticated →
//! Selected`, and each state only offers the commands valid in it. The
//! transitions consume the client, so a failed LOGIN or SELECT drops the
//! connection with it.

#![allow(clippy::missing_errors_doc)]

mod authenticated;
mod not_authenticated;
mod selected;
mod states;

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncWrite};

pub use self::states::{Authenticated, NotAuthenticated, Selected};
use super::framed::FramedStream;
use crate::command::{Command, TagGenerator};
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::Status;
use crate::{Error, Result};

/// Default limit for one command round trip.
pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(60);

/// A connection in a given protocol state.
pub struct Client<S, State> {
    stream: FramedStream<S>,
    tags: TagGenerator,
    io_timeout: Duration,
    state: State,
}

impl<S, State: std::fmt::Debug> std::fmt::Debug for Client<S, State> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("tags_issued", &self.tags.issued())
            .field("io_timeout", &self.io_timeout)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<S, State> Client<S, State>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Sets the per-command timeout.
    #[must_use]
    pub const fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }

    /// The protocol state value.
    pub const fn state(&self) -> &State {
        &self.state
    }

    /// Keeps the connection alive.
    pub async fn noop(&mut self) -> Result<()> {
        self.run(&Command::Noop).await.map(drop)
    }

    /// Ends the session. The server's `* BYE` is expected and not an error.
    pub async fn logout(mut self) -> Result<()> {
        let tag = self.tags.next();
        self.stream
            .write_command(&Command::Logout.serialize(&tag))
            .await?;
        let responses = self.read_until_tagged(&tag).await;
        let _ = self.stream.shutdown().await;
        let (_, tagged) = split_responses(&responses?, &tag)?;
        check_status(tagged)
    }

    fn transition<Next>(self, state: Next) -> Client<S, Next> {
        Client {
            stream: self.stream,
            tags: self.tags,
            io_timeout: self.io_timeout,
            state,
        }
    }

    /// Sends `command` and returns the untagged data that came back with its
    /// OK completion.
    pub(crate) async fn run(&mut self, command: &Command) -> Result<Vec<UntaggedResponse>> {
        command.validate()?;
        let tag = self.tags.next();
        tracing::trace!(tag = %tag, command = command.name(), "sending command");
        self.stream.write_command(&command.serialize(&tag)).await?;
        let raw = self.read_until_tagged(&tag).await?;
        let (untagged, tagged) = split_responses(&raw, &tag)?;
        if let Some(text) = untagged.iter().find_map(|u| match u {
            UntaggedResponse::Condition {
                status: Status::Bye,
                text,
                ..
            } => Some(text.clone()),
            _ => None,
        }) && !matches!(command, Command::Logout)
        {
            return Err(Error::Bye(text));
        }
        check_status(tagged)?;
        Ok(untagged)
    }

    async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        tokio::time::timeout(self.io_timeout, self.stream.read_until_tagged(tag))
            .await
            .map_err(|_| Error::Timeout(self.io_timeout))?
    }
}

/// Parses raw responses into untagged data plus the completion for `tag`.
/// Untagged lines that fail to parse are logged and skipped.
fn split_responses(raw: &[Vec<u8>], tag: &str) -> Result<(Vec<UntaggedResponse>, Response)> {
    let mut untagged = Vec::with_capacity(raw.len());
    let mut tagged = None;
    for bytes in raw {
        match ResponseParser::parse(bytes) {
            Ok(Response::Untagged(u)) => untagged.push(u),
            Ok(response @ Response::Tagged { .. }) => tagged = Some(response),
            Ok(Response::Continuation { .. }) => {}
            Err(e) if bytes.starts_with(b"* ") => {
                tracing::debug!(error = %e, "skipping unparseable untagged response");
            }
            Err(e) => return Err(e),
        }
    }
    match tagged {
        Some(response @ Response::Tagged { .. }) => Ok((untagged, response)),
        _ => Err(Error::Protocol(format!("no completion received for {tag}"))),
    }
}

/// Maps a tagged completion to `Ok` or the matching server error.
fn check_status(response: Response) -> Result<()> {
    let Response::Tagged { status, text, .. } = response else {
        return Err(Error::Protocol("expected a tagged completion".to_string()));
    };
    match status {
        Status::Ok | Status::PreAuth => Ok(()),
        Status::No => Err(Error::No(text)),
        Status::Bad => Err(Error::Bad(text)),
        Status::Bye => Err(Error::Bye(text)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_split_finds_completion() {
        let raw = vec![
            b"* 3 EXISTS\r\n".to_vec(),
            b"* \x01bad\r\n".to_vec(),
            b"A0001 OK done\r\n".to_vec(),
        ];
        let (untagged, tagged) = split_responses(&raw, "A0001").unwrap();
        assert_eq!(untagged, vec![UntaggedResponse::Exists(3)]);
        assert!(check_status(tagged).is_ok());
    }

    #[test]
    fn test_missing_completion_is_protocol_error() {
        let raw = vec![b"* 3 EXISTS\r\n".to_vec()];
        assert!(matches!(
            split_responses(&raw, "A0001"),
            Err(Error::Protocol(_))
        ));
    }

    #[test]
    fn test_status_mapping() {
        let no = ResponseParser::parse(b"A1 NO [AUTHENTICATIONFAILED] bad password\r\n").unwrap();
        assert!(matches!(check_status(no), Err(Error::No(t)) if t == "bad password"));
        let bad = ResponseParser::parse(b"A1 BAD parse error\r\n").unwrap();
        assert!(matches!(check_status(bad), Err(Error::Bad(_))));
    }
}
