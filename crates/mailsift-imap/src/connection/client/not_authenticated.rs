//! Greeting and LOGIN.

use tokio::io::{AsyncRead, AsyncWrite};

use super::states::{Authenticated, NotAuthenticated};
use super::{Client, DEFAULT_IO_TIMEOUT};
use crate::command::{Command, TagGenerator};
use crate::connection::framed::FramedStream;
use crate::parser::{Response, ResponseParser, UntaggedResponse};
use crate::types::Status;
use crate::{Error, Result};

impl<S> Client<S, NotAuthenticated>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream and reads the server greeting. A `BYE`
    /// greeting means the server refused the connection.
    pub async fn from_stream(stream: S) -> Result<Self> {
        let mut framed = FramedStream::new(stream);
        let greeting = tokio::time::timeout(DEFAULT_IO_TIMEOUT, framed.read_response())
            .await
            .map_err(|_| Error::Timeout(DEFAULT_IO_TIMEOUT))??;

        match ResponseParser::parse(&greeting)? {
            Response::Untagged(UntaggedResponse::Condition {
                status: Status::Bye,
                text,
                ..
            }) => return Err(Error::Bye(text)),
            Response::Untagged(UntaggedResponse::Condition { status, text, .. }) => {
                tracing::debug!(?status, greeting = %text, "server greeting");
            }
            other => {
                return Err(Error::Protocol(format!("unexpected greeting: {other:?}")));
            }
        }

        Ok(Self {
            stream: framed,
            tags: TagGenerator::default(),
            io_timeout: DEFAULT_IO_TIMEOUT,
            state: NotAuthenticated,
        })
    }

    /// Logs in with a user name and password.
    pub async fn login(mut self, username: &str, password: &str) -> Result<Client<S, Authenticated>> {
        self.run(&Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        })
        .await?;
        tracing::debug!(user = username, "logged in");
        Ok(self.transition(Authenticated))
    }
}
