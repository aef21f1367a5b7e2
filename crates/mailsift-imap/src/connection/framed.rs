//! Line and literal framing.
//!
//! A server response is one CRLF-terminated line, unless that line ends in a
//! `{n}` literal marker, in which case the next `n` bytes and the rest of the
//! response follow. [`FramedStream::read_response`] returns the whole thing
//! as one buffer for the parser.

#![allow(clippy::missing_errors_doc)]

use std::io;

use bytes::{Buf, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{Error, Result};

const READ_CHUNK: usize = 8192;

/// Upper bound for a single line outside literals.
const MAX_LINE_LENGTH: usize = 1024 * 1024;

/// Upper bound for one literal.
const MAX_LITERAL_SIZE: usize = 100 * 1024 * 1024;

/// Buffered reader/writer speaking the IMAP framing.
pub struct FramedStream<S> {
    stream: S,
    buffer: BytesMut,
}

impl<S> FramedStream<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wraps a connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            buffer: BytesMut::with_capacity(READ_CHUNK),
        }
    }

    /// Reads one complete response, literals included.
    pub async fn read_response(&mut self) -> Result<Vec<u8>> {
        let mut response = Vec::new();
        loop {
            let line_len = self.fill_line().await?;
            let line = self.buffer.split_to(line_len);
            let literal = literal_length(&line);
            response.extend_from_slice(&line);

            let Some(len) = literal else {
                return Ok(response);
            };
            if len > MAX_LITERAL_SIZE {
                return Err(Error::Protocol(format!(
                    "literal of {len} bytes exceeds {MAX_LITERAL_SIZE}"
                )));
            }
            self.fill_exact(len).await?;
            response.extend_from_slice(&self.buffer[..len]);
            self.buffer.advance(len);
        }
    }

    /// Reads responses until the completion for `tag` arrives. The tagged
    /// line is the last element.
    pub async fn read_until_tagged(&mut self, tag: &str) -> Result<Vec<Vec<u8>>> {
        let mut responses = Vec::new();
        loop {
            let response = self.read_response().await?;
            let done = is_tagged_with(&response, tag);
            responses.push(response);
            if done {
                return Ok(responses);
            }
        }
    }

    /// Writes and flushes one command.
    pub async fn write_command(&mut self, data: &[u8]) -> Result<()> {
        self.stream.write_all(data).await?;
        self.stream.flush().await?;
        Ok(())
    }

    /// Shuts the write side down.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.stream.shutdown().await?;
        Ok(())
    }

    /// The wrapped stream.
    pub const fn get_ref(&self) -> &S {
        &self.stream
    }

    /// Unwraps the stream, discarding buffered input.
    pub fn into_inner(self) -> S {
        self.stream
    }

    /// Buffers input until it holds a full line; returns the line length
    /// including its terminator.
    async fn fill_line(&mut self) -> Result<usize> {
        let mut scanned = 0;
        loop {
            if let Some(pos) = self.buffer[scanned..].iter().position(|b| *b == b'\n') {
                return Ok(scanned + pos + 1);
            }
            scanned = self.buffer.len();
            if scanned > MAX_LINE_LENGTH {
                return Err(Error::Protocol(format!(
                    "line exceeds {MAX_LINE_LENGTH} bytes"
                )));
            }
            self.read_more().await?;
        }
    }

    async fn fill_exact(&mut self, len: usize) -> Result<()> {
        while self.buffer.len() < len {
            self.read_more().await?;
        }
        Ok(())
    }

    async fn read_more(&mut self) -> Result<()> {
        self.buffer.reserve(READ_CHUNK);
        let n = self.stream.read_buf(&mut self.buffer).await?;
        if n == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "server closed the connection",
            )));
        }
        Ok(())
    }
}

/// True if `response` starts with `tag SP`.
fn is_tagged_with(response: &[u8], tag: &str) -> bool {
    response.len() > tag.len()
        && response.starts_with(tag.as_bytes())
        && response[tag.len()] == b' '
}

/// Size announced by a trailing `{n}` or `{n+}` marker.
fn literal_length(line: &[u8]) -> Option<usize> {
    let line = line.strip_suffix(b"\n")?;
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    let line = line.strip_suffix(b"}")?;
    let line = line.strip_suffix(b"+").unwrap_or(line);
    let open = line.iter().rposition(|b| *b == b'{')?;
    let digits = &line[open + 1..];
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}
