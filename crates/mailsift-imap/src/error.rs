//! Error types for the IMAP client.

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while talking to an IMAP server.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying socket.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or record layer error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Host name is not usable as a TLS server name.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// A server response could not be parsed.
    #[error("Protocol error at position {position}: {message}")]
    Parse {
        /// Byte offset into the response line.
        position: usize,
        /// What went wrong.
        message: String,
    },

    /// Server completed the command with NO.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Server rejected the command with BAD.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// Server closed the session with BYE.
    #[error("Server sent BYE: {0}")]
    Bye(String),

    /// Operation did not finish in time.
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// A command argument cannot be encoded on a single command line.
    #[error("Invalid argument for {command}: {reason}")]
    InvalidArgument {
        /// Command the argument belongs to.
        command: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// Unexpected data or framing from the server.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns true if the server answered the command, as opposed to the
    /// transport failing underneath it.
    #[must_use]
    pub const fn is_server_response(&self) -> bool {
        matches!(self, Self::No(_) | Self::Bad(_) | Self::Bye(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
