//! Error types for MIME decoding.

/// Result type alias for MIME operations.
pub type Result<T> = std::result::Result<T, Error>;

/// MIME decoding errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A charset, transfer-encoding or media-type step failed.
    #[error("decode error: {0}")]
    Decode(String),

    /// The message structure is unusable (no header/body separator,
    /// multipart without a boundary).
    #[error("malformed message: {0}")]
    MalformedMessage(String),
}

impl Error {
    pub(crate) fn decode(message: impl Into<String>) -> Self {
        Self::Decode(message.into())
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedMessage(message.into())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Self::Decode(format!("base64: {e}"))
    }
}
