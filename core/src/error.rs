//! Error types for the Context.IO client.
//!
//! # Design
//! Every failure of a single call surfaces as one `Error` value. Non-2xx
//! answers keep their status code and raw body so callers can tell "does
//! not exist" apart from "malformed request" or "server error" and compose
//! their own existence checks or retries on top.

use thiserror::Error;

/// Errors returned by `Client` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A parameter record could not be turned into key/value pairs, e.g. a
    /// required field was `None`.
    #[error("parameter encoding failed: {0}")]
    Encoding(String),

    /// The request could not be signed.
    #[error("request signing failed: {0}")]
    Signing(String),

    /// The call did not complete within the client's timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection-level failure: DNS, refused connection, broken stream.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("response decoding failed: {0}")]
    Decode(String),

    /// Client configuration is missing or malformed.
    #[error("configuration error: {0}")]
    Config(String),

    /// The server answered 2xx but reported `success: false`.
    #[error("request refused: {0}")]
    Refused(String),
}

impl Error {
    /// HTTP status carried by a `Status` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
