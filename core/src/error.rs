//! Error types for the list-service client.
//!
//! # Design
//! Every operation reports failure through a single `MalError`, returned from
//! the operation's future. Argument validation, transport failures and
//! malformed responses all travel the same channel, so callers never have to
//! handle a synchronous panic next to an asynchronous error.
//!
//! Transport problems are split out into `NetworkError` because callers often
//! want to tell "could not reach the server" apart from "the server said no".

use std::convert::Infallible;

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MalError>;

/// Errors returned by `MalClient` operations and the codec.
#[derive(Debug, Error)]
pub enum MalError {
    /// Credentials or client configuration are missing or unusable.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// An operation argument was rejected before any request was built.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The request did not complete successfully.
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The response body was not well-formed XML or lacked the expected root.
    #[error("malformed response: {0}")]
    Parse(String),

    /// An outbound payload could not be written as XML.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

/// Transport-level failures.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Connection refused, DNS failure, TLS failure and similar.
    #[error("request failed: {0}")]
    Request(String),

    #[error("request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else {
            NetworkError::Request(err.to_string())
        }
    }
}

impl From<reqwest::Error> for MalError {
    fn from(err: reqwest::Error) -> Self {
        MalError::Network(err.into())
    }
}

// Lets operations accept an already-typed `EntryType` through the same
// `TryInto` bound used for strings.
impl From<Infallible> for MalError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}
