//! Unexpected failures while serving a connection.
//!
//! Validation problems are not errors at this level: they are answered on
//! the connection and reported as a rejected outcome. Everything here is
//! logged by the listener and the connection is dropped.

use std::io;

use thiserror::Error;

use crate::decode::DecodeError;

/// Failures that end a connection without a response.
#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Reading the request or writing the response failed.
    #[error("connection I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The decode engine failed after the request was accepted.
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
}
