//! Per-connection request handling.
//!
//! A client writes one configuration block and half-closes its side of the
//! connection. The handler validates the block, runs the decode engine
//! against the shared model and answers with a single line:
//!
//! ```text
//! Done
//! ```
//!
//! or, when the block is rejected,
//!
//! ```text
//! error: expected score.lm 1 time(s), got it 0
//! ```
//!
//! Decode output never travels over the connection; it is written to the
//! files named in the request. Failures other than validation errors are
//! returned to the listener, which logs them.

mod errors;
mod handler;
mod response;

pub use self::errors::ConnectionError;
pub(crate) use self::handler::RequestConnectionHandler;
use self::response::ResponseWriter;
#[cfg(test)]
pub(crate) use self::response::DONE_MARKER;

pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");
