//! TCP listener for decode requests.
//!
//! The transport module binds the configured endpoint and accepts
//! connections on a background thread. Connections are served one at a time
//! on that thread; a connection that fails or panics is logged and the loop
//! moves on to the next client.

mod errors;
mod handler;
mod listener;
#[cfg(test)]
mod test_utils;

pub(crate) use self::errors::ListenerError;
pub(crate) use self::handler::{ConnectionFailure, ConnectionHandler, ConnectionStream};
pub(crate) use self::listener::SocketListener;
#[cfg(test)]
pub(crate) use self::test_utils::{CountingHandler, PanickingHandler};

const LISTENER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::transport");
