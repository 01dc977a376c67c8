//! Errors raised while opening or running the request port.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Listener failures. All of them are fatal to the process.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// `--host`/`--port` did not resolve.
    #[error("cannot resolve listen address {host}:{port}: {source}")]
    Resolve {
        host: String,
        port: u16,
        #[source]
        source: io::Error,
    },
    /// Resolution succeeded but produced no address.
    #[error("listen address {host}:{port} resolved to nothing")]
    ResolveEmpty { host: String, port: u16 },
    /// The port is taken or not permitted.
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
    /// The bound socket could not report its address.
    #[error("cannot read the bound request port: {source}")]
    LocalAddr {
        #[source]
        source: io::Error,
    },
    /// The socket could not be made non-blocking for the accept poll.
    #[error("cannot switch the request port to polling mode: {source}")]
    NonBlocking {
        #[source]
        source: io::Error,
    },
    /// The accept thread panicked outside any connection.
    #[error("accept thread panicked")]
    AcceptThreadPanic,
}
