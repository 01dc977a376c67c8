//! Connection handling abstractions for the daemon listener.

use std::error::Error;
use std::io::{self, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Failure raised while serving one connection. The listener logs it and
/// keeps accepting.
pub(crate) type ConnectionFailure = Box<dyn Error + Send + Sync + 'static>;

/// An accepted client connection.
#[derive(Debug)]
pub(crate) struct ConnectionStream {
    stream: TcpStream,
}

impl ConnectionStream {
    pub(crate) fn new(stream: TcpStream) -> Self {
        Self { stream }
    }

    /// Address of the connected client, when the socket still knows it.
    pub(crate) fn peer_addr(&self) -> Option<SocketAddr> {
        self.stream.peer_addr().ok()
    }

    /// Closes both halves of the connection.
    pub(crate) fn close(&self) -> io::Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Err(error) if error.kind() != io::ErrorKind::NotConnected => Err(error),
            _ => Ok(()),
        }
    }
}

impl Read for ConnectionStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for ConnectionStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

/// Handles accepted socket connections.
pub(crate) trait ConnectionHandler: Send + Sync + 'static {
    /// Serves a single connection to completion.
    ///
    /// An `Err` marks the connection as failed; the listener logs it and
    /// carries on. Implementations should avoid panicking, although the
    /// listener contains panics as well.
    fn handle(&self, stream: ConnectionStream) -> Result<(), ConnectionFailure>;
}
