//! Response lines written back to clients.

use std::io::{self, Write};

use crate::request::RequestError;

/// Line sent after a request has been decoded.
pub(crate) const DONE_MARKER: &str = "Done";

/// Writes the single response line of a connection.
pub(crate) struct ResponseWriter<W> {
    writer: W,
}

impl<W: Write> ResponseWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes the success marker and flushes.
    pub(crate) fn write_done(&mut self) -> io::Result<()> {
        writeln!(self.writer, "{DONE_MARKER}")?;
        self.writer.flush()
    }

    /// Writes the diagnostic for a rejected request and flushes.
    pub(crate) fn write_rejection(&mut self, error: &RequestError) -> io::Result<()> {
        writeln!(self.writer, "error: {error}")?;
        self.writer.flush()
    }
}
