//! Connection handler that validates requests and runs the decode engine.

use std::io::{Read, Write};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::decode::{DecodeEngine, DecodeSummary};
use crate::model::LoadedModel;
use crate::request::{RequestConfig, RequestError, read_block};
use crate::transport::{ConnectionFailure, ConnectionHandler, ConnectionStream};

use super::{ConnectionError, DISPATCH_TARGET, ResponseWriter};

/// How a connection ended when nothing unexpected happened.
#[derive(Debug)]
pub(crate) enum ConnectionOutcome {
    /// The request was decoded and `Done` was sent.
    Completed(DecodeSummary),
    /// The request failed validation and the diagnostic was sent.
    Rejected(RequestError),
}

/// Serves decode requests against the process-wide model.
///
/// Each connection is handled synchronously: read the block to end of
/// stream, validate it, decode, answer, close.
pub(crate) struct RequestConnectionHandler {
    model: Arc<LoadedModel>,
    engine: Arc<dyn DecodeEngine>,
}

impl RequestConnectionHandler {
    pub(crate) fn new(model: Arc<LoadedModel>, engine: Arc<dyn DecodeEngine>) -> Self {
        Self { model, engine }
    }

    /// Runs one request over `stream`.
    ///
    /// Validation failures are answered on the stream and reported as
    /// [`ConnectionOutcome::Rejected`]; the engine is never invoked for them.
    pub(crate) fn serve<S: Read + Write>(
        &self,
        stream: &mut S,
    ) -> Result<ConnectionOutcome, ConnectionError> {
        let bytes = read_block(&mut *stream)?;
        let mut writer = ResponseWriter::new(&mut *stream);

        let request = match RequestConfig::parse(&bytes) {
            Ok(request) => request,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    error = %error,
                    key = error.key(),
                    "request rejected"
                );
                writer.write_rejection(&error)?;
                return Ok(ConnectionOutcome::Rejected(error));
            }
        };

        echo_request(&request);
        let summary = self.engine.run(&self.model, &request)?;
        writer.write_done()?;
        Ok(ConnectionOutcome::Completed(summary))
    }
}

impl ConnectionHandler for RequestConnectionHandler {
    fn handle(&self, mut stream: ConnectionStream) -> Result<(), ConnectionFailure> {
        match self.serve(&mut stream)? {
            ConnectionOutcome::Completed(summary) => debug!(
                target: DISPATCH_TARGET,
                units = summary.units,
                "request completed"
            ),
            ConnectionOutcome::Rejected(error) => debug!(
                target: DISPATCH_TARGET,
                key = error.key(),
                "diagnostic sent"
            ),
        }
        stream.close()?;
        Ok(())
    }
}

fn echo_request(request: &RequestConfig) {
    let resolved = serde_json::to_string(request)
        .unwrap_or_else(|error| format!("<unserialisable request: {error}>"));
    info!(
        target: DISPATCH_TARGET,
        matched_file = %request.input_matched,
        config = %resolved,
        "request accepted"
    );
}
