//! Errors that stop `memtd` before or while it serves requests.

use thiserror::Error;

use crate::bootstrap::BootstrapError;
use crate::transport::ListenerError;

use super::shutdown::ShutdownError;

/// Failures that end the process. Per-connection failures never reach here.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Configuration, telemetry or the language model could not be set up.
    #[error("startup failed: {source}")]
    Bootstrap {
        #[from]
        source: BootstrapError,
    },
    /// The request port could not be opened or the accept thread died.
    #[error("request listener failed: {source}")]
    Listen {
        #[from]
        source: ListenerError,
    },
    /// Termination signals could not be observed.
    #[error("cannot wait for termination signals: {source}")]
    Signals {
        #[from]
        source: ShutdownError,
    },
}
