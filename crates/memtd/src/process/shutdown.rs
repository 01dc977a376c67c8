//! Termination handling for the serving loop.

use std::io;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::iterator::Signals;
use thiserror::Error;
use tracing::info;

use super::PROCESS_TARGET;

const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Blocks the supervising thread until the daemon should stop serving.
pub trait ShutdownSignal: Send + Sync {
    /// Returns once a stop has been requested.
    fn wait(&self) -> Result<(), ShutdownError>;
}

/// Failure to observe termination requests.
#[derive(Debug, Error)]
pub enum ShutdownError {
    /// The signal handlers could not be registered.
    #[error("cannot register termination signal handlers: {source}")]
    Register {
        #[source]
        source: io::Error,
    },
}

/// Waits for SIGTERM, SIGINT, SIGQUIT or SIGHUP.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemShutdownSignal;

impl ShutdownSignal for SystemShutdownSignal {
    fn wait(&self) -> Result<(), ShutdownError> {
        let mut signals =
            Signals::new(TERMINATION_SIGNALS).map_err(|source| ShutdownError::Register { source })?;
        let received = signals.forever().next();
        info!(
            target: PROCESS_TARGET,
            signal = ?received,
            "termination requested, draining the current connection"
        );
        Ok(())
    }
}
