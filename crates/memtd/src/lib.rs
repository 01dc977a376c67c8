//! Daemon library for `memtd`, the system-combination decode service.
//!
//! The daemon loads one language model at startup and then serves decode
//! requests over TCP, one connection at a time. Each connection carries a
//! single `key = value` configuration block; the daemon validates it, decodes
//! the matched input it names against the shared model, writes the results to
//! the output files it names, and answers `Done`. A malformed request is
//! answered with an `error:` line instead and the daemon carries on with the
//! next client.
//!
//! The startup sequence is:
//!
//! 1. resolve [`memt_config::ServiceConfig`] from the command line;
//! 2. install structured telemetry;
//! 3. load the language model chosen by `--lm.type`;
//! 4. bind the listener and serve until a termination signal arrives.
//!
//! Health reporting hooks emit structured events at each stage so operators
//! can see which step failed.

mod bootstrap;
pub mod decode;
mod dispatch;
mod health;
pub mod model;
mod process;
pub mod request;
mod telemetry;
mod transport;

pub use bootstrap::{
    ArgsConfigLoader, BootstrapError, ConfigLoader, Daemon, StaticConfigLoader,
    SystemConfigLoader, bootstrap_with,
};
pub use dispatch::ConnectionError;
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, ShutdownError, ShutdownSignal, SystemShutdownSignal, run_daemon};
pub use telemetry::{TelemetryError, TelemetryHandle};

#[cfg(test)]
mod tests;
