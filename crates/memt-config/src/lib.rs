//! Startup configuration for the `memtd` daemon.
//!
//! The daemon is configured once, from the command line, before anything else
//! happens. Configuration is deliberately fail-fast: a mandatory flag that is
//! missing or repeated, an unrecognised language-model backend, or a value that
//! cannot be converted aborts startup with an error naming the offending flag.
//! No socket is opened and no model is loaded until [`ServiceConfig::load`]
//! succeeds.
//!
//! ```text
//! memtd --lm.type=salm --lm.file=model.salm --lm.order=3 --port=9000
//! ```

mod backend;
mod cli;
mod defaults;
mod endpoint;
mod logging;

use std::ffi::OsString;
use std::str::FromStr;

use camino::Utf8PathBuf;
use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use backend::{BackendParseError, LmBackend};
pub use defaults::{
    DEFAULT_BACKEND, DEFAULT_HOST, DEFAULT_LOG_FILTER, default_log_filter_string,
    default_log_format,
};
pub use endpoint::ListenEndpoint;
pub use logging::{LogFormat, LogFormatParseError, LogSettings};

use cli::StartupArgs;

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Clap rejected the command line, or help/version output was requested.
    #[error("{0}")]
    Usage(#[from] clap::Error),
    /// A flag was supplied the wrong number of times.
    #[error("expected --{key} {expected} time(s), got it {actual}")]
    OptionCount {
        /// Flag name without the leading dashes.
        key: &'static str,
        /// Required number of occurrences.
        expected: usize,
        /// Number of occurrences found.
        actual: usize,
    },
    /// `--lm.type` named an unknown backend.
    #[error(transparent)]
    UnknownBackend(#[from] BackendParseError),
    /// `--lm.order` was zero.
    #[error("lm.order must be at least 1, got {0}")]
    InvalidOrder(u32),
    /// `--log-format` was not a supported format.
    #[error("unsupported log format '{value}': {source}")]
    InvalidLogFormat {
        /// Value supplied on the command line.
        value: String,
        /// Parser rejection.
        #[source]
        source: LogFormatParseError,
    },
}

/// Language-model selection resolved from the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LmConfig {
    /// Backend implementation to load.
    pub backend: LmBackend,
    /// Model file read by the backend.
    pub file: Utf8PathBuf,
    /// N-gram order of the model.
    pub order: u32,
}

/// Process-wide configuration resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ServiceConfig {
    /// Language model to load for the lifetime of the process.
    pub lm: LmConfig,
    /// Address accepting decode requests.
    pub listen: ListenEndpoint,
    /// Telemetry settings.
    pub logging: LogSettings,
}

impl ServiceConfig {
    /// Builds a configuration with default logging settings.
    #[must_use]
    pub fn new(lm: LmConfig, listen: ListenEndpoint) -> Self {
        Self {
            lm,
            listen,
            logging: LogSettings::default(),
        }
    }

    /// Loads configuration from the process arguments.
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] describing the first invalid flag.
    pub fn load() -> Result<Self, StartupError> {
        Self::load_from_iter(std::env::args_os())
    }

    /// Loads configuration from an explicit argument list. The first item is
    /// the program name, as with [`std::env::args_os`].
    ///
    /// # Errors
    ///
    /// Returns a [`StartupError`] describing the first invalid flag.
    pub fn load_from_iter<I, T>(args: I) -> Result<Self, StartupError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let args = StartupArgs::try_parse_from(args)?;
        Self::from_args(args)
    }

    /// Address accepting decode requests.
    #[must_use]
    pub fn listen(&self) -> &ListenEndpoint {
        &self.listen
    }

    /// Configured tracing filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.logging.filter.as_str()
    }

    /// Configured log output format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.logging.format
    }
}

impl ServiceConfig {
    fn from_args(args: StartupArgs) -> Result<Self, StartupError> {
        // Mandatory flags are checked before the optional ones so a missing
        // model or port is reported ahead of a bad backend name.
        let file = exactly_once("lm.file", args.lm_file)?;
        let order = exactly_once("lm.order", args.lm_order)?;
        let port = exactly_once("port", args.port)?;

        let backend = match at_most_once("lm.type", args.lm_type)? {
            Some(name) => LmBackend::from_str(&name)?,
            None => DEFAULT_BACKEND,
        };
        if order == 0 {
            return Err(StartupError::InvalidOrder(order));
        }

        let host = at_most_once("host", args.host)?.unwrap_or_else(|| DEFAULT_HOST.to_owned());
        let filter =
            at_most_once("log-filter", args.log_filter)?.unwrap_or_else(default_log_filter_string);
        let format = match at_most_once("log-format", args.log_format)? {
            Some(raw) => {
                LogFormat::from_str(&raw)
                    .map_err(|source| StartupError::InvalidLogFormat { value: raw, source })?
            }
            None => default_log_format(),
        };

        Ok(Self {
            lm: LmConfig {
                backend,
                file: Utf8PathBuf::from(file),
                order,
            },
            listen: ListenEndpoint::new(host, port),
            logging: LogSettings { filter, format },
        })
    }
}

fn exactly_once<T>(key: &'static str, values: Vec<T>) -> Result<T, StartupError> {
    let actual = values.len();
    match <[T; 1]>::try_from(values) {
        Ok([value]) => Ok(value),
        Err(_) => Err(StartupError::OptionCount {
            key,
            expected: 1,
            actual,
        }),
    }
}

fn at_most_once<T>(key: &'static str, values: Vec<T>) -> Result<Option<T>, StartupError> {
    if values.is_empty() {
        return Ok(None);
    }
    exactly_once(key, values).map(Some)
}
