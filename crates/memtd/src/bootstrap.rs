//! Daemon bootstrap orchestration.
//!
//! Bootstrap runs strictly before any socket is opened: configuration is
//! resolved, telemetry installed and the language model loaded. Any failure
//! here is fatal to the process.

use std::ffi::OsString;
use std::sync::Arc;

use thiserror::Error;

use memt_config::{ServiceConfig, StartupError};

use crate::health::HealthReporter;
use crate::model::{LoadedModel, ModelLoadError, ModelLoader};
use crate::telemetry::{self, TelemetryError, TelemetryHandle};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the daemon configuration.
    fn load(&self) -> Result<ServiceConfig, StartupError>;
}

/// Loader that reads the process arguments via [`ServiceConfig::load`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<ServiceConfig, StartupError> {
        ServiceConfig::load()
    }
}

/// Loader that parses an explicit argument list.
#[derive(Debug, Clone)]
pub struct ArgsConfigLoader {
    args: Vec<OsString>,
}

impl ArgsConfigLoader {
    /// Captures `args`; the first item is the program name.
    pub fn new<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl ConfigLoader for ArgsConfigLoader {
    fn load(&self) -> Result<ServiceConfig, StartupError> {
        ServiceConfig::load_from_iter(self.args.iter().cloned())
    }
}

/// Loader that always returns a pre-built configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: ServiceConfig,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: ServiceConfig) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<ServiceConfig, StartupError> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying startup error.
        #[source]
        source: StartupError,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// The language model could not be loaded.
    #[error("failed to load language model: {source}")]
    Model {
        /// Underlying loader error.
        #[source]
        source: ModelLoadError,
    },
}

/// Result of a successful bootstrap invocation.
pub struct Daemon {
    config: ServiceConfig,
    model: Arc<LoadedModel>,
    telemetry: TelemetryHandle,
}

impl Daemon {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// The process-wide language model.
    #[must_use]
    pub fn model(&self) -> &Arc<LoadedModel> {
        &self.model
    }

    /// Accessor for the telemetry handle, primarily useful for testing.
    #[must_use]
    pub fn telemetry(&self) -> TelemetryHandle {
        self.telemetry
    }
}

/// Bootstraps the daemon using the supplied collaborators.
///
/// # Errors
///
/// Returns the first [`BootstrapError`] encountered; the reporter is told
/// about it before it is returned.
pub fn bootstrap_with(
    loader: &dyn ConfigLoader,
    reporter: &dyn HealthReporter,
    model_loader: &dyn ModelLoader,
) -> Result<Daemon, BootstrapError> {
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    let telemetry = match telemetry::initialise(&config) {
        Ok(handle) => handle,
        Err(source) => {
            let error = BootstrapError::Telemetry { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.model_loading(&config.lm);
    let model = match model_loader.load(&config.lm) {
        Ok(model) => {
            reporter.model_ready(&model);
            model
        }
        Err(source) => {
            reporter.model_failed(&source);
            let error = BootstrapError::Model { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        model: Arc::new(model),
        telemetry,
    })
}
