//! Structured health reporting for daemon lifecycle events.

use std::net::SocketAddr;
use std::sync::Arc;

use memt_config::{LmConfig, ServiceConfig};

use crate::bootstrap::BootstrapError;
use crate::model::{LanguageModel, LoadedModel, ModelLoadError};

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &ServiceConfig);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked before the language model is read.
    fn model_loading(&self, config: &LmConfig);

    /// Invoked once the language model is loaded.
    fn model_ready(&self, model: &LoadedModel);

    /// Invoked when the language model cannot be loaded.
    fn model_failed(&self, error: &ModelLoadError);

    /// Invoked once the listener accepts connections.
    fn listener_ready(&self, addr: SocketAddr);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &ServiceConfig) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn model_loading(&self, config: &LmConfig) {
        (**self).model_loading(config);
    }

    fn model_ready(&self, model: &LoadedModel) {
        (**self).model_ready(model);
    }

    fn model_failed(&self, error: &ModelLoadError) {
        (**self).model_failed(error);
    }

    fn listener_ready(&self, addr: SocketAddr) {
        (**self).listener_ready(addr);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting daemon bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &ServiceConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            listen = %config.listen(),
            lm_type = %config.lm.backend,
            log_filter = %config.log_filter(),
            log_format = %config.log_format(),
            "daemon bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "daemon bootstrap failed"
        );
    }

    fn model_loading(&self, config: &LmConfig) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "model_loading",
            lm_type = %config.backend,
            file = %config.file,
            order = config.order,
            "loading language model"
        );
    }

    fn model_ready(&self, model: &LoadedModel) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "model_ready",
            lm_type = %model.backend(),
            order = model.order(),
            vocabulary = model.vocabulary().len(),
            "language model ready"
        );
    }

    fn model_failed(&self, error: &ModelLoadError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "model_failed",
            error = %error,
            "language model failed to load"
        );
    }

    fn listener_ready(&self, addr: SocketAddr) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "listener_ready",
            addr = %addr,
            "accepting decode requests"
        );
    }
}
