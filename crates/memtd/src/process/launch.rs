//! Supervises daemon launch sequencing and runtime orchestration.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bootstrap::{ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::decode::{DecodeEngine, ReferenceEngine};
use crate::dispatch::RequestConnectionHandler;
use crate::health::{HealthReporter, StructuredHealthReporter};
use crate::model::{FileModelLoader, ModelLoader};
use crate::transport::SocketListener;

use super::PROCESS_TARGET;
use super::errors::LaunchError;
use super::shutdown::{ShutdownSignal, SystemShutdownSignal};

/// Collaborators required to launch the daemon runtime.
pub(crate) struct LaunchPlan<L, M, S> {
    pub(crate) loader: L,
    pub(crate) model_loader: M,
    pub(crate) reporter: Arc<dyn HealthReporter>,
    pub(crate) engine: Arc<dyn DecodeEngine>,
    pub(crate) shutdown: S,
}

/// Runs the daemon using the production collaborators.
///
/// # Errors
///
/// Returns a [`LaunchError`] when bootstrap fails, the socket cannot be
/// bound, or signal handlers cannot be installed.
pub fn run_daemon() -> Result<(), LaunchError> {
    run_daemon_with(LaunchPlan {
        loader: SystemConfigLoader,
        model_loader: FileModelLoader,
        reporter: Arc::new(StructuredHealthReporter::new()),
        engine: Arc::new(ReferenceEngine),
        shutdown: SystemShutdownSignal,
    })
}

/// Runs the daemon with injected collaborators.
pub(crate) fn run_daemon_with<L, M, S>(plan: LaunchPlan<L, M, S>) -> Result<(), LaunchError>
where
    L: ConfigLoader,
    M: ModelLoader,
    S: ShutdownSignal,
{
    let LaunchPlan {
        loader,
        model_loader,
        reporter,
        engine,
        shutdown,
    } = plan;

    // Configuration and model are resolved before the socket exists, so a
    // bad flag or unreadable model never leaves a port half-open.
    let daemon = bootstrap_with(&loader, reporter.as_ref(), &model_loader)?;
    info!(
        target: PROCESS_TARGET,
        listen = %daemon.config().listen(),
        "starting daemon runtime"
    );

    let listener = SocketListener::bind(daemon.config().listen())?;
    debug!(
        target: PROCESS_TARGET,
        local_addr = %listener.local_addr(),
        "listener bound"
    );
    let handler = Arc::new(RequestConnectionHandler::new(
        Arc::clone(daemon.model()),
        engine,
    ));
    let listener_handle = listener.start(handler)?;
    reporter.listener_ready(listener_handle.local_addr());

    shutdown.wait()?;
    listener_handle.shutdown();
    listener_handle.join()?;
    info!(
        target: PROCESS_TARGET,
        "shutdown sequence completed"
    );
    Ok(())
}
