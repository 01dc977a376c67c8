use crate::backend::LmBackend;
use crate::logging::LogFormat;

/// Host the daemon binds when `--host` is omitted: every IPv4 interface.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Language-model backend used when `--lm.type` is omitted.
pub const DEFAULT_BACKEND: LmBackend = LmBackend::Salm;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned log filter value used where allocation is required.
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}
