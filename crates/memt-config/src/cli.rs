//! Command-line grammar for the daemon.
//!
//! Every flag is collected with [`ArgAction::Append`] so that repeated flags
//! reach the configurator intact. Cardinality is then checked by
//! [`crate::ServiceConfig`] rather than by clap, which keeps the diagnostics
//! for "missing" and "given twice" identical in shape.

use clap::{ArgAction, Parser};

/// Raw startup arguments before cardinality and value validation.
#[derive(Parser, Debug, Default)]
#[command(
    name = "memtd",
    version,
    about = "Serves system-combination decode requests over TCP"
)]
pub(crate) struct StartupArgs {
    /// Language model type: sri or salm.
    #[arg(long = "lm.type", value_name = "TYPE", action = ArgAction::Append)]
    pub(crate) lm_type: Vec<String>,
    /// File for the language model.
    #[arg(long = "lm.file", value_name = "PATH", action = ArgAction::Append)]
    pub(crate) lm_file: Vec<String>,
    /// Order of the language model.
    #[arg(long = "lm.order", value_name = "ORDER", action = ArgAction::Append)]
    pub(crate) lm_order: Vec<u32>,
    /// TCP port to accept requests on.
    #[arg(long, value_name = "PORT", action = ArgAction::Append)]
    pub(crate) port: Vec<u16>,
    /// Host or IP address to bind.
    #[arg(long, value_name = "HOST", action = ArgAction::Append)]
    pub(crate) host: Vec<String>,
    /// Tracing filter expression.
    #[arg(long = "log-filter", value_name = "FILTER", action = ArgAction::Append)]
    pub(crate) log_filter: Vec<String>,
    /// Log output format: json or compact.
    #[arg(long = "log-format", value_name = "FORMAT", action = ArgAction::Append)]
    pub(crate) log_format: Vec<String>,
}
