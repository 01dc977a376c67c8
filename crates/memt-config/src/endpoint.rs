use std::fmt;

use serde::{Deserialize, Serialize};

use crate::defaults::DEFAULT_HOST;

/// TCP address the daemon listens on.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct ListenEndpoint {
    /// Host name or IP literal to bind.
    pub host: String,
    /// TCP port. Zero asks the operating system for an ephemeral port.
    pub port: u16,
}

impl ListenEndpoint {
    /// Builds an endpoint for the given host and port.
    #[must_use]
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Builds an endpoint bound to every IPv4 interface.
    #[must_use]
    pub fn any(port: u16) -> Self {
        Self::new(DEFAULT_HOST, port)
    }
}

impl fmt::Display for ListenEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "tcp://{}:{}", self.host, self.port)
    }
}
