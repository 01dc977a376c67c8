//! Language-model backend selection.
//!
//! The daemon links two interchangeable language-model implementations and
//! picks exactly one of them at startup from `--lm.type`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Language-model implementations the daemon can load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LmBackend {
    /// ARPA n-gram model as produced by the SRI toolkit.
    Sri,
    /// Suffix-array model built over a tokenised training corpus.
    Salm,
}

impl LmBackend {
    /// Returns the name accepted by `--lm.type`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sri => "sri",
            Self::Salm => "salm",
        }
    }
}

impl fmt::Display for LmBackend {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Error returned when `--lm.type` names neither backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("lm.type \"{0}\" is not sri or salm.")]
pub struct BackendParseError(String);

impl BackendParseError {
    /// Creates a parse error describing the unsupported value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the offending value that could not be parsed.
    #[must_use]
    pub fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl FromStr for LmBackend {
    type Err = BackendParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "sri" => Ok(Self::Sri),
            "salm" => Ok(Self::Salm),
            other => Err(BackendParseError::new(other)),
        }
    }
}
