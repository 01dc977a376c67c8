//! Errors raised while loading the language model.

use std::io;

use camino::Utf8PathBuf;
use memt_config::LmBackend;
use thiserror::Error;

/// Failures that prevent the language model from loading. All of them are
/// fatal at startup.
#[derive(Debug, Error)]
pub enum ModelLoadError {
    /// The model file could not be opened or read.
    #[error("failed to read {backend} model '{path}': {source}")]
    Io {
        /// Backend that attempted the load.
        backend: LmBackend,
        /// Model file path.
        path: Utf8PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The model file does not follow the backend's format.
    #[error("malformed {backend} model '{path}' at line {line}: {message}")]
    Format {
        /// Backend that attempted the load.
        backend: LmBackend,
        /// Model file path.
        path: Utf8PathBuf,
        /// One-based line number of the offending line.
        line: usize,
        /// Description of the problem.
        message: String,
    },
    /// The model file parsed but yielded no vocabulary.
    #[error("{backend} model '{path}' contains no vocabulary")]
    Empty {
        /// Backend that attempted the load.
        backend: LmBackend,
        /// Model file path.
        path: Utf8PathBuf,
    },
}

impl ModelLoadError {
    pub(crate) fn io(backend: LmBackend, path: &camino::Utf8Path, source: io::Error) -> Self {
        Self::Io {
            backend,
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn format(
        backend: LmBackend,
        path: &camino::Utf8Path,
        line: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::Format {
            backend,
            path: path.to_path_buf(),
            line,
            message: message.into(),
        }
    }

    pub(crate) fn empty(backend: LmBackend, path: &camino::Utf8Path) -> Self {
        Self::Empty {
            backend,
            path: path.to_path_buf(),
        }
    }
}
