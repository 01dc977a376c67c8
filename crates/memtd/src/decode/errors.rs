//! Error types raised while driving a decode.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;

/// Failures while reading matched input or writing decode output.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The matched input file could not be opened.
    #[error("failed to open matched input {path}: {source}")]
    OpenInput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// An output file could not be created.
    #[error("failed to create output {path}: {source}")]
    CreateOutput {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading the matched input failed part way.
    #[error("failed to read matched input {path}: {source}")]
    Read {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// Writing or flushing an output file failed.
    #[error("failed to write output {path}: {source}")]
    Write {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },
    /// A unit's system count disagrees with the confidence vector.
    #[error("input unit {unit} has {actual} system line(s), expected {expected}")]
    InputShape {
        /// Zero-based unit index.
        unit: usize,
        /// Number of confidences in the request.
        expected: usize,
        /// Lines found in the unit.
        actual: usize,
    },
}
