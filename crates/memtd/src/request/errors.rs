//! Validation failures for a single request.
//!
//! Every variant here is recoverable: the supervisor writes the diagnostic
//! back to the client and keeps serving. Anything that is not a
//! [`RequestError`] belongs to the unexpected family handled by the outer
//! connection boundary.

use thiserror::Error;

/// Reasons a request block is rejected before decoding starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request body exceeded the size limit.
    #[error("request exceeds the {max_size} byte limit")]
    RequestTooLarge {
        /// Maximum accepted body size in bytes.
        max_size: usize,
    },

    /// The request body is not UTF-8 text.
    #[error("request is not valid UTF-8")]
    InvalidEncoding,

    /// A non-blank line is neither a section header nor an assignment.
    #[error("line {line}: expected 'key = value', got '{content}'")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// Offending line with comments stripped.
        content: String,
    },

    /// An assignment named a key outside the request grammar.
    #[error("line {line}: unrecognised option '{key}'")]
    UnknownKey {
        /// Fully qualified key, including any section prefix.
        key: String,
        /// One-based line number.
        line: usize,
    },

    /// A key appeared the wrong number of times.
    #[error("expected {key} {expected} time(s), got it {actual}")]
    KeyCount {
        /// Offending key.
        key: &'static str,
        /// Required number of occurrences.
        expected: usize,
        /// Number of occurrences found.
        actual: usize,
    },

    /// A value could not be converted to the key's type.
    #[error("invalid value '{value}' for {key}: expected {expected}")]
    InvalidValue {
        /// Offending key.
        key: &'static str,
        /// Raw value as supplied.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },

    /// The confidence string did not consist solely of numbers.
    #[error("bad confidence string '{provided}'")]
    BadConfidence {
        /// Raw confidence string as supplied.
        provided: String,
    },
}

impl RequestError {
    /// Key the error refers to, when it concerns a single key.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::UnknownKey { key, .. } => Some(key.as_str()),
            Self::KeyCount { key, .. } | Self::InvalidValue { key, .. } => Some(*key),
            Self::BadConfidence { .. } => Some("input.confidence"),
            Self::RequestTooLarge { .. } | Self::InvalidEncoding | Self::MalformedLine { .. } => {
                None
            }
        }
    }
}
