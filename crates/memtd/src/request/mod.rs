//! Per-connection request grammar.
//!
//! A client sends one `key = value` block and half-closes its write side.
//! [`read_block`] drains the stream up to [`MAX_REQUEST_BYTES`] and
//! [`RequestConfig::parse`] turns the bytes into a validated configuration:
//!
//! 1. lex the block and reject keys outside the grammar;
//! 2. check how often each key appears;
//! 3. convert supplied values, falling back to defaults for absent keys;
//! 4. parse the confidence vector;
//! 5. copy the horizon radius into the input configuration.
//!
//! Every failure is a [`RequestError`], which the supervisor reports back to
//! the client before moving on to the next connection.

mod block;
mod confidence;
mod errors;
mod fields;

use std::collections::HashMap;
use std::io::{self, Read};

use camino::Utf8PathBuf;
use serde::Serialize;

pub use self::confidence::ConfidenceVector;
pub use self::errors::RequestError;

/// Largest request body accepted, in bytes.
pub const MAX_REQUEST_BYTES: usize = 1024 * 1024;

/// Feature weights and scoring constants.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScorerWeights {
    /// Language-model weight.
    pub lm: f64,
    /// Alignment support weight.
    pub alignment: f64,
    /// N-gram match weight.
    pub ngram: f64,
    /// Base applied per order below the model order when weighting n-gram
    /// matches.
    pub ngram_base: f64,
    /// Overlap weight.
    pub overlap: f64,
    /// Proportion of scoring weight reserved for fuzzing during tuning.
    pub fuzz_ratio: f64,
}

/// Alignment horizon used while searching.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HorizonConfig {
    /// Window, in tokens, within which alignments count as support.
    pub radius: u32,
    /// Only admit systems whose confidence clears the stay threshold.
    pub use_new: bool,
    /// Fraction of the best confidence a system needs to be admitted.
    pub stay_threshold: f64,
}

/// Parameters handed to the decoder.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DecoderConfig {
    /// Feature weights (`score.*`).
    pub scorer: ScorerWeights,
    /// Candidates considered per unit.
    pub internal_beam_size: u32,
    /// Divide per-token features by candidate length.
    pub length_normalize: bool,
    /// Size of the n-best list returned per unit.
    pub end_beam_size: u32,
    /// Horizon settings (`horizon.*`).
    pub coverage: HorizonConfig,
}

/// Parameters handed to the input factory.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InputConfig {
    /// One confidence per upstream system, in line order.
    pub confidences: ConfidenceVector,
    /// Always equal to `DecoderConfig::coverage.radius`.
    pub horizon_radius: u32,
    /// Keep only the nearest match per other system.
    pub pick_best: bool,
    /// Add matches reached through a third system.
    pub transitive: bool,
}

/// A validated decode request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestConfig {
    /// Input factory settings.
    pub input: InputConfig,
    /// Decoder settings.
    pub decoder: DecoderConfig,
    /// Oracle output prefix; empty disables oracle output.
    pub output_oracle_prefix: String,
    /// File receiving the top hypothesis per unit.
    pub output_one_best: Utf8PathBuf,
    /// Matched input read by the input factory.
    pub input_matched: Utf8PathBuf,
    /// Confidence string exactly as supplied.
    pub confidence_string: String,
}

impl RequestConfig {
    /// Validates a raw request body.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] describing the first problem found.
    pub fn parse(bytes: &[u8]) -> Result<Self, RequestError> {
        if bytes.len() > MAX_REQUEST_BYTES {
            return Err(RequestError::RequestTooLarge {
                max_size: MAX_REQUEST_BYTES,
            });
        }
        let text = std::str::from_utf8(bytes).map_err(|_| RequestError::InvalidEncoding)?;
        Self::parse_block(text)
    }

    /// Validates a request block that is already text.
    ///
    /// # Errors
    ///
    /// Returns a [`RequestError`] describing the first problem found.
    pub fn parse_block(text: &str) -> Result<Self, RequestError> {
        let entries = block::lex(text)?;

        let mut supplied: HashMap<&'static str, Vec<&str>> = HashMap::new();
        for entry in &entries {
            let Some(field) = fields::lookup(&entry.key) else {
                return Err(RequestError::UnknownKey {
                    key: entry.key.clone(),
                    line: entry.line,
                });
            };
            supplied.entry(field.key).or_default().push(entry.value);
        }

        for field in fields::FIELDS {
            let actual = supplied.get(field.key).map_or(0, Vec::len);
            if !field.accepts_count(actual) {
                return Err(RequestError::KeyCount {
                    key: field.key,
                    expected: 1,
                    actual,
                });
            }
        }

        let mut config = Self::default();
        for field in fields::FIELDS {
            let raw = supplied
                .get(field.key)
                .and_then(|values| values.first().copied())
                .or_else(|| field.default_value());
            // Required keys are always supplied once the count check passes.
            let Some(raw) = raw else { continue };
            (field.apply)(&mut config, raw).map_err(|error| RequestError::InvalidValue {
                key: field.key,
                value: raw.to_owned(),
                expected: error.expected,
            })?;
        }

        config.input.confidences = ConfidenceVector::parse(&config.confidence_string)?;
        config.input.horizon_radius = config.decoder.coverage.radius;
        Ok(config)
    }

    /// Returns `true` when oracle output was requested.
    #[must_use]
    pub fn oracle_enabled(&self) -> bool {
        !self.output_oracle_prefix.is_empty()
    }
}

/// Reads a request body until the client closes its write side.
///
/// At most one byte beyond [`MAX_REQUEST_BYTES`] is read, enough for
/// [`RequestConfig::parse`] to detect an oversize body without buffering it.
///
/// # Errors
///
/// Propagates read failures from the stream.
pub fn read_block<R: Read>(reader: R) -> io::Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let limit = u64::try_from(MAX_REQUEST_BYTES).map_or(u64::MAX, |max| max.saturating_add(1));
    reader.take(limit).read_to_end(&mut buffer)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests;
