//! Decode dispatch.
//!
//! A validated request is decoded unit by unit: the input factory yields
//! units from the matched file until it is exhausted, the decoder turns each
//! unit into an n-best list, and the sinks persist the results. The pieces
//! meet at the [`InputFactory`], [`Decoder`] and [`HypothesisSink`] traits so
//! the supervisor only depends on a [`DecodeEngine`].

mod decoder;
mod errors;
mod input;
mod output;

use tracing::debug;

use crate::model::{LanguageModel, LoadedModel};
use crate::request::RequestConfig;

pub use self::decoder::{Features, Hypothesis, ReferenceDecoder};
pub use self::errors::DecodeError;
pub use self::input::{Alignment, InputUnit, MatchedInputFactory, SystemLine};
pub use self::output::{ORACLE_SUFFIX, OracleWriter, TopWriter, oracle_path};

const DECODE_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::decode");

/// Produces input units until the matched input is exhausted.
pub trait InputFactory {
    /// Returns the next unit, or `None` once input is exhausted.
    fn next_unit(&mut self) -> Result<Option<InputUnit>, DecodeError>;
}

/// Turns one input unit into an n-best list, best first.
pub trait Decoder {
    fn decode(&self, unit: &InputUnit) -> Vec<Hypothesis>;
}

/// Receives decode results.
pub trait HypothesisSink {
    /// Records the n-best list for `unit`.
    fn write(&mut self, unit: &InputUnit, nbest: &[Hypothesis]) -> Result<(), DecodeError>;

    /// Flushes buffered output once every unit has been written.
    fn finish(&mut self) -> Result<(), DecodeError>;
}

/// Outcome of a completed decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeSummary {
    /// Units read from the matched input.
    pub units: usize,
    /// Units for which the decoder produced at least one hypothesis.
    pub decoded: usize,
}

/// Runs a whole request against the shared model.
pub trait DecodeEngine: Send + Sync {
    /// Decodes every unit named by `request`.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] when input cannot be read or output cannot
    /// be written.
    fn run(&self, model: &LoadedModel, request: &RequestConfig)
    -> Result<DecodeSummary, DecodeError>;
}

/// Decodes until the input factory is exhausted.
///
/// Every unit goes to `top`; `oracle` additionally receives it when present.
/// Both sinks are finished once input runs out.
///
/// # Errors
///
/// Stops at the first error raised by the factory or a sink.
pub fn drive(
    input: &mut dyn InputFactory,
    decoder: &dyn Decoder,
    top: &mut dyn HypothesisSink,
    mut oracle: Option<&mut dyn HypothesisSink>,
) -> Result<DecodeSummary, DecodeError> {
    let mut summary = DecodeSummary::default();
    while let Some(unit) = input.next_unit()? {
        let nbest = decoder.decode(&unit);
        summary.units += 1;
        if !nbest.is_empty() {
            summary.decoded += 1;
        }
        top.write(&unit, &nbest)?;
        if let Some(sink) = oracle.as_deref_mut() {
            sink.write(&unit, &nbest)?;
        }
    }
    top.finish()?;
    if let Some(sink) = oracle.as_deref_mut() {
        sink.finish()?;
    }
    Ok(summary)
}

/// Engine wiring the matched-file reader, the reference decoder and the
/// file writers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReferenceEngine;

impl DecodeEngine for ReferenceEngine {
    fn run(
        &self,
        model: &LoadedModel,
        request: &RequestConfig,
    ) -> Result<DecodeSummary, DecodeError> {
        // Input is opened first so a bad path never truncates earlier output.
        let mut input =
            MatchedInputFactory::open(&request.input_matched, &request.input, model.vocabulary())?;
        let decoder = ReferenceDecoder::new(model, &request.decoder);
        let mut top = TopWriter::create(&request.output_one_best)?;
        let mut oracle = if request.oracle_enabled() {
            Some(OracleWriter::create(&request.output_oracle_prefix)?)
        } else {
            None
        };

        let summary = drive(
            &mut input,
            &decoder,
            &mut top,
            oracle
                .as_mut()
                .map(|writer| writer as &mut dyn HypothesisSink),
        )?;
        debug!(
            target: DECODE_TARGET,
            units = summary.units,
            decoded = summary.decoded,
            one_best = %request.output_one_best,
            oracle = request.oracle_enabled(),
            "decode finished"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests;
