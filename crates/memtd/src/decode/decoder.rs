//! Reference system-combination scorer.
//!
//! Every system line of a unit is a candidate. Candidates are scored with a
//! weighted sum of four features and the best `output.nbest` are returned.

use std::collections::HashSet;

use serde::Serialize;

use super::{Decoder, InputUnit};
use crate::model::LanguageModel;
use crate::request::DecoderConfig;

/// Raw feature values for one candidate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Features {
    /// Share of tokens found in the model vocabulary.
    pub known_rate: f64,
    /// Confidence mass of aligned systems.
    pub support: f64,
    /// Weighted count of n-grams shared with other systems.
    pub ngram_match: f64,
    /// Tokens that occur anywhere in another system.
    pub overlap: f64,
}

/// A scored candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hypothesis {
    /// Index of the system that produced the candidate.
    pub system: usize,
    /// Candidate text.
    pub text: String,
    /// Weighted feature sum; higher is better.
    pub score: f64,
    /// Unweighted feature values behind `score`.
    pub features: Features,
}

/// Scores candidates against the shared model.
pub struct ReferenceDecoder<'a> {
    model: &'a dyn LanguageModel,
    config: &'a DecoderConfig,
}

impl<'a> ReferenceDecoder<'a> {
    pub fn new(model: &'a dyn LanguageModel, config: &'a DecoderConfig) -> Self {
        Self { model, config }
    }

    fn admitted(&self, unit: &InputUnit) -> Vec<bool> {
        let coverage = &self.config.coverage;
        let best = unit
            .systems
            .iter()
            .map(|line| line.confidence)
            .reduce(f64::max)
            .unwrap_or(0.0);
        unit.systems
            .iter()
            .map(|line| !coverage.use_new || line.confidence >= coverage.stay_threshold * best)
            .collect()
    }

    fn features(&self, unit: &InputUnit, system: usize, admitted: &[bool]) -> Features {
        let Some(line) = unit.systems.get(system) else {
            return Features::default();
        };
        let length = line.tokens.len();
        if length == 0 {
            return Features::default();
        }

        let known = line.ids.iter().filter(|id| id.is_some()).count();
        let support = support(unit, system, admitted);
        let ngram_match = self.ngram_match(unit, system);
        let overlap = overlap(unit, system);

        let scale = if self.config.length_normalize {
            length as f64
        } else {
            1.0
        };
        Features {
            known_rate: known as f64 / length as f64,
            support: support / scale,
            ngram_match: ngram_match / scale,
            overlap: overlap / scale,
        }
    }

    fn ngram_match(&self, unit: &InputUnit, system: usize) -> f64 {
        let Some(line) = unit.systems.get(system) else {
            return 0.0;
        };
        let order = usize::try_from(self.model.order()).unwrap_or(usize::MAX);
        let base = self.config.scorer.ngram_base;

        let longest = order.min(line.tokens.len());
        let mut total = 0.0;
        for n in 1..=longest {
            let others: HashSet<&[String]> = unit
                .systems
                .iter()
                .enumerate()
                .filter(|(other, _)| *other != system)
                .flat_map(|(_, other)| other.tokens.windows(n))
                .collect();
            let shared = line
                .tokens
                .windows(n)
                .filter(|gram| others.contains(gram))
                .count();
            if shared == 0 {
                continue;
            }
            let exponent = i32::try_from(order - n).unwrap_or(i32::MAX);
            total += base.powi(exponent) * shared as f64;
        }
        saturate(total)
    }

    fn score(&self, features: Features) -> f64 {
        let weights = &self.config.scorer;
        weights.lm * features.known_rate
            + weights.alignment * features.support
            + weights.ngram * features.ngram_match
            + weights.overlap * features.overlap
    }
}

impl Decoder for ReferenceDecoder<'_> {
    fn decode(&self, unit: &InputUnit) -> Vec<Hypothesis> {
        let admitted = self.admitted(unit);

        let mut beam: Vec<usize> = (0..unit.systems.len()).collect();
        beam.sort_by(|left, right| {
            let confidence = |index: &usize| unit.systems.get(*index).map_or(0.0, |l| l.confidence);
            confidence(right).total_cmp(&confidence(left))
        });
        beam.truncate(usize::try_from(self.config.internal_beam_size).unwrap_or(usize::MAX));

        let mut hypotheses: Vec<Hypothesis> = beam
            .into_iter()
            .filter_map(|system| {
                let line = unit.systems.get(system)?;
                let features = self.features(unit, system, &admitted);
                Some(Hypothesis {
                    system,
                    text: line.text(),
                    score: self.score(features),
                    features,
                })
            })
            .collect();
        hypotheses.sort_by(|left, right| {
            right
                .score
                .total_cmp(&left.score)
                .then(left.system.cmp(&right.system))
        });
        hypotheses.truncate(usize::try_from(self.config.end_beam_size).unwrap_or(usize::MAX));
        hypotheses
    }
}

/// Keeps extreme `score.ngram_base` values from turning into `inf` or NaN.
fn saturate(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(f64::MIN, f64::MAX)
    }
}

fn support(unit: &InputUnit, system: usize, admitted: &[bool]) -> f64 {
    let Some(line) = unit.systems.get(system) else {
        return 0.0;
    };
    let mut total = 0.0;
    for position in 0..line.tokens.len() {
        let systems: HashSet<usize> = unit
            .aligned(system, position)
            .iter()
            .map(|alignment| alignment.system)
            .filter(|other| admitted.get(*other).copied().unwrap_or(false))
            .collect();
        total += systems
            .into_iter()
            .filter_map(|other| unit.systems.get(other))
            .map(|other| other.confidence)
            .sum::<f64>();
    }
    total
}

fn overlap(unit: &InputUnit, system: usize) -> f64 {
    let Some(line) = unit.systems.get(system) else {
        return 0.0;
    };
    let others: HashSet<&str> = unit
        .systems
        .iter()
        .enumerate()
        .filter(|(other, _)| *other != system)
        .flat_map(|(_, other)| other.tokens.iter().map(String::as_str))
        .collect();
    line.tokens
        .iter()
        .filter(|token| others.contains(token.as_str()))
        .count() as f64
}
