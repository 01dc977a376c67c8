//! Matched input reader.
//!
//! The matched file holds one unit per paragraph: a line per upstream system,
//! in the same order as the confidence vector, with units separated by blank
//! lines. Each unit is tokenised, resolved against the model vocabulary and
//! aligned across systems before it reaches the decoder.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines};

use camino::{Utf8Path, Utf8PathBuf};

use super::{DecodeError, InputFactory};
use crate::model::{Vocabulary, WordId};
use crate::request::InputConfig;

/// One system's output for a unit.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemLine {
    /// Whitespace-separated tokens of the line.
    pub tokens: Vec<String>,
    /// Vocabulary id per token; `None` for out-of-vocabulary words.
    pub ids: Vec<Option<WordId>>,
    /// Confidence assigned to the producing system.
    pub confidence: f64,
}

impl SystemLine {
    /// Rebuilds the line as space-separated text.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// A token in another system aligned to the token under consideration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    /// Index of the other system.
    pub system: usize,
    /// Token position within that system's line.
    pub position: usize,
}

/// A unit ready for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct InputUnit {
    /// Zero-based unit index within the matched file.
    pub index: usize,
    /// One line per upstream system, ordered like the confidence vector.
    pub systems: Vec<SystemLine>,
    alignments: Vec<Vec<Vec<Alignment>>>,
}

impl InputUnit {
    /// Builds a unit with no cross-system alignments.
    #[must_use]
    pub fn new(index: usize, systems: Vec<SystemLine>) -> Self {
        Self {
            index,
            systems,
            alignments: Vec::new(),
        }
    }

    /// Attaches alignments indexed by system, then token position.
    #[must_use]
    pub fn with_alignments(mut self, alignments: Vec<Vec<Vec<Alignment>>>) -> Self {
        self.alignments = alignments;
        self
    }

    /// Tokens in other systems aligned to `position` of `system`.
    #[must_use]
    pub fn aligned(&self, system: usize, position: usize) -> &[Alignment] {
        self.alignments
            .get(system)
            .and_then(|tokens| tokens.get(position))
            .map_or(&[][..], Vec::as_slice)
    }
}

/// Reads units from a matched file.
pub struct MatchedInputFactory<'a, R> {
    lines: Lines<R>,
    path: Utf8PathBuf,
    config: &'a InputConfig,
    vocabulary: &'a Vocabulary,
    next_index: usize,
}

impl<'a> MatchedInputFactory<'a, BufReader<File>> {
    /// Opens the matched file named by a request.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::OpenInput`] when the file cannot be opened.
    pub fn open(
        path: &Utf8Path,
        config: &'a InputConfig,
        vocabulary: &'a Vocabulary,
    ) -> Result<Self, DecodeError> {
        let file = File::open(path).map_err(|source| DecodeError::OpenInput {
            path: path.to_owned(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file), path, config, vocabulary))
    }
}

impl<'a, R: BufRead> MatchedInputFactory<'a, R> {
    /// Wraps an already opened reader; `path` is only used in diagnostics.
    pub fn from_reader(
        reader: R,
        path: &Utf8Path,
        config: &'a InputConfig,
        vocabulary: &'a Vocabulary,
    ) -> Self {
        Self {
            lines: reader.lines(),
            path: path.to_owned(),
            config,
            vocabulary,
            next_index: 0,
        }
    }

    fn read_paragraph(&mut self) -> Result<Vec<String>, DecodeError> {
        let mut paragraph = Vec::new();
        for line in self.lines.by_ref() {
            let line = line.map_err(|source| DecodeError::Read {
                path: self.path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                if paragraph.is_empty() {
                    continue;
                }
                break;
            }
            paragraph.push(line);
        }
        Ok(paragraph)
    }

    fn resolve(&self, line: &str, confidence: f64) -> SystemLine {
        let tokens: Vec<String> = line.split_whitespace().map(str::to_owned).collect();
        let ids = tokens
            .iter()
            .map(|token| self.vocabulary.index(token))
            .collect();
        SystemLine {
            tokens,
            ids,
            confidence,
        }
    }
}

impl<R: BufRead> InputFactory for MatchedInputFactory<'_, R> {
    fn next_unit(&mut self) -> Result<Option<InputUnit>, DecodeError> {
        let paragraph = self.read_paragraph()?;
        if paragraph.is_empty() {
            return Ok(None);
        }

        let index = self.next_index;
        self.next_index += 1;
        let confidences = self.config.confidences.as_slice();
        if paragraph.len() != confidences.len() {
            return Err(DecodeError::InputShape {
                unit: index,
                expected: confidences.len(),
                actual: paragraph.len(),
            });
        }

        let systems: Vec<SystemLine> = paragraph
            .iter()
            .zip(confidences)
            .map(|(line, confidence)| self.resolve(line, *confidence))
            .collect();
        let alignments = align(&systems, self.config);
        Ok(Some(InputUnit::new(index, systems).with_alignments(alignments)))
    }
}

fn align(systems: &[SystemLine], config: &InputConfig) -> Vec<Vec<Vec<Alignment>>> {
    let radius = usize::try_from(config.horizon_radius).unwrap_or(usize::MAX);
    let direct: Vec<Vec<Vec<Alignment>>> = systems
        .iter()
        .enumerate()
        .map(|(system, line)| {
            (0..line.tokens.len())
                .map(|position| direct_matches(systems, system, position, radius, config.pick_best))
                .collect()
        })
        .collect();

    if !config.transitive {
        return direct;
    }

    let mut closed = direct.clone();
    for (system, tokens) in direct.iter().enumerate() {
        for (position, matches) in tokens.iter().enumerate() {
            for hop in matches {
                let onward = direct
                    .get(hop.system)
                    .and_then(|tokens| tokens.get(hop.position))
                    .map_or(&[][..], Vec::as_slice);
                for target in onward {
                    if target.system == system {
                        continue;
                    }
                    let Some(entry) = closed.get_mut(system).and_then(|t| t.get_mut(position))
                    else {
                        continue;
                    };
                    let known = if config.pick_best {
                        entry.iter().any(|found| found.system == target.system)
                    } else {
                        entry.contains(target)
                    };
                    if !known {
                        entry.push(*target);
                    }
                }
            }
        }
    }
    closed
}

fn direct_matches(
    systems: &[SystemLine],
    system: usize,
    position: usize,
    radius: usize,
    pick_best: bool,
) -> Vec<Alignment> {
    let Some(word) = systems
        .get(system)
        .and_then(|line| line.tokens.get(position))
    else {
        return Vec::new();
    };

    let mut matches = Vec::new();
    for (other, line) in systems.iter().enumerate() {
        if other == system {
            continue;
        }
        let candidates = line
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, token)| *token == word)
            .map(|(found, _)| found)
            .filter(|found| found.abs_diff(position) <= radius);
        if pick_best {
            if let Some(nearest) = candidates.min_by_key(|found| found.abs_diff(position)) {
                matches.push(Alignment {
                    system: other,
                    position: nearest,
                });
            }
        } else {
            matches.extend(candidates.map(|found| Alignment {
                system: other,
                position: found,
            }));
        }
    }
    matches
}
