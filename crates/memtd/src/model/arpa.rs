//! ARPA n-gram models (`lm.type=sri`).

use std::io::BufRead;

use camino::Utf8Path;
use memt_config::LmBackend;

use super::{LanguageModel, ModelLoadError, Vocabulary};

const BACKEND: LmBackend = LmBackend::Sri;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Data,
    Grams(usize),
    End,
}

/// Back-off n-gram model read from an ARPA file.
#[derive(Debug, Clone)]
pub struct ArpaModel {
    order: u32,
    vocabulary: Vocabulary,
    declared_counts: Vec<usize>,
}

impl ArpaModel {
    /// Parses an ARPA file.
    ///
    /// Only the unigram section contributes to the vocabulary; higher-order
    /// sections are validated for shape but not retained.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError::Format`] for structural problems, including a
    /// `\data\` section that declares no order,
    /// [`ModelLoadError::Io`] when reading fails, and
    /// [`ModelLoadError::Empty`] when no unigrams are present.
    pub fn from_reader<R: BufRead>(
        reader: R,
        path: &Utf8Path,
        order: u32,
    ) -> Result<Self, ModelLoadError> {
        let mut section = Section::Preamble;
        let mut vocabulary = Vocabulary::new();
        let mut declared_counts = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let number = index + 1;
            let line = line.map_err(|source| ModelLoadError::io(BACKEND, path, source))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with('\\') {
                section = next_section(section, line)
                    .ok_or_else(|| ModelLoadError::format(BACKEND, path, number, line))?;
                continue;
            }

            match section {
                Section::Preamble | Section::End => {}
                Section::Data => {
                    declared_counts.push(parse_count_line(line).ok_or_else(|| {
                        ModelLoadError::format(BACKEND, path, number, "expected 'ngram N=count'")
                    })?);
                }
                Section::Grams(n) => {
                    let word = parse_gram_line(line, n).ok_or_else(|| {
                        ModelLoadError::format(
                            BACKEND,
                            path,
                            number,
                            format!("expected log probability followed by {n} word(s)"),
                        )
                    })?;
                    if let Some(word) = word {
                        vocabulary.insert(word);
                    }
                }
            }
        }

        if section == Section::Preamble {
            return Err(ModelLoadError::format(BACKEND, path, 0, "missing \\data\\ header"));
        }
        if declared_counts.is_empty() {
            return Err(ModelLoadError::format(
                BACKEND,
                path,
                0,
                "\\data\\ declares no 'ngram N=count' lines",
            ));
        }
        if vocabulary.is_empty() {
            return Err(ModelLoadError::empty(BACKEND, path));
        }

        Ok(Self {
            order,
            vocabulary,
            declared_counts,
        })
    }

    /// Highest n-gram order the file declares in its `\data\` section.
    #[must_use]
    pub fn declared_order(&self) -> usize {
        self.declared_counts.len()
    }
}

impl LanguageModel for ArpaModel {
    fn backend(&self) -> LmBackend {
        BACKEND
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }
}

fn next_section(current: Section, header: &str) -> Option<Section> {
    if header == "\\data\\" {
        return (current == Section::Preamble).then_some(Section::Data);
    }
    if current == Section::Preamble {
        return Some(Section::Preamble);
    }
    if header == "\\end\\" {
        return Some(Section::End);
    }
    let order = header
        .strip_prefix('\\')?
        .strip_suffix("-grams:")?
        .parse::<usize>()
        .ok()?;
    (order >= 1).then_some(Section::Grams(order))
}

fn parse_count_line(line: &str) -> Option<usize> {
    let (_, count) = line.strip_prefix("ngram")?.split_once('=')?;
    count.trim().parse().ok()
}

/// Returns the unigram surface form for order-one lines and `None` for higher
/// orders. Malformed lines yield the outer `None`.
fn parse_gram_line(line: &str, order: usize) -> Option<Option<&str>> {
    let mut fields = line.split_whitespace();
    fields.next()?.parse::<f64>().ok()?;
    let words: Vec<&str> = fields.by_ref().take(order).collect();
    if words.len() != order {
        return None;
    }
    Some(if order == 1 { words.first().copied() } else { None })
}
