//! Corpus-backed models (`lm.type=salm`).

use std::io::BufRead;

use camino::Utf8Path;
use memt_config::LmBackend;

use super::{LanguageModel, ModelLoadError, Vocabulary};

const BACKEND: LmBackend = LmBackend::Salm;

/// Model built over a tokenised training corpus, one sentence per line.
#[derive(Debug, Clone)]
pub struct CorpusModel {
    order: u32,
    vocabulary: Vocabulary,
    sentences: usize,
    tokens: usize,
}

impl CorpusModel {
    /// Reads a whitespace-tokenised corpus.
    ///
    /// # Errors
    ///
    /// Returns [`ModelLoadError::Io`] when reading fails and
    /// [`ModelLoadError::Empty`] when the corpus has no tokens.
    pub fn from_reader<R: BufRead>(
        reader: R,
        path: &Utf8Path,
        order: u32,
    ) -> Result<Self, ModelLoadError> {
        let mut vocabulary = Vocabulary::new();
        let mut sentences = 0;
        let mut tokens = 0;
        for line in reader.lines() {
            let line = line.map_err(|source| ModelLoadError::io(BACKEND, path, source))?;
            let mut words = line.split_whitespace().peekable();
            if words.peek().is_none() {
                continue;
            }
            sentences += 1;
            for word in words {
                vocabulary.insert(word);
                tokens += 1;
            }
        }
        if tokens == 0 {
            return Err(ModelLoadError::empty(BACKEND, path));
        }
        Ok(Self {
            order,
            vocabulary,
            sentences,
            tokens,
        })
    }

    /// Number of non-blank corpus lines.
    #[must_use]
    pub fn sentences(&self) -> usize {
        self.sentences
    }

    /// Number of running tokens in the corpus.
    #[must_use]
    pub fn tokens(&self) -> usize {
        self.tokens
    }
}

impl LanguageModel for CorpusModel {
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
