//! Word to dense-id mapping shared by the model and the input factory.

use std::collections::HashMap;

/// Dense identifier of a vocabulary entry.
pub type WordId = u32;

/// Vocabulary of a loaded language model.
///
/// Ids are assigned in insertion order starting from zero and never change
/// once assigned.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    ids: HashMap<String, WordId>,
    words: Vec<String>,
}

impl Vocabulary {
    /// Creates an empty vocabulary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the id for `word`, assigning the next free id if needed.
    pub fn insert(&mut self, word: &str) -> WordId {
        if let Some(id) = self.ids.get(word) {
            return *id;
        }
        let id = WordId::try_from(self.words.len()).unwrap_or(WordId::MAX);
        self.ids.insert(word.to_owned(), id);
        self.words.push(word.to_owned());
        id
    }

    /// Looks up the id of `word`.
    #[must_use]
    pub fn index(&self, word: &str) -> Option<WordId> {
        self.ids.get(word).copied()
    }

    /// Returns the surface form for `id`.
    #[must_use]
    pub fn word(&self, id: WordId) -> Option<&str> {
        self.words.get(id as usize).map(String::as_str)
    }

    /// Number of distinct words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Returns `true` when no word has been inserted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Vocabulary {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut vocabulary = Self::new();
        for word in iter {
            vocabulary.insert(word.as_ref());
        }
        vocabulary
    }
}
