//! Language models shared read-only by every connection.
//!
//! Exactly one model is loaded per process, chosen by `--lm.type`. The
//! [`LoadedModel`] enum tags which backend was picked; the rest of the
//! pipeline only sees the [`LanguageModel`] capability and never mutates the
//! model after load.

mod arpa;
mod corpus;
mod errors;
mod vocabulary;

use std::fs::File;
use std::io::BufReader;

use memt_config::{LmBackend, LmConfig};

pub use self::arpa::ArpaModel;
pub use self::corpus::CorpusModel;
pub use self::errors::ModelLoadError;
pub use self::vocabulary::{Vocabulary, WordId};

/// Read-only view of a loaded language model.
pub trait LanguageModel: Send + Sync {
    /// Backend that produced the model.
    fn backend(&self) -> LmBackend;

    /// N-gram order requested at startup.
    fn order(&self) -> u32;

    /// Vocabulary used to resolve input tokens.
    fn vocabulary(&self) -> &Vocabulary;
}

/// The process-wide model, tagged by backend.
#[derive(Debug, Clone)]
pub enum LoadedModel {
    /// ARPA n-gram model.
    Sri(ArpaModel),
    /// Corpus-backed model.
    Salm(CorpusModel),
}

impl LanguageModel for LoadedModel {
    fn backend(&self) -> LmBackend {
        match self {
            Self::Sri(model) => model.backend(),
            Self::Salm(model) => model.backend(),
        }
    }

    fn order(&self) -> u32 {
        match self {
            Self::Sri(model) => model.order(),
            Self::Salm(model) => model.order(),
        }
    }

    fn vocabulary(&self) -> &Vocabulary {
        match self {
            Self::Sri(model) => model.vocabulary(),
            Self::Salm(model) => model.vocabulary(),
        }
    }
}

/// Loads the language model named by the startup configuration.
pub trait ModelLoader {
    /// Loads the model. Failures are fatal to the process.
    fn load(&self, config: &LmConfig) -> Result<LoadedModel, ModelLoadError>;
}

/// Loader that reads the model file from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileModelLoader;

impl ModelLoader for FileModelLoader {
    fn load(&self, config: &LmConfig) -> Result<LoadedModel, ModelLoadError> {
        let path = config.file.as_path();
        let file =
            File::open(path).map_err(|source| ModelLoadError::io(config.backend, path, source))?;
        let reader = BufReader::new(file);
        match config.backend {
            LmBackend::Sri => ArpaModel::from_reader(reader, path, config.order).map(LoadedModel::Sri),
            LmBackend::Salm => {
                CorpusModel::from_reader(reader, path, config.order).map(LoadedModel::Salm)
            }
        }
    }
}
