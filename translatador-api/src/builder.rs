//! Model loading

use crate::detect::{detect_language, DetectedLanguage};
use crate::error::{ApiError, Result};
use crate::model::NativeModel;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use translatador_engine::{installed_backend, Backend, EngineError, Model};

/// Entry point of the high-level API
#[derive(Debug, Clone, Copy)]
pub struct Translatador;

impl Translatador {
    /// Builder for a [`NativeModel`]
    pub fn builder() -> ModelBuilder {
        ModelBuilder::default()
    }

    /// Detect the language of `text`
    pub fn detect_language(text: &str) -> Result<Option<DetectedLanguage>> {
        detect_language(text)
    }
}

/// Collects model files and options before loading
#[derive(Default)]
pub struct ModelBuilder {
    config: Option<String>,
    model: Option<Vec<u8>>,
    source_vocab: Option<Vec<u8>>,
    target_vocab: Option<Vec<u8>>,
    short_list: Option<Vec<u8>>,
    backend: Option<Arc<dyn Backend>>,
}

impl ModelBuilder {
    /// TOML model options; defaults apply to every key left out
    pub fn config(mut self, config: impl Into<String>) -> Self {
        self.config = Some(config.into());
        self
    }

    /// Read TOML model options from a file
    pub fn config_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.config(fs::read_to_string(path)?))
    }

    /// Model weights (required)
    pub fn model(mut self, model: impl Into<Vec<u8>>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Read model weights from a file
    pub fn model_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.model(fs::read(path)?))
    }

    /// One vocabulary shared by source and target
    pub fn vocab(self, vocab: impl Into<Vec<u8>>) -> Self {
        let vocab = vocab.into();
        self.vocabs(vocab.clone(), vocab)
    }

    /// Distinct source and target vocabularies
    pub fn vocabs(mut self, source: impl Into<Vec<u8>>, target: impl Into<Vec<u8>>) -> Self {
        self.source_vocab = Some(source.into());
        self.target_vocab = Some(target.into());
        self
    }

    /// Read a shared vocabulary from a file
    pub fn vocab_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.vocab(fs::read(path)?))
    }

    /// Read source and target vocabularies from files
    pub fn vocab_files(self, source: impl AsRef<Path>, target: impl AsRef<Path>) -> Result<Self> {
        let source = fs::read(source)?;
        let target = fs::read(target)?;
        Ok(self.vocabs(source, target))
    }

    /// Short list restricting the output vocabulary (optional)
    pub fn short_list(mut self, short_list: impl Into<Vec<u8>>) -> Self {
        self.short_list = Some(short_list.into());
        self
    }

    /// Read a short list from a file
    pub fn short_list_file(self, path: impl AsRef<Path>) -> Result<Self> {
        Ok(self.short_list(fs::read(path)?))
    }

    /// Engine to load with; the installed backend is used otherwise
    pub fn backend(mut self, backend: Arc<dyn Backend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Load the model
    pub fn load(self) -> Result<NativeModel> {
        let model = self
            .model
            .ok_or_else(|| ApiError::Config("missing translation model binary".to_string()))?;
        let (Some(source), Some(target)) = (self.source_vocab, self.target_vocab) else {
            return Err(ApiError::Config(
                "missing translation model vocabularies".to_string(),
            ));
        };
        let backend = self.backend.or_else(installed_backend).ok_or_else(|| {
            EngineError::ModelLoadError("no translation backend installed".to_string())
        })?;

        let model = Model::create(
            backend,
            self.config.as_deref(),
            &model,
            &source,
            Some(target.as_slice()),
            self.short_list.as_deref(),
        )?;
        Ok(NativeModel::new(model))
    }
}

impl fmt::Debug for ModelBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelBuilder")
            .field("config", &self.config)
            .field("model", &self.model.as_ref().map(Vec::len))
            .field("source_vocab", &self.source_vocab.as_ref().map(Vec::len))
            .field("target_vocab", &self.target_vocab.as_ref().map(Vec::len))
            .field("short_list", &self.short_list.as_ref().map(Vec::len))
            .field("backend", &self.backend.as_ref().map(|b| b.name().to_string()))
            .finish()
    }
}
