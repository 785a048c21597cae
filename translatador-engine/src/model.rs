//! Model lifecycle and translation
//!
//! A [`Model`] pairs immutable, shareable [`ModelData`] with an exclusively
//! owned inference context. Cloning a model shares the data and builds a new
//! context, so clones can translate concurrently.

use crate::backend::{Backend, InferenceContext, ShortListGenerator, CPU_DEVICE};
use crate::error::{EngineError, Result};
use crate::memory::{AlignedMemory, MODEL_ALIGNMENT, VOCABULARY_ALIGNMENT};
use crate::options::ModelOptions;
use crate::runtime;
use std::fmt;
use std::sync::Arc;
use translatador_core::{
    Batch, CoreError, SentenceSplitter, VocabularyRef, WordId, WrappedString,
};

/// Everything a model shares between its clones.
///
/// Fields drop in declaration order: the short-list generator goes before
/// the buffer it was built from.
pub struct ModelData {
    short_list: Option<Arc<dyn ShortListGenerator>>,
    source_vocabulary: VocabularyRef,
    target_vocabulary: VocabularyRef,
    options: ModelOptions,
    splitter: SentenceSplitter,
    weights: Option<Arc<AlignedMemory>>,
    short_list_memory: Option<Arc<AlignedMemory>>,
    vocabulary_memory: Vec<Arc<AlignedMemory>>,
    backend: Arc<dyn Backend>,
}

impl ModelData {
    /// Parsed options
    pub fn options(&self) -> &ModelOptions {
        &self.options
    }

    /// Aligned copy of the weights
    pub fn weights(&self) -> Option<&Arc<AlignedMemory>> {
        self.weights.as_ref()
    }

    /// Vocabulary of the input language
    pub fn source_vocabulary(&self) -> &VocabularyRef {
        &self.source_vocabulary
    }

    /// Vocabulary of the output language; may be the source vocabulary itself
    pub fn target_vocabulary(&self) -> &VocabularyRef {
        &self.target_vocabulary
    }

    /// Whether source and target share one vocabulary
    pub fn shares_vocabulary(&self) -> bool {
        translatador_core::same_vocabulary(&self.source_vocabulary, &self.target_vocabulary)
    }

    /// Short-list generator, when a short list was supplied
    pub fn short_list(&self) -> Option<&Arc<dyn ShortListGenerator>> {
        self.short_list.as_ref()
    }

    /// Aligned copy of the short list
    pub fn short_list_memory(&self) -> Option<&Arc<AlignedMemory>> {
        self.short_list_memory.as_ref()
    }

    /// Aligned copies of the vocabularies, source first
    pub fn vocabulary_memory(&self) -> &[Arc<AlignedMemory>] {
        &self.vocabulary_memory
    }

    /// Splitter configured from the options
    pub fn splitter(&self) -> &SentenceSplitter {
        &self.splitter
    }

    /// Engine that built this model
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }
}

impl fmt::Debug for ModelData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelData")
            .field("backend", &self.backend.name())
            .field("options", &self.options)
            .field("weights", &self.weights)
            .field("shares_vocabulary", &self.shares_vocabulary())
            .field("short_list", &self.short_list.is_some())
            .finish()
    }
}

/// A loaded translation model
pub struct Model {
    // dropped before the shared data
    context: Box<dyn InferenceContext>,
    data: Arc<ModelData>,
}

impl Model {
    /// Load a model from in-memory buffers.
    ///
    /// Every buffer is copied; the caller may release its own afterwards.
    /// The target vocabulary defaults to the source vocabulary when absent
    /// or byte-identical to it.
    pub fn create(
        backend: Arc<dyn Backend>,
        config: Option<&str>,
        model: &[u8],
        source_vocabulary: &[u8],
        target_vocabulary: Option<&[u8]>,
        short_list: Option<&[u8]>,
    ) -> Result<Self> {
        runtime::initialize(&backend).map_err(|e| e.into_load_error("initialization"))?;

        let options = ModelOptions::parse(config)?;
        let weights = AlignedMemory::copy_from(model, MODEL_ALIGNMENT).map(Arc::new);

        let source_memory = AlignedMemory::copy_from(source_vocabulary, VOCABULARY_ALIGNMENT)
            .map(Arc::new)
            .ok_or_else(|| EngineError::ModelLoadError("source vocabulary is empty".to_string()))?;
        let source = backend
            .load_vocabulary(source_memory.clone())
            .map_err(|e| e.into_load_error("source vocabulary"))?;
        let mut vocabulary_memory = vec![source_memory];

        let target = match target_vocabulary {
            Some(bytes) if !bytes.is_empty() && bytes != source_vocabulary => {
                let memory = AlignedMemory::copy_from(bytes, VOCABULARY_ALIGNMENT)
                    .map(Arc::new)
                    .ok_or_else(|| {
                        EngineError::ModelLoadError("target vocabulary is empty".to_string())
                    })?;
                let target = backend
                    .load_vocabulary(memory.clone())
                    .map_err(|e| e.into_load_error("target vocabulary"))?;
                vocabulary_memory.push(memory);
                target
            }
            _ => source.clone(),
        };

        let short_list_memory = short_list
            .and_then(|bytes| AlignedMemory::copy_from(bytes, VOCABULARY_ALIGNMENT))
            .map(Arc::new);
        let short_list = match &short_list_memory {
            Some(memory) => Some(
                backend
                    .load_short_list(memory.clone(), &source, &target)
                    .map_err(|e| e.into_load_error("short list"))?,
            ),
            None => None,
        };

        let data = Arc::new(ModelData {
            short_list,
            source_vocabulary: source,
            target_vocabulary: target,
            splitter: options.splitter(),
            options,
            weights,
            short_list_memory,
            vocabulary_memory,
            backend,
        });

        let context = data
            .backend
            .create_context(&data, CPU_DEVICE)
            .map_err(|e| e.into_load_error("weights"))?;

        log::info!(
            "loaded model on backend '{}' ({} weight bytes, {} vocabularies, short list: {})",
            data.backend.name(),
            data.weights.as_ref().map_or(0, |w| w.len()),
            data.vocabulary_memory.len(),
            data.short_list.is_some()
        );

        Ok(Self { context, data })
    }

    /// A second model sharing this one's data with its own inference context
    pub fn try_clone(&self) -> Result<Self> {
        let context = self
            .data
            .backend
            .create_context(&self.data, CPU_DEVICE)
            .map_err(|e| e.into_load_error("inference context"))?;
        log::info!("cloned model on backend '{}'", self.data.backend.name());

        Ok(Self {
            context,
            data: self.data.clone(),
        })
    }

    /// Shared model data
    pub fn data(&self) -> &Arc<ModelData> {
        &self.data
    }

    /// Parsed options
    pub fn options(&self) -> &ModelOptions {
        &self.data.options
    }

    /// Translate every string, returning results in input order.
    ///
    /// Results carry their tokenization for the target vocabulary, so they
    /// can be fed straight into another model. On failure nothing is returned
    /// and the model remains usable.
    pub fn translate(&mut self, strings: &[&WrappedString]) -> Result<Vec<WrappedString>> {
        let data = &self.data;
        let options = &data.options;

        let tokenized = strings
            .iter()
            .map(|string| {
                string.get_tokenized(
                    &data.source_vocabulary,
                    options.max_length_break,
                    options.ssplit_mode,
                    &data.splitter,
                )
            })
            .collect::<translatador_core::Result<Vec<_>>>()?;

        let batch = Batch::assemble(tokenized, &data.source_vocabulary, options.mini_batch_words);

        let mut best: Vec<Vec<WordId>> = Vec::with_capacity(batch.segment_total());
        for sub in batch.sub_batches() {
            let histories = self.context.search(sub)?;
            if histories.len() != sub.batch_size() {
                return Err(CoreError::ResultCountMismatch {
                    expected: sub.batch_size(),
                    actual: histories.len(),
                }
                .into());
            }
            for (history, &segment) in histories.into_iter().zip(sub.segment_ids()) {
                let hypothesis = history
                    .into_best()
                    .ok_or(CoreError::EmptyHistory { segment })?;
                best.push(hypothesis.words);
            }
        }

        let decoded = batch.decode(&data.target_vocabulary, &best)?;
        log::debug!(
            "translated {} strings ({} segments in {} engine calls)",
            strings.len(),
            batch.segment_total(),
            batch.sub_batches().len()
        );

        Ok(decoded
            .into_iter()
            .map(|target| WrappedString::from_tokenized(Arc::new(target)))
            .collect())
    }

    /// Translate plain strings
    pub fn translate_text(&mut self, texts: &[&str]) -> Result<Vec<String>> {
        let strings: Vec<WrappedString> = texts.iter().map(|&text| WrappedString::from(text)).collect();
        let refs: Vec<&WrappedString> = strings.iter().collect();
        Ok(self
            .translate(&refs)?
            .iter()
            .map(|result| result.text().to_string())
            .collect())
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model").field("data", &self.data).finish()
    }
}
