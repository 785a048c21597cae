//! Translation models
//!
//! A [`TranslationModel`] maps strings of one language to strings of another.
//! Models are shared as [`ModelRef`] handles; [`TranslationModel::fork`]
//! produces a handle that can run concurrently with the original.

use crate::batch::TranslationBatch;
use crate::error::{ApiError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use translatador_core::WrappedString;
use translatador_engine::Model;

/// Shared handle to any translation model
pub type ModelRef = Arc<dyn TranslationModel>;

/// Maps strings of one language into strings of another
pub trait TranslationModel: Send + Sync {
    /// Translate every string of `batch`, in order
    fn translate_batch(&self, batch: &TranslationBatch) -> Result<TranslationBatch>;

    /// Handle that can translate concurrently with this one
    fn fork(&self) -> Result<ModelRef>;

    /// Translate a single string
    fn translate(&self, text: &str) -> Result<String> {
        let out = self.translate_batch(&TranslationBatch::of([text]))?;
        let text = out.texts().next().unwrap_or_default().to_string();
        Ok(text)
    }

    /// Translate plain strings
    fn translate_strings(&self, texts: &[&str]) -> Result<Vec<String>> {
        Ok(self
            .translate_batch(&TranslationBatch::of(texts.iter().copied()))?
            .get())
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityModel;

impl TranslationModel for IdentityModel {
    fn translate_batch(&self, batch: &TranslationBatch) -> Result<TranslationBatch> {
        Ok(batch.plain_copy())
    }

    fn fork(&self) -> Result<ModelRef> {
        Ok(Arc::new(IdentityModel))
    }

    fn translate(&self, text: &str) -> Result<String> {
        Ok(text.to_string())
    }
}

/// A loaded engine model, serialized behind a mutex
#[derive(Debug)]
pub struct NativeModel {
    model: Mutex<Option<Model>>,
}

impl NativeModel {
    /// Wrap a loaded model
    pub fn new(model: Model) -> Self {
        Self {
            model: Mutex::new(Some(model)),
        }
    }

    /// Release the model early; later calls fail with [`ApiError::ModelClosed`]
    pub fn close(&self) {
        if self.lock().take().is_some() {
            log::debug!("closed native model");
        }
    }

    /// Whether [`NativeModel::close`] was called
    pub fn is_closed(&self) -> bool {
        self.lock().is_none()
    }

    /// Take the model back out, if still open
    pub fn into_inner(self) -> Option<Model> {
        self.model.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> MutexGuard<'_, Option<Model>> {
        // translation failures leave the model usable
        self.model.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<Model> for NativeModel {
    fn from(model: Model) -> Self {
        Self::new(model)
    }
}

impl TranslationModel for NativeModel {
    fn translate_batch(&self, batch: &TranslationBatch) -> Result<TranslationBatch> {
        let mut guard = self.lock();
        let model = guard.as_mut().ok_or(ApiError::ModelClosed)?;

        let strings: Vec<&WrappedString> = batch.wrapped().iter().map(Arc::as_ref).collect();
        let results = model.translate(&strings)?;
        Ok(TranslationBatch::from_wrapped(results))
    }

    fn fork(&self) -> Result<ModelRef> {
        let guard = self.lock();
        let model = guard.as_ref().ok_or(ApiError::ModelClosed)?;
        Ok(Arc::new(NativeModel::new(model.try_clone()?)))
    }
}

/// Applies `first`, then `second`
///
/// Intermediate results stay wrapped, so `second` reuses the tokenization
/// produced by `first` when their vocabularies match.
#[derive(Clone)]
pub struct ComposedModel {
    first: ModelRef,
    second: ModelRef,
}

impl ComposedModel {
    /// Compose two models
    pub fn new(first: ModelRef, second: ModelRef) -> Self {
        Self { first, second }
    }
}

impl TranslationModel for ComposedModel {
    fn translate_batch(&self, batch: &TranslationBatch) -> Result<TranslationBatch> {
        let pivot = self.first.translate_batch(batch)?;
        self.second.translate_batch(&pivot)
    }

    fn fork(&self) -> Result<ModelRef> {
        Ok(Arc::new(ComposedModel::new(
            self.first.fork()?,
            self.second.fork()?,
        )))
    }
}

/// `first` followed by `second` through a pivot language
pub fn compose(first: ModelRef, second: ModelRef) -> ModelRef {
    Arc::new(ComposedModel::new(first, second))
}
