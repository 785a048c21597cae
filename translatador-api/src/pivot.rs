//! Many-to-many translation through a pivot language

use crate::batch::TranslationBatch;
use crate::error::Result;
use crate::model::ModelRef;
use std::collections::HashMap;
use std::hash::Hash;

/// Translates from several languages into several languages via a pivot.
///
/// Encoders translate a source language into the pivot; decoders translate
/// the pivot into a target language. The pivot text is produced once per
/// call and shared by every decoder.
pub struct PivotedTranslationModel<A, B> {
    encoders: HashMap<A, ModelRef>,
    decoders: HashMap<B, ModelRef>,
}

impl<A, B> PivotedTranslationModel<A, B>
where
    A: Eq + Hash + Clone,
    B: Eq + Hash + Clone,
{
    /// Create from encoder and decoder maps
    pub fn new(encoders: HashMap<A, ModelRef>, decoders: HashMap<B, ModelRef>) -> Self {
        Self { encoders, decoders }
    }

    /// Languages that can be translated from
    pub fn sources(&self) -> impl Iterator<Item = &A> + '_ {
        self.encoders.keys()
    }

    /// Languages that can be translated into
    pub fn targets(&self) -> impl Iterator<Item = &B> + '_ {
        self.decoders.keys()
    }

    /// Translate `text` from `language` into every target language.
    ///
    /// An unknown source language yields an empty map.
    pub fn translate(&self, language: &A, text: &str) -> Result<HashMap<B, String>> {
        Ok(self
            .translate_batch(language, &TranslationBatch::of([text]))?
            .into_iter()
            .map(|(target, batch)| {
                let text = batch.texts().next().unwrap_or_default().to_string();
                (target, text)
            })
            .collect())
    }

    /// Translate a batch from `language` into every target language.
    ///
    /// An unknown source language yields an empty map.
    pub fn translate_batch(
        &self,
        language: &A,
        batch: &TranslationBatch,
    ) -> Result<HashMap<B, TranslationBatch>> {
        let Some(encoder) = self.encoders.get(language) else {
            return Ok(HashMap::new());
        };

        let pivot = encoder.translate_batch(batch)?;
        self.decoders
            .iter()
            .map(|(target, decoder)| Ok((target.clone(), decoder.translate_batch(&pivot)?)))
            .collect()
    }

    /// Copy whose models can run concurrently with this one's
    pub fn fork(&self) -> Result<Self> {
        Ok(Self {
            encoders: fork_all(&self.encoders)?,
            decoders: fork_all(&self.decoders)?,
        })
    }
}

fn fork_all<K: Eq + Hash + Clone>(models: &HashMap<K, ModelRef>) -> Result<HashMap<K, ModelRef>> {
    models
        .iter()
        .map(|(key, model)| Ok((key.clone(), model.fork()?)))
        .collect()
}
