//! Batches of strings passed between models

use std::fmt;
use std::sync::Arc;
use translatador_core::WrappedString;

/// Strings to translate, possibly carrying tokenization from a previous model.
///
/// Keeping text inside a batch while it flows through several models lets
/// each model reuse the tokenization the previous one produced.
#[derive(Debug, Clone, Default)]
pub struct TranslationBatch {
    strings: Vec<Arc<WrappedString>>,
}

impl TranslationBatch {
    /// Batch of plain strings
    pub fn of<I, S>(strings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            strings: strings
                .into_iter()
                .map(|s| Arc::new(WrappedString::from(s.into())))
                .collect(),
        }
    }

    /// Batch of already wrapped strings
    pub fn from_wrapped(strings: Vec<WrappedString>) -> Self {
        Self {
            strings: strings.into_iter().map(Arc::new).collect(),
        }
    }

    /// Copy of the text without any cached tokenization
    pub fn plain_copy(&self) -> Self {
        Self::of(self.texts())
    }

    /// Resolved strings
    pub fn get(&self) -> Vec<String> {
        self.texts().map(str::to_string).collect()
    }

    /// Borrowed text of every string
    pub fn texts(&self) -> impl Iterator<Item = &str> + '_ {
        self.strings.iter().map(|s| s.text())
    }

    /// Wrapped strings, with their caches
    pub fn wrapped(&self) -> &[Arc<WrappedString>] {
        &self.strings
    }

    /// Number of strings
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Whether the batch holds no strings
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl fmt::Display for TranslationBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.texts()).finish()
    }
}
