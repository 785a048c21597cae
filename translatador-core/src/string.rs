//! Wrapped strings with a single-slot tokenization cache

use crate::error::Result;
use crate::split::{SentenceSplitter, SplitMode};
use crate::tokenize::{tokenize, TokenizationParameters, TokenizedString};
use crate::vocab::VocabularyRef;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Either plain text or text that already carries a tokenization
#[derive(Debug, Clone)]
pub enum StringContent {
    /// Text with no tokenization yet
    Plain(Arc<str>),
    /// Text with the most recent tokenization
    Tokenized(Arc<TokenizedString>),
}

impl StringContent {
    /// Display text, whichever variant holds it
    pub fn text(&self) -> &str {
        match self {
            StringContent::Plain(text) => text,
            StringContent::Tokenized(tokenized) => tokenized.plain(),
        }
    }

    /// Cached tokenization, if any
    pub fn tokenized(&self) -> Option<&Arc<TokenizedString>> {
        match self {
            StringContent::Plain(_) => None,
            StringContent::Tokenized(tokenized) => Some(tokenized),
        }
    }
}

/// A string that can be translated, possibly several times.
///
/// The text never changes. The tokenization cache is replaced whenever a
/// caller asks for different parameters; the last request wins.
#[derive(Debug)]
pub struct WrappedString {
    text: Arc<str>,
    content: Mutex<StringContent>,
}

impl WrappedString {
    /// Wrap plain text
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        let text = text.into();
        Self {
            content: Mutex::new(StringContent::Plain(text.clone())),
            text,
        }
    }

    /// Wrap a tokenized string, keeping its tokenization cached
    pub fn from_tokenized(tokenized: Arc<TokenizedString>) -> Self {
        Self {
            text: tokenized.shared_plain(),
            content: Mutex::new(StringContent::Tokenized(tokenized)),
        }
    }

    /// The text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Snapshot of the current content
    pub fn content(&self) -> StringContent {
        self.lock().clone()
    }

    /// Currently cached tokenization, if any
    pub fn cached(&self) -> Option<Arc<TokenizedString>> {
        self.lock().tokenized().cloned()
    }

    /// Tokenization for the given parameters, reusing the cache on an exact match
    pub fn get_tokenized(
        &self,
        vocabulary: &VocabularyRef,
        max_segment_length: usize,
        split_mode: SplitMode,
        splitter: &SentenceSplitter,
    ) -> Result<Arc<TokenizedString>> {
        let parameters =
            TokenizationParameters::new(vocabulary.clone(), max_segment_length, split_mode)?;
        Ok(self.tokenized_with(parameters, splitter))
    }

    /// Tokenization for prebuilt parameters, reusing the cache on an exact match.
    ///
    /// The cached entry is reused only if it was split by rules equal to
    /// `splitter`'s, or was assembled from parts without a splitter.
    pub fn tokenized_with(
        &self,
        parameters: TokenizationParameters,
        splitter: &SentenceSplitter,
    ) -> Arc<TokenizedString> {
        let mut content = self.lock();
        if let Some(cached) = content.tokenized() {
            if cached.is_tokenized_with(&parameters) && cached.is_split_by(splitter) {
                return cached.clone();
            }
        }

        let tokenized = Arc::new(tokenize(self.text.clone(), parameters, splitter));
        *content = StringContent::Tokenized(tokenized.clone());
        tokenized
    }

    // The cache is always left consistent, so a poisoned lock is still usable
    fn lock(&self) -> MutexGuard<'_, StringContent> {
        self.content.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl From<&str> for WrappedString {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for WrappedString {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vocab::{DecodedText, Vocabulary, WordId};
    use std::ops::Range;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    impl Vocabulary for Counting {
        fn encode_with_byte_ranges(&self, text: &str) -> Vec<(WordId, Range<usize>)> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if text.is_empty() {
                Vec::new()
            } else {
                vec![(1, 0..text.len())]
            }
        }

        fn decode_with_byte_ranges(&self, _words: &[WordId]) -> DecodedText {
            DecodedText::default()
        }

        fn eos_id(&self) -> WordId {
            0
        }
    }

    #[test]
    fn test_plain_content() {
        let string = WrappedString::from("Hello.");
        assert_eq!(string.text(), "Hello.");
        assert!(string.cached().is_none());
        assert_eq!(string.content().text(), "Hello.");
    }

    #[test]
    fn test_cache_hit_skips_tokenizer() {
        let counting = Arc::new(Counting::default());
        let vocab: VocabularyRef = counting.clone();
        let splitter = SentenceSplitter::new();
        let string = WrappedString::from("One. Two.");

        let first = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &splitter)
            .unwrap();
        let calls = counting.calls.load(Ordering::SeqCst);
        let second = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &splitter)
            .unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(counting.calls.load(Ordering::SeqCst), calls);
        assert_eq!(first.segments(), second.segments());
    }

    #[test]
    fn test_parameter_change_replaces_slot() {
        let counting = Arc::new(Counting::default());
        let vocab: VocabularyRef = counting.clone();
        let splitter = SentenceSplitter::new();
        let string = WrappedString::from("One. Two.");

        let paragraph = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &splitter)
            .unwrap();
        let sentence = string
            .get_tokenized(&vocab, 8, SplitMode::Sentence, &splitter)
            .unwrap();

        assert_eq!(paragraph.segments().len(), 2);
        assert_eq!(sentence.segments().len(), 1);
        let cached = string.cached().unwrap();
        assert!(Arc::ptr_eq(&cached, &sentence));
        assert_eq!(cached.parameters().split_mode, SplitMode::Sentence);
    }

    #[test]
    fn test_splitter_rules_are_part_of_cache_key() {
        let counting = Arc::new(Counting::default());
        let vocab: VocabularyRef = counting.clone();
        let string = WrappedString::from("See Dr. Who. Then leave.");

        let english = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &SentenceSplitter::new())
            .unwrap();
        assert_eq!(english.segments().len(), 2);

        // equal rules in a separate splitter still hit
        let calls = counting.calls.load(Ordering::SeqCst);
        let again = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &SentenceSplitter::new())
            .unwrap();
        assert!(Arc::ptr_eq(&english, &again));
        assert_eq!(counting.calls.load(Ordering::SeqCst), calls);

        let custom = SentenceSplitter::with_prefixes(["Nr"]);
        let retokenized = string
            .get_tokenized(&vocab, 8, SplitMode::Paragraph, &custom)
            .unwrap();
        assert_eq!(retokenized.segments().len(), 3);
        assert!(counting.calls.load(Ordering::SeqCst) > calls);
        assert_eq!(retokenized.splitter(), Some(&custom));
    }

    #[test]
    fn test_from_tokenized_is_cached() {
        let vocab: VocabularyRef = Arc::new(Counting::default());
        let parameters = TokenizationParameters::new(vocab.clone(), 4, SplitMode::Sentence).unwrap();
        let tokenized = Arc::new(tokenize(Arc::from("abc"), parameters, &SentenceSplitter::new()));

        let string = WrappedString::from_tokenized(tokenized.clone());
        let fetched = string
            .get_tokenized(&vocab, 4, SplitMode::Sentence, &SentenceSplitter::new())
            .unwrap();

        assert_eq!(string.text(), "abc");
        assert!(Arc::ptr_eq(&fetched, &tokenized));
    }

    #[test]
    fn test_shared_across_threads() {
        let vocab: VocabularyRef = Arc::new(Counting::default());
        let string = Arc::new(WrappedString::from("A b. C d."));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let string = string.clone();
                let vocab = vocab.clone();
                std::thread::spawn(move || {
                    string
                        .get_tokenized(&vocab, 8, SplitMode::Paragraph, &SentenceSplitter::new())
                        .unwrap()
                        .segments()
                        .len()
                })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), 2);
        }
    }
}
