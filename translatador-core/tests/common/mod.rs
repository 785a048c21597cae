//! Shared test vocabulary

#![allow(dead_code)]

use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use translatador_core::{Batch, DecodedText, Vocabulary, VocabularyRef, WordId};

pub const EOS: WordId = 0;

/// Interns every alphanumeric run as a word; decoding joins words with spaces
#[derive(Default)]
pub struct WordVocab {
    words: Mutex<Vec<String>>,
    encode_calls: AtomicUsize,
}

impl WordVocab {
    pub fn shared() -> (Arc<WordVocab>, VocabularyRef) {
        let vocab = Arc::new(WordVocab::default());
        let shared: VocabularyRef = vocab.clone();
        (vocab, shared)
    }

    pub fn encode_calls(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    fn intern(&self, word: &str) -> WordId {
        let mut words = self.words.lock().unwrap();
        match words.iter().position(|w| w == word) {
            Some(index) => index as WordId + 1,
            None => {
                words.push(word.to_string());
                words.len() as WordId
            }
        }
    }
}

impl Vocabulary for WordVocab {
    fn encode_with_byte_ranges(&self, text: &str) -> Vec<(WordId, Range<usize>)> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);

        let mut out = Vec::new();
        let mut start = None;
        for (i, ch) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            match (start, ch.is_alphanumeric()) {
                (None, true) => start = Some(i),
                (Some(s), false) => {
                    out.push((self.intern(&text[s..i]), s..i));
                    start = None;
                }
                _ => {}
            }
        }
        out
    }

    fn decode_with_byte_ranges(&self, words: &[WordId]) -> DecodedText {
        let table = self.words.lock().unwrap();
        let mut decoded = DecodedText::default();
        for &id in words.iter().filter(|&&id| id != EOS) {
            if !decoded.text.is_empty() {
                decoded.text.push(' ');
            }
            let begin = decoded.text.len();
            decoded.text.push_str(&table[id as usize - 1]);
            decoded.ranges.push(begin..decoded.text.len());
        }
        decoded
    }

    fn eos_id(&self) -> WordId {
        EOS
    }
}

/// Best hypotheses of an engine that copies its input
pub fn echo(batch: &Batch) -> Vec<Vec<WordId>> {
    batch
        .sub_batches()
        .iter()
        .flat_map(|sub| (0..sub.batch_size()).map(move |column| sub.column(column)))
        .collect()
}
