//! Deterministic in-process backend for tests
//!
//! Vocabularies are newline-separated word lists; weights are a magic header
//! followed by the name of a scorer that rewrites each segment without any
//! neural search.

use crate::backend::{Backend, DeviceId, History, InferenceContext, ShortListGenerator};
use crate::error::{EngineError, Result};
use crate::memory::AlignedMemory;
use crate::model::ModelData;
use std::ops::Range;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use translatador_core::{DecodedText, SubBatch, Vocabulary, VocabularyRef, WordId};

/// Leading bytes of valid stub weights
pub const WEIGHTS_MAGIC: &[u8] = b"TRLSTUB1";

/// End of sentence
pub const EOS_ID: WordId = 0;

/// Id of words missing from a vocabulary
pub const UNK_ID: WordId = WordId::MAX;

const NAME: &str = "stub";

/// How the stub rewrites a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scorer {
    /// Copy the source ids
    Identity,
    /// Reverse the word order
    Reverse,
    /// Produce no hypotheses
    Silent,
}

impl Scorer {
    fn name(self) -> &'static str {
        match self {
            Scorer::Identity => "identity",
            Scorer::Reverse => "reverse",
            Scorer::Silent => "silent",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        [Scorer::Identity, Scorer::Reverse, Scorer::Silent]
            .into_iter()
            .find(|scorer| scorer.name() == name)
    }
}

/// Weights selecting `scorer`
pub fn weights(scorer: Scorer) -> Vec<u8> {
    [WEIGHTS_MAGIC, scorer.name().as_bytes()].concat()
}

/// Vocabulary file holding `words`; ids start at 1
pub fn vocabulary(words: &[&str]) -> Vec<u8> {
    words.join("\n").into_bytes()
}

/// Word-level vocabulary
#[derive(Debug, Default)]
pub struct StubVocabulary {
    words: Vec<String>,
    encode_calls: AtomicUsize,
}

impl StubVocabulary {
    /// Parse a newline-separated word list
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| EngineError::backend(NAME, format!("vocabulary is not UTF-8: {e}")))?;
        Ok(Self {
            words: text.lines().map(str::to_string).collect(),
            encode_calls: AtomicUsize::new(0),
        })
    }

    /// Number of encode calls so far
    pub fn encode_calls(&self) -> usize {
        self.encode_calls.load(Ordering::SeqCst)
    }

    fn id(&self, word: &str) -> WordId {
        self.words
            .iter()
            .position(|w| w == word)
            .map_or(UNK_ID, |index| index as WordId + 1)
    }
}

impl Vocabulary for StubVocabulary {
    fn encode_with_byte_ranges(&self, text: &str) -> Vec<(WordId, Range<usize>)> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);

        let mut out = Vec::new();
        let mut start = None;
        for (i, ch) in text.char_indices().chain(std::iter::once((text.len(), ' '))) {
            match (start, ch.is_alphanumeric()) {
                (None, true) => start = Some(i),
                (Some(s), false) => {
                    out.push((self.id(&text[s..i]), s..i));
                    start = None;
                }
                _ => {}
            }
        }
        out
    }

    fn decode_with_byte_ranges(&self, words: &[WordId]) -> DecodedText {
        let mut decoded = DecodedText::default();
        for &id in words.iter().filter(|&&id| id != EOS_ID) {
            if !decoded.text.is_empty() {
                decoded.text.push(' ');
            }
            let word = match id {
                UNK_ID => "<unk>",
                id => self
                    .words
                    .get(id as usize - 1)
                    .map_or("<unk>", String::as_str),
            };
            let begin = decoded.text.len();
            decoded.text.push_str(word);
            decoded.ranges.push(begin..decoded.text.len());
        }
        decoded
    }

    fn eos_id(&self) -> WordId {
        EOS_ID
    }
}

/// Short list that only pins its buffer
#[derive(Debug)]
pub struct StubShortList {
    memory: Arc<AlignedMemory>,
}

impl StubShortList {
    /// Buffer the generator was built from
    pub fn memory(&self) -> &Arc<AlignedMemory> {
        &self.memory
    }
}

impl ShortListGenerator for StubShortList {}

/// Inference context applying a [`Scorer`]; fails on unknown words
#[derive(Debug)]
pub struct StubContext {
    scorer: Scorer,
}

impl InferenceContext for StubContext {
    fn search(&mut self, batch: &SubBatch) -> Result<Vec<History>> {
        (0..batch.batch_size())
            .map(|column| {
                let mut words = batch.column(column);
                if words.contains(&UNK_ID) {
                    return Err(EngineError::backend(NAME, "unknown word in segment"));
                }
                let score = -(words.len() as f32);
                match self.scorer {
                    Scorer::Identity => Ok(History::single(words, score)),
                    Scorer::Reverse => {
                        let eos = words.pop();
                        words.reverse();
                        words.extend(eos);
                        Ok(History::single(words, score))
                    }
                    Scorer::Silent => Ok(History::default()),
                }
            })
            .collect()
    }
}

/// Backend counting its lifecycle calls
#[derive(Debug, Default)]
pub struct StubBackend {
    initialize_calls: AtomicUsize,
    contexts_created: AtomicUsize,
}

impl StubBackend {
    /// Backend ready to share
    pub fn shared() -> Arc<StubBackend> {
        Arc::new(StubBackend::default())
    }

    /// Times [`Backend::initialize`] ran on this instance
    pub fn initialize_calls(&self) -> usize {
        self.initialize_calls.load(Ordering::SeqCst)
    }

    /// Inference contexts created so far
    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::SeqCst)
    }
}

impl Backend for StubBackend {
    fn name(&self) -> &str {
        NAME
    }

    fn initialize(&self) -> Result<()> {
        self.initialize_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn load_vocabulary(&self, bytes: Arc<AlignedMemory>) -> Result<VocabularyRef> {
        Ok(Arc::new(StubVocabulary::parse(&bytes)?))
    }

    fn load_short_list(
        &self,
        bytes: Arc<AlignedMemory>,
        _source: &VocabularyRef,
        _target: &VocabularyRef,
    ) -> Result<Arc<dyn ShortListGenerator>> {
        Ok(Arc::new(StubShortList { memory: bytes }))
    }

    fn create_context(
        &self,
        model: &ModelData,
        _device: DeviceId,
    ) -> Result<Box<dyn InferenceContext>> {
        let weights = model
            .weights()
            .ok_or_else(|| EngineError::backend(NAME, "no weights supplied"))?;
        let scorer = weights
            .strip_prefix(WEIGHTS_MAGIC)
            .ok_or_else(|| EngineError::backend(NAME, "bad magic header"))?;
        let scorer = std::str::from_utf8(scorer)
            .ok()
            .and_then(Scorer::from_name)
            .ok_or_else(|| EngineError::backend(NAME, "unknown scorer"))?;

        self.contexts_created.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubContext { scorer }))
    }
}
