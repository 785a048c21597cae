//! Tokenization pipeline for Translatador
//!
//! This crate turns raw text into engine-ready batches and turns engine
//! output back into text. It is pure: the subword vocabulary is supplied by
//! the translation engine through the [`Vocabulary`] trait, and nothing here
//! performs I/O.
//!
//! # Pipeline
//!
//! 1. [`SentenceSplitter`] splits a document into sentence spans.
//! 2. [`tokenize`] encodes each span and bounds segment length.
//! 3. [`WrappedString`] caches the resulting [`TokenizedString`].
//! 4. [`Batch`] packs segments of many strings into id/mask matrices.
//! 5. [`Batch::decode`] reassembles translated segments with the original gaps.
//!
//! # Example
//!
//! ```rust
//! use std::ops::Range;
//! use std::sync::Arc;
//! use translatador_core::{
//!     Batch, DecodedText, SentenceSplitter, SplitMode, Vocabulary, VocabularyRef, WordId,
//!     WrappedString,
//! };
//!
//! // One word per whitespace-separated run, ids are positions in `words`.
//! struct Words(Vec<&'static str>);
//!
//! impl Vocabulary for Words {
//!     fn encode_with_byte_ranges(&self, text: &str) -> Vec<(WordId, Range<usize>)> {
//!         let mut out = Vec::new();
//!         let mut offset = 0;
//!         for piece in text.split(' ') {
//!             if let Some(id) = self.0.iter().position(|w| *w == piece.trim_end_matches('.')) {
//!                 out.push((id as WordId + 1, offset..offset + self.0[id].len()));
//!             }
//!             offset += piece.len() + 1;
//!         }
//!         out
//!     }
//!
//!     fn decode_with_byte_ranges(&self, words: &[WordId]) -> DecodedText {
//!         let mut decoded = DecodedText::default();
//!         for &id in words.iter().filter(|&&id| id != 0) {
//!             if !decoded.text.is_empty() {
//!                 decoded.text.push(' ');
//!             }
//!             let begin = decoded.text.len();
//!             decoded.text.push_str(self.0[id as usize - 1]);
//!             decoded.ranges.push(begin..decoded.text.len());
//!         }
//!         decoded
//!     }
//!
//!     fn eos_id(&self) -> WordId {
//!         0
//!     }
//! }
//!
//! let vocab: VocabularyRef = Arc::new(Words(vec!["Hello", "world", "Goodbye"]));
//! let splitter = SentenceSplitter::new();
//! let string = WrappedString::from("Hello world. Goodbye.");
//!
//! let tokenized = string
//!     .get_tokenized(&vocab, 128, SplitMode::Paragraph, &splitter)
//!     .unwrap();
//! assert_eq!(tokenized.segments().len(), 2);
//!
//! // An engine that copies its input reproduces the text exactly
//! let batch = Batch::assemble(vec![tokenized], &vocab, None);
//! let sub = &batch.sub_batches()[0];
//! let echoed: Vec<Vec<WordId>> = (0..sub.batch_size()).map(|c| sub.column(c)).collect();
//! let decoded = batch.decode(&vocab, &echoed).unwrap();
//! assert_eq!(decoded[0].plain(), "Hello world. Goodbye.");
//! ```

pub mod batch;
pub mod decode;
pub mod error;
pub mod split;
pub mod string;
pub mod tokenize;
pub mod vocab;

pub use batch::{Batch, SubBatch};
pub use decode::decode;
pub use error::{CoreError, Result};
pub use split::{SegmentStream, SentenceSplitter, SplitMode};
pub use string::{StringContent, WrappedString};
pub use tokenize::{tokenize, Segment, Token, TokenizationParameters, TokenizedString};
pub use vocab::{same_vocabulary, DecodedText, Vocabulary, VocabularyRef, WordId};
