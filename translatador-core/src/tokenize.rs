//! Tokenized strings
//!
//! A [`TokenizedString`] is an immutable snapshot of a text together with the
//! subword segments produced from it and the parameters that produced them.

use crate::error::{CoreError, Result};
use crate::split::{SentenceSplitter, SplitMode};
use crate::vocab::{same_vocabulary, VocabularyRef, WordId};
use std::fmt;
use std::sync::Arc;

/// A subword unit with its byte range in the owning text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Vocabulary id
    pub id: WordId,
    /// Byte offset of the first byte
    pub begin: usize,
    /// Byte offset one past the last byte
    pub end: usize,
}

impl Token {
    /// Create a new token
    pub fn new(id: WordId, begin: usize, end: usize) -> Self {
        Self { id, begin, end }
    }

    /// Shift the token's range by `offset` bytes
    pub fn rebased(self, offset: usize) -> Self {
        Self {
            id: self.id,
            begin: self.begin + offset,
            end: self.end + offset,
        }
    }
}

/// Ordered tokens of one sentence, or of one length-bounded piece of it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segment {
    /// Tokens in ascending byte order
    pub tokens: Vec<Token>,
}

impl Segment {
    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the segment holds no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Byte offset where the segment starts
    pub fn begin(&self) -> Option<usize> {
        self.tokens.first().map(|token| token.begin)
    }

    /// Byte offset where the segment ends
    pub fn end(&self) -> Option<usize> {
        self.tokens.last().map(|token| token.end)
    }

    /// Word ids in order
    pub fn ids(&self) -> impl Iterator<Item = WordId> + '_ {
        self.tokens.iter().map(|token| token.id)
    }
}

/// Everything that determines how a text gets tokenized
#[derive(Clone)]
pub struct TokenizationParameters {
    /// Vocabulary, compared by identity
    pub vocabulary: VocabularyRef,
    /// Upper bound on tokens per segment
    pub max_segment_length: usize,
    /// Document layout
    pub split_mode: SplitMode,
}

impl TokenizationParameters {
    /// Create parameters, rejecting a zero segment length
    pub fn new(
        vocabulary: VocabularyRef,
        max_segment_length: usize,
        split_mode: SplitMode,
    ) -> Result<Self> {
        if max_segment_length == 0 {
            return Err(CoreError::ZeroSegmentLength);
        }
        Ok(Self {
            vocabulary,
            max_segment_length,
            split_mode,
        })
    }

    /// Same parameters with a different vocabulary
    pub fn with_vocabulary(&self, vocabulary: VocabularyRef) -> Self {
        Self {
            vocabulary,
            max_segment_length: self.max_segment_length,
            split_mode: self.split_mode,
        }
    }
}

impl PartialEq for TokenizationParameters {
    fn eq(&self, other: &Self) -> bool {
        same_vocabulary(&self.vocabulary, &other.vocabulary)
            && self.max_segment_length == other.max_segment_length
            && self.split_mode == other.split_mode
    }
}

impl Eq for TokenizationParameters {}

impl fmt::Debug for TokenizationParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenizationParameters")
            .field("vocabulary", &self.vocabulary)
            .field("max_segment_length", &self.max_segment_length)
            .field("split_mode", &self.split_mode)
            .finish()
    }
}

/// Immutable text plus its segmentation
#[derive(Debug, Clone)]
pub struct TokenizedString {
    parameters: TokenizationParameters,
    plain: Arc<str>,
    segments: Vec<Segment>,
    /// Splitter that produced the segments; `None` when built from parts
    splitter: Option<SentenceSplitter>,
}

impl TokenizedString {
    /// Assemble from already computed parts.
    ///
    /// Token ranges must lie within `plain` and ascend across segments.
    pub fn from_parts(
        parameters: TokenizationParameters,
        plain: Arc<str>,
        segments: Vec<Segment>,
    ) -> Self {
        debug_assert!(segments
            .iter()
            .flat_map(|segment| segment.tokens.iter())
            .all(|token| token.begin <= token.end && token.end <= plain.len()));
        Self {
            parameters,
            plain,
            segments,
            splitter: None,
        }
    }

    /// Parameters used to produce the segments
    pub fn parameters(&self) -> &TokenizationParameters {
        &self.parameters
    }

    /// Full text
    pub fn plain(&self) -> &str {
        &self.plain
    }

    /// Shared handle to the full text
    pub fn shared_plain(&self) -> Arc<str> {
        self.plain.clone()
    }

    /// Segments in document order
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether parameters match `parameters` exactly
    pub fn is_tokenized_with(&self, parameters: &TokenizationParameters) -> bool {
        self.parameters == *parameters
    }

    /// Splitter that produced the segments, if any
    pub fn splitter(&self) -> Option<&SentenceSplitter> {
        self.splitter.as_ref()
    }

    /// Whether the segments agree with `splitter`'s rules.
    ///
    /// Segments assembled from parts were not produced by a splitter and
    /// agree with any.
    pub fn is_split_by(&self, splitter: &SentenceSplitter) -> bool {
        self.splitter.as_ref().map_or(true, |own| own == splitter)
    }

    /// Literal text preceding segment `index`.
    ///
    /// For `index == segments().len()` this is the trailing text after the
    /// last segment; with no segments at all it is the whole text.
    pub fn gap_before(&self, index: usize) -> &str {
        let gap_start = match index.checked_sub(1) {
            Some(previous) => self.segments[previous].end().unwrap_or(0),
            None => 0,
        };
        let gap_end = self
            .segments
            .get(index)
            .and_then(Segment::begin)
            .unwrap_or(self.plain.len());
        &self.plain[gap_start..gap_end]
    }

    /// Total number of tokens across all segments
    pub fn token_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}

/// Split and encode `plain` according to `parameters`.
///
/// Spans that encode to no tokens are dropped; spans longer than the segment
/// limit become several consecutive segments.
pub fn tokenize(
    plain: Arc<str>,
    parameters: TokenizationParameters,
    splitter: &SentenceSplitter,
) -> TokenizedString {
    let limit = parameters.max_segment_length.max(1);
    let mut segments = Vec::new();

    for span in splitter.segments(&plain, parameters.split_mode) {
        let encoded = parameters
            .vocabulary
            .encode_with_byte_ranges(&plain[span.clone()]);
        if encoded.is_empty() {
            continue;
        }

        for chunk in encoded.chunks(limit) {
            segments.push(Segment {
                tokens: chunk
                    .iter()
                    .map(|(id, range)| Token::new(*id, range.start, range.end).rebased(span.start))
                    .collect(),
            });
        }
    }

    log::debug!(
        "tokenized {} bytes into {} segments ({} mode, limit {})",
        plain.len(),
        segments.len(),
        parameters.split_mode,
        limit
    );

    TokenizedString {
        splitter: Some(splitter.clone()),
        ..TokenizedString::from_parts(parameters, plain, segments)
    }
}
