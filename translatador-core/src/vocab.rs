//! Subword vocabulary contract
//!
//! Encoding and decoding algorithms belong to the translation engine. The
//! pipeline only needs byte-range provenance in both directions and the
//! end-of-sequence id, so this is the whole surface it depends on.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Index of a subword unit in a vocabulary
pub type WordId = u32;

/// Text produced by decoding a word sequence
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedText {
    /// Decoded text of one segment
    pub text: String,
    /// Byte range inside `text` for each emitted word, in word order.
    /// The trailing end-of-sequence word, if present, has no range.
    pub ranges: Vec<Range<usize>>,
}

/// A subword vocabulary capable of encoding and decoding with byte ranges
pub trait Vocabulary: Send + Sync {
    /// Encode `text` into word ids, each paired with its byte range relative
    /// to the start of `text`. No end-of-sequence marker is appended.
    fn encode_with_byte_ranges(&self, text: &str) -> Vec<(WordId, Range<usize>)>;

    /// Decode `words` into text. End-of-sequence markers are skipped and
    /// receive no range.
    fn decode_with_byte_ranges(&self, words: &[WordId]) -> DecodedText;

    /// Id of the end-of-sequence marker
    fn eos_id(&self) -> WordId;
}

/// Shared handle to a loaded vocabulary
pub type VocabularyRef = Arc<dyn Vocabulary>;

/// Identity comparison for shared vocabularies.
///
/// Two handles are the same vocabulary only if they point at the same
/// allocation; equal contents loaded twice are still distinct.
pub fn same_vocabulary(a: &VocabularyRef, b: &VocabularyRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

impl fmt::Debug for dyn Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Vocabulary@{:p}", self as *const dyn Vocabulary as *const ())
    }
}
