//! Batch assembly
//!
//! Packs the segments of several tokenized strings into rectangular id/mask
//! matrices for the engine, and regroups the engine's per-segment results
//! back into whole strings afterwards.

use crate::decode::decode;
use crate::error::{CoreError, Result};
use crate::tokenize::{Segment, TokenizedString};
use crate::vocab::{same_vocabulary, VocabularyRef, WordId};
use std::sync::Arc;

/// One engine-ready matrix of segments.
///
/// Matrices are column-major by position: the cell for token `row` of
/// column `column` lives at `row * batch_size + column`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubBatch {
    ids: Vec<WordId>,
    mask: Vec<f32>,
    batch_size: usize,
    max_length: usize,
    segment_ids: Vec<usize>,
    word_count: usize,
}

impl SubBatch {
    fn build(segments: &[&Segment], first_id: usize, eos: WordId) -> Self {
        let batch_size = segments.len();
        // +1 for the EOS marker
        let max_length = segments.iter().map(|s| s.len()).max().unwrap_or(0) + 1;

        let mut ids = vec![0; max_length * batch_size];
        let mut mask = vec![0.0; max_length * batch_size];
        let mut word_count = 0;

        for (column, segment) in segments.iter().enumerate() {
            for (row, id) in segment.ids().enumerate() {
                ids[row * batch_size + column] = id;
                mask[row * batch_size + column] = 1.0;
            }
            let eos_index = segment.len() * batch_size + column;
            ids[eos_index] = eos;
            mask[eos_index] = 1.0;
            word_count += segment.len() + 1;
        }

        Self {
            ids,
            mask,
            batch_size,
            max_length,
            segment_ids: (first_id..first_id + batch_size).collect(),
            word_count,
        }
    }

    /// Word ids, column-major
    pub fn ids(&self) -> &[WordId] {
        &self.ids
    }

    /// Mask values, exactly 0.0 or 1.0, column-major
    pub fn mask(&self) -> &[f32] {
        &self.mask
    }

    /// Number of segments (columns)
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of rows, including the EOS row
    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Global segment id of each column
    pub fn segment_ids(&self) -> &[usize] {
        &self.segment_ids
    }

    /// Real tokens plus one EOS marker per segment
    pub fn word_count(&self) -> usize {
        self.word_count
    }

    /// Unpadded words of one column, EOS included
    pub fn column(&self, column: usize) -> Vec<WordId> {
        (0..self.max_length)
            .map(|row| row * self.batch_size + column)
            .take_while(|&index| self.mask[index] > 0.0)
            .map(|index| self.ids[index])
            .collect()
    }
}

/// Segments of several strings packed for one translate call
#[derive(Debug, Clone)]
pub struct Batch {
    sources: Vec<Arc<TokenizedString>>,
    segment_counts: Vec<usize>,
    sub_batches: Vec<SubBatch>,
    segment_total: usize,
    max_segment_length: usize,
}

impl Batch {
    /// Pack `sources`, all tokenized with `vocabulary`.
    ///
    /// With `max_words` set, consecutive segments are grouped so that each
    /// sub-batch's padded size stays within the limit; a single segment that
    /// exceeds it on its own still gets a sub-batch.
    pub fn assemble(
        sources: Vec<Arc<TokenizedString>>,
        vocabulary: &VocabularyRef,
        max_words: Option<usize>,
    ) -> Self {
        debug_assert!(
            sources
                .iter()
                .all(|s| same_vocabulary(&s.parameters().vocabulary, vocabulary)),
            "batched strings must share the source vocabulary"
        );

        let segment_counts: Vec<usize> = sources.iter().map(|s| s.segments().len()).collect();
        let segment_total = segment_counts.iter().sum();
        let all: Vec<&Segment> = sources.iter().flat_map(|s| s.segments()).collect();
        let max_segment_length = all.iter().map(|s| s.len()).max().unwrap_or(0);

        let eos = vocabulary.eos_id();
        let mut sub_batches = Vec::new();
        let mut first = 0;
        for group in group_segments(&all, max_words) {
            sub_batches.push(SubBatch::build(&all[first..first + group], first, eos));
            first += group;
        }

        log::debug!(
            "assembled {} strings into {} segments ({} sub-batches, longest {} tokens)",
            sources.len(),
            segment_total,
            sub_batches.len(),
            max_segment_length
        );

        Self {
            sources,
            segment_counts,
            sub_batches,
            segment_total,
            max_segment_length,
        }
    }

    /// Strings in the batch
    pub fn sources(&self) -> &[Arc<TokenizedString>] {
        &self.sources
    }

    /// Segments contributed by each string
    pub fn segment_counts(&self) -> &[usize] {
        &self.segment_counts
    }

    /// Engine-ready matrices in segment order
    pub fn sub_batches(&self) -> &[SubBatch] {
        &self.sub_batches
    }

    /// Total number of segments
    pub fn segment_total(&self) -> usize {
        self.segment_total
    }

    /// Longest segment, EOS excluded
    pub fn max_segment_length(&self) -> usize {
        self.max_segment_length
    }

    /// Whether there is nothing for the engine to do
    pub fn is_empty(&self) -> bool {
        self.segment_total == 0
    }

    /// Owning string index for every global segment id
    pub fn segment_owners(&self) -> Vec<usize> {
        self.segment_counts
            .iter()
            .enumerate()
            .flat_map(|(string, &count)| std::iter::repeat(string).take(count))
            .collect()
    }

    /// Decode per-segment best hypotheses, indexed by global segment id, into
    /// one tokenized string per source.
    pub fn decode<W>(&self, target: &VocabularyRef, best: &[W]) -> Result<Vec<TokenizedString>>
    where
        W: AsRef<[WordId]>,
    {
        if best.len() != self.segment_total {
            return Err(CoreError::ResultCountMismatch {
                expected: self.segment_total,
                actual: best.len(),
            });
        }

        let mut first = 0;
        self.sources
            .iter()
            .zip(&self.segment_counts)
            .map(|(source, &count)| {
                let results = &best[first..first + count];
                first += count;
                decode(source, target, results)
            })
            .collect()
    }
}

/// Sizes of consecutive segment groups under a padded word budget
fn group_segments(segments: &[&Segment], max_words: Option<usize>) -> Vec<usize> {
    if segments.is_empty() {
        return Vec::new();
    }
    let Some(limit) = max_words else {
        return vec![segments.len()];
    };

    let mut groups = Vec::new();
    let mut count = 0;
    let mut rows = 0;
    for segment in segments {
        let padded_rows = rows.max(segment.len() + 1);
        if count > 0 && padded_rows * (count + 1) > limit {
            groups.push(count);
            count = 0;
            rows = 0;
        }
        rows = rows.max(segment.len() + 1);
        count += 1;
    }
    groups.push(count);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenize::{Token, TokenizationParameters};
    use crate::split::SplitMode;
    use crate::vocab::{DecodedText, Vocabulary};
    use std::ops::Range;

    struct Fixed;

    impl Vocabulary for Fixed {
        fn encode_with_byte_ranges(&self, _text: &str) -> Vec<(WordId, Range<usize>)> {
            Vec::new()
        }

        fn decode_with_byte_ranges(&self, _words: &[WordId]) -> DecodedText {
            DecodedText::default()
        }

        fn eos_id(&self) -> WordId {
            99
        }
    }

    fn string(vocab: &VocabularyRef, lengths: &[usize]) -> Arc<TokenizedString> {
        let parameters = TokenizationParameters::new(vocab.clone(), 64, SplitMode::Paragraph).unwrap();
        let mut offset = 0;
        let segments = lengths
            .iter()
            .map(|&len| {
                let tokens = (0..len)
                    .map(|i| {
                        offset += 1;
                        Token::new(i as WordId + 1, offset - 1, offset)
                    })
                    .collect();
                offset += 1;
                Segment { tokens }
            })
            .collect();
        Arc::new(TokenizedString::from_parts(
            parameters,
            Arc::from("x".repeat(offset)),
            segments,
        ))
    }

    #[test]
    fn test_matrix_layout() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(vec![string(&vocab, &[2, 1])], &vocab, None);

        assert_eq!(batch.sub_batches().len(), 1);
        let sub = &batch.sub_batches()[0];
        assert_eq!(sub.batch_size(), 2);
        assert_eq!(sub.max_length(), 3);
        // row 0: [1, 1], row 1: [2, EOS], row 2: [EOS, pad]
        assert_eq!(sub.ids(), &[1, 1, 2, 99, 99, 0]);
        assert_eq!(sub.mask(), &[1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
        assert_eq!(sub.word_count(), 5);
        assert_eq!(sub.segment_ids(), &[0, 1]);
        assert_eq!(sub.column(1), vec![1, 99]);
    }

    #[test]
    fn test_segment_owners() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(
            vec![string(&vocab, &[1, 1]), string(&vocab, &[]), string(&vocab, &[3])],
            &vocab,
            None,
        );

        assert_eq!(batch.segment_counts(), &[2, 0, 1]);
        assert_eq!(batch.segment_total(), 3);
        assert_eq!(batch.segment_owners(), vec![0, 0, 2]);
        assert_eq!(batch.max_segment_length(), 3);
    }

    #[test]
    fn test_empty_batch() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(vec![string(&vocab, &[])], &vocab, None);

        assert!(batch.is_empty());
        assert!(batch.sub_batches().is_empty());
        let decoded = batch.decode::<Vec<WordId>>(&vocab, &[]).unwrap();
        assert_eq!(decoded.len(), 1);
    }

    #[test]
    fn test_word_limit_groups() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(vec![string(&vocab, &[1, 1, 5, 1])], &vocab, Some(6));

        let sizes: Vec<_> = batch.sub_batches().iter().map(SubBatch::batch_size).collect();
        assert_eq!(sizes, vec![2, 1, 1]);
        let ids: Vec<_> = batch
            .sub_batches()
            .iter()
            .flat_map(|sub| sub.segment_ids().to_vec())
            .collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_columns_follow_source_order() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(
            vec![string(&vocab, &[3, 1]), string(&vocab, &[2])],
            &vocab,
            None,
        );

        let sub = &batch.sub_batches()[0];
        assert_eq!(sub.segment_ids(), &[0, 1, 2]);
        let lengths: Vec<_> = (0..sub.batch_size()).map(|c| sub.column(c).len()).collect();
        assert_eq!(lengths, vec![4, 2, 3]);
    }

    #[test]
    fn test_decode_count_mismatch() {
        let vocab: VocabularyRef = Arc::new(Fixed);
        let batch = Batch::assemble(vec![string(&vocab, &[1])], &vocab, None);

        let err = batch.decode::<Vec<WordId>>(&vocab, &[]).unwrap_err();
        assert_eq!(
            err,
            CoreError::ResultCountMismatch {
                expected: 1,
                actual: 0
            }
        );
    }
}
