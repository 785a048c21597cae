//! Reassembly of translated segments into a full document

use crate::error::{CoreError, Result};
use crate::tokenize::{Segment, Token, TokenizedString};
use crate::vocab::{VocabularyRef, WordId};
use std::sync::Arc;

/// Decode the best hypothesis of every segment of `source` and stitch the
/// results together with the source's literal gaps.
///
/// `best[i]` must be the winning word sequence for `source.segments()[i]`.
/// The result is tokenized with `target` so it can be fed to another model.
pub fn decode<W>(
    source: &TokenizedString,
    target: &VocabularyRef,
    best: &[W],
) -> Result<TokenizedString>
where
    W: AsRef<[WordId]>,
{
    let segment_count = source.segments().len();
    if best.len() != segment_count {
        return Err(CoreError::ResultCountMismatch {
            expected: segment_count,
            actual: best.len(),
        });
    }

    let mut plain = String::with_capacity(source.plain().len());
    let mut segments = Vec::with_capacity(segment_count);

    for (index, words) in best.iter().enumerate() {
        let words = words.as_ref();
        let decoded = target.decode_with_byte_ranges(words);

        plain.push_str(source.gap_before(index));
        let offset = plain.len();

        let tokens = decoded
            .ranges
            .iter()
            .zip(words)
            .map(|(range, &id)| {
                if range.start > range.end || range.end > decoded.text.len() {
                    return Err(CoreError::TokenOutOfBounds {
                        begin: range.start,
                        end: range.end,
                        len: decoded.text.len(),
                    });
                }
                Ok(Token::new(id, range.start, range.end).rebased(offset))
            })
            .collect::<Result<Vec<_>>>()?;

        plain.push_str(&decoded.text);
        segments.push(Segment { tokens });
    }

    plain.push_str(source.gap_before(segment_count));

    Ok(TokenizedString::from_parts(
        source.parameters().with_vocabulary(target.clone()),
        Arc::from(plain),
        segments,
    ))
}
