//! Core error types
//!
//! Only deterministic failures live here: bad tokenization parameters and
//! engine output that does not line up with the batch that produced it.

use thiserror::Error;

/// Errors raised by the tokenization and reassembly pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Segmentation mode string was not recognized
    #[error("unrecognized ssplit-mode: {0}")]
    UnknownSplitMode(String),

    /// Segments must be allowed to hold at least one token
    #[error("max segment length must be greater than zero")]
    ZeroSegmentLength,

    /// The engine returned a different number of results than segments submitted
    #[error("expected {expected} segment results, got {actual}")]
    ResultCountMismatch {
        /// Number of segments in the source
        expected: usize,
        /// Number of results received
        actual: usize,
    },

    /// The engine returned no hypothesis for a segment
    #[error("no hypothesis produced for segment {segment}")]
    EmptyHistory {
        /// Global segment id
        segment: usize,
    },

    /// A decoded token range does not fit the decoded text
    #[error("decoded token range {begin}..{end} exceeds segment text of {len} bytes")]
    TokenOutOfBounds {
        /// Range start
        begin: usize,
        /// Range end
        end: usize,
        /// Length of the decoded segment text
        len: usize,
    },
}

impl CoreError {
    /// Whether this error stems from configuration rather than translation
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            CoreError::UnknownSplitMode(_) | CoreError::ZeroSegmentLength
        )
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
