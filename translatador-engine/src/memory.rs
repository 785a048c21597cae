//! Alignment-padded owned buffers
//!
//! The engine reads weights and vocabularies in place, so every caller buffer
//! is copied into storage whose first byte sits on the required boundary.

use std::fmt;
use std::ops::Deref;

/// Alignment of model weights
pub const MODEL_ALIGNMENT: usize = 256;

/// Alignment of vocabularies and short lists
pub const VOCABULARY_ALIGNMENT: usize = 64;

/// Owned copy of a byte buffer starting at an aligned address
pub struct AlignedMemory {
    storage: Vec<u8>,
    offset: usize,
    len: usize,
    alignment: usize,
}

impl AlignedMemory {
    /// Copy `bytes` into fresh storage aligned to `alignment`.
    ///
    /// Returns `None` for an empty buffer. `alignment` must be a power of two.
    pub fn copy_from(bytes: &[u8], alignment: usize) -> Option<Self> {
        debug_assert!(alignment.is_power_of_two());
        if bytes.is_empty() {
            return None;
        }

        let mut storage = vec![0u8; bytes.len() + alignment - 1];
        let offset = storage.as_ptr().align_offset(alignment);
        storage[offset..offset + bytes.len()].copy_from_slice(bytes);

        Some(Self {
            storage,
            offset,
            len: bytes.len(),
            alignment,
        })
    }

    /// The copied bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[self.offset..self.offset + self.len]
    }

    /// Alignment the storage was created with
    pub fn alignment(&self) -> usize {
        self.alignment
    }
}

impl Deref for AlignedMemory {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsRef<[u8]> for AlignedMemory {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl fmt::Debug for AlignedMemory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlignedMemory")
            .field("len", &self.len)
            .field("alignment", &self.alignment)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_is_aligned() {
        let bytes: Vec<u8> = (0..=255).collect();
        for alignment in [1, 8, VOCABULARY_ALIGNMENT, MODEL_ALIGNMENT] {
            let memory = AlignedMemory::copy_from(&bytes[3..], alignment).unwrap();
            assert_eq!(memory.as_ptr() as usize % alignment, 0);
            assert_eq!(memory.as_slice(), &bytes[3..]);
            assert_eq!(memory.alignment(), alignment);
        }
    }

    #[test]
    fn test_empty_buffer_has_no_storage() {
        assert!(AlignedMemory::copy_from(&[], MODEL_ALIGNMENT).is_none());
    }

    #[test]
    fn test_alignment_survives_move() {
        let memory = AlignedMemory::copy_from(b"weights", MODEL_ALIGNMENT).unwrap();
        let moved = Box::new(memory);
        assert_eq!(moved.as_ptr() as usize % MODEL_ALIGNMENT, 0);
        assert_eq!(&**moved, b"weights");
    }
}
