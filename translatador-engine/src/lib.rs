//! Model lifecycle and translation orchestration
//!
//! This crate loads a model from in-memory buffers through an external
//! translation engine, and drives the tokenization pipeline from
//! `translatador-core` around the engine's search.

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod model;
pub mod options;
pub mod runtime;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

// Re-export key types
pub use backend::{
    install_backend, installed_backend, Backend, DeviceId, History, Hypothesis, InferenceContext,
    ShortListGenerator, CPU_DEVICE,
};
pub use error::{EngineError, ErrorKind, Result};
pub use memory::{AlignedMemory, MODEL_ALIGNMENT, VOCABULARY_ALIGNMENT};
pub use model::{Model, ModelData};
pub use options::ModelOptions;

// Re-export from core for convenience
pub use translatador_core::{
    DecodedText, SplitMode, SubBatch, Vocabulary, VocabularyRef, WordId, WrappedString,
};
