//! External translation engine seam
//!
//! Neural search and subword vocabularies are provided by an engine
//! integration implementing [`Backend`]. This crate only drives it.

use crate::error::Result;
use crate::memory::AlignedMemory;
use crate::model::ModelData;
use std::sync::{Arc, PoisonError, RwLock};
use translatador_core::{SubBatch, VocabularyRef, WordId};

/// Compute device an inference context runs on
pub type DeviceId = usize;

/// The only device models are placed on
pub const CPU_DEVICE: DeviceId = 0;

/// One scored candidate translation of a segment
#[derive(Debug, Clone, PartialEq)]
pub struct Hypothesis {
    /// Target word ids, EOS included
    pub words: Vec<WordId>,
    /// Model score
    pub score: f32,
}

impl Hypothesis {
    /// Create a new hypothesis
    pub fn new(words: Vec<WordId>, score: f32) -> Self {
        Self { words, score }
    }
}

/// N-best list for one segment, best first
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    hypotheses: Vec<Hypothesis>,
}

impl History {
    /// Wrap an n-best list already ordered best first
    pub fn new(hypotheses: Vec<Hypothesis>) -> Self {
        Self { hypotheses }
    }

    /// History holding a single hypothesis
    pub fn single(words: Vec<WordId>, score: f32) -> Self {
        Self::new(vec![Hypothesis::new(words, score)])
    }

    /// Rank-0 hypothesis
    pub fn best(&self) -> Option<&Hypothesis> {
        self.hypotheses.first()
    }

    /// Take ownership of the rank-0 hypothesis
    pub fn into_best(self) -> Option<Hypothesis> {
        self.hypotheses.into_iter().next()
    }

    /// All hypotheses, best first
    pub fn nbest(&self) -> &[Hypothesis] {
        &self.hypotheses
    }

    /// Whether search produced nothing
    pub fn is_empty(&self) -> bool {
        self.hypotheses.is_empty()
    }
}

/// Engine state restricting the output vocabulary per batch
pub trait ShortListGenerator: Send + Sync {}

/// Per-model search state.
///
/// A context is used by one caller at a time; it is never shared.
pub trait InferenceContext: Send {
    /// Search every column of `batch`.
    ///
    /// Returns one history per column, in column order.
    fn search(&mut self, batch: &SubBatch) -> Result<Vec<History>>;
}

/// A linked translation engine
pub trait Backend: Send + Sync {
    /// Engine name for diagnostics
    fn name(&self) -> &str;

    /// Process-wide setup, run once before the first context is created
    fn initialize(&self) -> Result<()> {
        Ok(())
    }

    /// Build a vocabulary over an aligned copy of its file
    fn load_vocabulary(&self, bytes: Arc<AlignedMemory>) -> Result<VocabularyRef>;

    /// Build a short-list generator over an aligned copy of its file.
    ///
    /// The generator may keep `bytes` alive but must not outlive it otherwise.
    fn load_short_list(
        &self,
        bytes: Arc<AlignedMemory>,
        source: &VocabularyRef,
        target: &VocabularyRef,
    ) -> Result<Arc<dyn ShortListGenerator>>;

    /// Fresh search state over the shared model data
    fn create_context(&self, model: &ModelData, device: DeviceId)
        -> Result<Box<dyn InferenceContext>>;
}

static INSTALLED: RwLock<Option<Arc<dyn Backend>>> = RwLock::new(None);

/// Register the engine used by callers that cannot pass one explicitly.
///
/// Replaces any previously installed backend.
pub fn install_backend(backend: Arc<dyn Backend>) {
    log::info!("installing translation backend '{}'", backend.name());
    *INSTALLED.write().unwrap_or_else(PoisonError::into_inner) = Some(backend);
}

/// The registered engine, if any
pub fn installed_backend() -> Option<Arc<dyn Backend>> {
    INSTALLED
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}
