//! Public API for Translatador machine translation
//!
//! This crate wraps loaded engine models behind the [`TranslationModel`]
//! trait, so they can be composed through pivot languages, forked for
//! concurrent use and mixed with non-neural models.
//!
//! # Example
//!
//! ```rust,no_run
//! use translatador_api::{Translatador, TranslationModel};
//!
//! # fn main() -> translatador_api::Result<()> {
//! let model = Translatador::builder()
//!     .model_file("model.esen.intgemm.alphas.bin")?
//!     .vocab_file("vocab.esen.spm")?
//!     .short_list_file("lex.50.50.esen.s2t.bin")?
//!     .load()?;
//!
//! let english = model.translate("Hola mundo. ¿Cómo estás?")?;
//! println!("{english}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod batch;
pub mod builder;
pub mod detect;
pub mod error;
pub mod model;
pub mod pivot;

// Re-export key types
pub use batch::TranslationBatch;
pub use builder::{ModelBuilder, Translatador};
pub use detect::{detect_language, DetectedLanguage, RELIABLE_CONFIDENCE};
pub use error::{ApiError, Result};
pub use model::{compose, ComposedModel, IdentityModel, ModelRef, NativeModel, TranslationModel};
pub use pivot::PivotedTranslationModel;

// Re-export from the engine for convenience
pub use translatador_engine::{install_backend, Backend, ErrorKind, ModelOptions};
