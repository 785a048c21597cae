//! Layered error types

use thiserror::Error;
use translatador_core::CoreError;

/// Public error taxonomy shared by every layer and the C API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized or invalid option
    Config,
    /// Buffers could not be turned into a model
    ModelLoad,
    /// Inference or reassembly failed
    Translation,
    /// The requested feature was compiled out
    FeatureDisabled,
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Tokenization or reassembly error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Invalid model options
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// Model creation failed
    #[error("failed to load model: {0}")]
    ModelLoadError(String),

    /// Translation failed
    #[error("translation failed: {0}")]
    TranslationError(String),

    /// Failure reported by the external engine
    #[error("{backend}: {message}")]
    BackendError {
        /// Name of the reporting backend
        backend: String,
        /// Engine-provided description
        message: String,
    },
}

impl EngineError {
    /// Convenience constructor for backend implementations
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        EngineError::BackendError {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Category of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            EngineError::Core(err) if err.is_config() => ErrorKind::Config,
            EngineError::Core(_) => ErrorKind::Translation,
            EngineError::ConfigError(_) => ErrorKind::Config,
            EngineError::ModelLoadError(_) => ErrorKind::ModelLoad,
            EngineError::TranslationError(_) | EngineError::BackendError { .. } => {
                ErrorKind::Translation
            }
        }
    }

    /// Reclassify a backend failure raised while loading
    pub(crate) fn into_load_error(self, what: &str) -> Self {
        match self {
            EngineError::BackendError { .. } | EngineError::TranslationError(_) => {
                EngineError::ModelLoadError(format!("{what}: {self}"))
            }
            other => other,
        }
    }
}

impl From<toml::de::Error> for EngineError {
    fn from(err: toml::de::Error) -> Self {
        EngineError::ConfigError(format!("failed to parse model options: {err}"))
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
