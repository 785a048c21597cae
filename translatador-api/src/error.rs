//! API error types

use thiserror::Error;
use translatador_engine::{EngineError, ErrorKind};

/// API-level errors
#[derive(Error, Debug)]
pub enum ApiError {
    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Feature compiled out of this build
    #[error("{0} is disabled")]
    FeatureDisabled(&'static str),

    /// Model used after [`crate::NativeModel::close`]
    #[error("model has already been closed")]
    ModelClosed,

    /// I/O error while reading model files
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Category of the error
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Engine(err) => err.kind(),
            ApiError::Config(_) => ErrorKind::Config,
            ApiError::FeatureDisabled(_) => ErrorKind::FeatureDisabled,
            ApiError::ModelClosed => ErrorKind::Translation,
            ApiError::Io(_) => ErrorKind::ModelLoad,
        }
    }
}

/// Result type for API operations
pub type Result<T> = std::result::Result<T, ApiError>;
