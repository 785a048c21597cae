//! C bindings for Translatador machine translation
//!
//! Exposes model loading, wrapped strings, batch translation and language
//! detection through the `trl_*` functions declared in
//! `include/translatador.h`. Handles are opaque heap pointers owned by the
//! caller until passed to the matching `trl_destroy_*` function.
//!
//! Failing calls return null or `TRL_ERROR` and record a message retrievable
//! once through [`trl_get_last_error`] on the same thread. Panics never cross
//! the boundary.
//!
//! Models are loaded through the backend registered with
//! [`translatador_engine::install_backend`].
//!
//! Logging goes through `env_logger` and stays off unless the
//! `TRANSLATADOR_LOG` environment variable holds a filter.

#![warn(missing_docs)]

pub mod detect;
pub mod error;
pub mod model;
pub mod string;

use std::sync::Once;

// Re-export key types
pub use detect::{trl_detect_language, TrlDetectedLangInfo};
pub use error::{set_last_error, take_last_error, trl_free_error, trl_get_last_error, FfiError};
pub use model::{
    trl_clone_model, trl_create_model, trl_destroy_model, trl_translate, TrlError, TrlModel,
};
pub use string::{trl_create_string, trl_destroy_string, trl_get_string_utf, TrlString};

/// Environment variable holding the log filter
pub const LOG_ENV: &str = "TRANSLATADOR_LOG";

static LOGGING: Once = Once::new();

/// Install the logger once per process; a host logger takes precedence
pub(crate) fn init_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::Builder::from_env(env_logger::Env::new().filter_or(LOG_ENV, "off"))
            .try_init();
    });
}
