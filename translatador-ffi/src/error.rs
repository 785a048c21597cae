//! Last-error reporting across the C boundary

use std::any::Any;
use std::cell::RefCell;
use std::ffi::{c_char, CString};
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use thiserror::Error;
use translatador_api::ApiError;
use translatador_engine::EngineError;

thread_local! {
    static LAST_ERROR: RefCell<Option<String>> = const { RefCell::new(None) };
}

/// Internal error enum for Rust-side error handling
#[derive(Error, Debug)]
pub enum FfiError {
    /// A required pointer argument was null
    #[error("{0} must not be null")]
    NullArgument(&'static str),

    /// A C string argument was not UTF-8
    #[error("{0} is not valid UTF-8")]
    InvalidUtf8(&'static str),

    /// Output text cannot be handed out as a C string
    #[error("translated text contains an interior NUL byte")]
    InteriorNul,

    /// No backend was installed before loading a model
    #[error("no translation backend installed")]
    NoBackend,

    /// The detector found no usable signal
    #[error("no language detected")]
    NoLanguage,

    /// A panic was caught at the boundary
    #[error("internal panic: {0}")]
    Panic(String),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// API error
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub(crate) type Result<T> = std::result::Result<T, FfiError>;

/// Record `err` as the calling thread's last error
pub fn set_last_error(err: impl Display) {
    let message = err.to_string();
    log::debug!("ffi call failed: {message}");
    LAST_ERROR.with(|last| *last.borrow_mut() = Some(message));
}

/// Take the calling thread's last error, clearing it
pub fn take_last_error() -> Option<String> {
    LAST_ERROR.with(|last| last.borrow_mut().take())
}

/// Run `f` at the C boundary: errors and panics become the last error and
/// `fallback` is returned in their place.
pub(crate) fn boundary<T>(fallback: T, f: impl FnOnce() -> Result<T>) -> T {
    crate::init_logging();
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => value,
        Ok(Err(err)) => {
            set_last_error(err);
            fallback
        }
        Err(payload) => {
            set_last_error(FfiError::Panic(panic_message(payload.as_ref())));
            fallback
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Returns the calling thread's last error and clears it, or null if none
/// occurred since the last call.
///
/// The string must be released with [`trl_free_error`].
#[no_mangle]
pub extern "C" fn trl_get_last_error() -> *mut c_char {
    match take_last_error() {
        Some(message) => CString::new(message.replace('\0', " "))
            .map(CString::into_raw)
            .unwrap_or(ptr::null_mut()),
        None => ptr::null_mut(),
    }
}

/// Releases a string returned by [`trl_get_last_error`].
///
/// # Safety
///
/// `error` must be null or a pointer returned by [`trl_get_last_error`] that
/// has not been freed yet.
#[no_mangle]
pub unsafe extern "C" fn trl_free_error(error: *mut c_char) {
    if !error.is_null() {
        drop(CString::from_raw(error));
    }
}
