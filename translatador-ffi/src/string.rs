//! Wrapped strings passed to and from translation

use crate::error::{boundary, FfiError, Result};
use std::ffi::{c_char, CStr, CString};
use std::ptr;
use translatador_engine::WrappedString;

/// A string that can be, or has been, translated
///
/// Holds the tokenization cache of its [`WrappedString`], so strings passed
/// through several models keep their alignment to the original text.
#[derive(Debug)]
pub struct TrlString {
    wrapped: WrappedString,
    utf: CString,
}

impl TrlString {
    pub(crate) fn from_wrapped(wrapped: WrappedString) -> Result<Self> {
        let utf = CString::new(wrapped.text()).map_err(|_| FfiError::InteriorNul)?;
        Ok(Self { wrapped, utf })
    }

    /// The wrapped string
    pub fn wrapped(&self) -> &WrappedString {
        &self.wrapped
    }

    /// Plain text
    pub fn text(&self) -> &str {
        self.wrapped.text()
    }

    /// Plain text as a C string
    pub fn utf(&self) -> &CStr {
        &self.utf
    }
}

/// Wraps a copy of `utf` for translation. Returns null when `utf` is null or
/// not valid UTF-8.
///
/// # Safety
///
/// `utf` must be null or a NUL-terminated string.
#[no_mangle]
pub unsafe extern "C" fn trl_create_string(utf: *const c_char) -> *const TrlString {
    boundary(ptr::null(), || {
        if utf.is_null() {
            return Err(FfiError::NullArgument("string"));
        }
        let utf = CStr::from_ptr(utf);
        let text = utf.to_str().map_err(|_| FfiError::InvalidUtf8("string"))?;
        let string = TrlString {
            wrapped: WrappedString::new(text),
            utf: utf.to_owned(),
        };
        Ok(Box::into_raw(Box::new(string)).cast_const())
    })
}

/// Plain text held by `string`, valid until the string is destroyed.
///
/// # Safety
///
/// `string` must be null or a live pointer returned by this library.
#[no_mangle]
pub unsafe extern "C" fn trl_get_string_utf(string: *const TrlString) -> *const c_char {
    boundary(ptr::null(), || {
        let string = string.as_ref().ok_or(FfiError::NullArgument("string"))?;
        Ok(string.utf.as_ptr())
    })
}

/// Releases `string`. Null is ignored.
///
/// # Safety
///
/// `string` must be null or a live pointer returned by this library, and
/// must not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn trl_destroy_string(string: *const TrlString) {
    if !string.is_null() {
        drop(Box::from_raw(string.cast_mut()));
    }
}
