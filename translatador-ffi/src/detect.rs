//! Language detection

use crate::error::{boundary, FfiError};
use crate::model::TrlError;
use std::ffi::{c_char, c_float, c_int, CStr};
use translatador_api::detect_language;

/// Detected language and the confidence that it matches the text
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrlDetectedLangInfo {
    /// `TrlDetectedLang` value, following the detector's language table
    pub lang: c_int,
    /// Confidence between 0 and 1
    pub confidence: c_float,
}

/// Detects the language `string` is most likely written in.
///
/// On failure `result` is left untouched.
///
/// # Safety
///
/// `string` must be null or a NUL-terminated string, and `result` must be
/// null or valid for writes.
#[no_mangle]
pub unsafe extern "C" fn trl_detect_language(
    string: *const c_char,
    result: *mut TrlDetectedLangInfo,
) -> TrlError {
    boundary(TrlError::Error, || {
        if string.is_null() {
            return Err(FfiError::NullArgument("string"));
        }
        let result = result.as_mut().ok_or(FfiError::NullArgument("result"))?;
        let text = CStr::from_ptr(string)
            .to_str()
            .map_err(|_| FfiError::InvalidUtf8("string"))?;

        let detected = detect_language(text)?.ok_or(FfiError::NoLanguage)?;
        log::debug!(
            "detected {} with confidence {:.3}",
            detected.code,
            detected.confidence
        );
        *result = TrlDetectedLangInfo {
            lang: c_int::from(detected.id),
            confidence: detected.confidence,
        };
        Ok(TrlError::Ok)
    })
}
