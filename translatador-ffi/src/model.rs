//! Model handles and translation

use crate::error::{boundary, FfiError, Result};
use crate::string::TrlString;
use std::ffi::{c_char, CStr};
use std::{ptr, slice};
use translatador_engine::{installed_backend, Model, WrappedString};

/// Outcome of a fallible call
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrlError {
    /// Success
    Ok = 0,
    /// Failure; see [`crate::trl_get_last_error`]
    Error = 1,
}

/// A loaded translation model
///
/// Not safe for concurrent use; clone it for each thread.
#[derive(Debug)]
pub struct TrlModel {
    model: Model,
}

impl TrlModel {
    /// The engine model
    pub fn model(&self) -> &Model {
        &self.model
    }
}

/// View a (pointer, size) pair; null or zero size reads as absent
unsafe fn buffer<'a>(data: *const c_char, size: usize) -> Option<&'a [u8]> {
    if data.is_null() || size == 0 {
        None
    } else {
        Some(slice::from_raw_parts(data.cast(), size))
    }
}

/// Loads a model from in-memory binaries. Returns null on failure.
///
/// Every buffer is copied. `config` holds TOML model options or is null for
/// defaults; `target_vocab` and `short_list` are optional (null or size 0).
///
/// # Safety
///
/// Each non-null buffer must be valid for reads of its size, and `config`
/// must be null or a NUL-terminated string.
#[no_mangle]
#[allow(clippy::too_many_arguments)]
pub unsafe extern "C" fn trl_create_model(
    config: *const c_char,
    model: *const c_char,
    model_size: usize,
    source_vocab: *const c_char,
    source_vocab_size: usize,
    target_vocab: *const c_char,
    target_vocab_size: usize,
    short_list: *const c_char,
    short_list_size: usize,
) -> *mut TrlModel {
    boundary(ptr::null_mut(), || {
        let config = if config.is_null() {
            None
        } else {
            Some(
                CStr::from_ptr(config)
                    .to_str()
                    .map_err(|_| FfiError::InvalidUtf8("config"))?,
            )
        };
        let backend = installed_backend().ok_or(FfiError::NoBackend)?;

        let model = Model::create(
            backend,
            config,
            buffer(model, model_size).unwrap_or_default(),
            buffer(source_vocab, source_vocab_size).unwrap_or_default(),
            buffer(target_vocab, target_vocab_size),
            buffer(short_list, short_list_size),
        )?;
        Ok(Box::into_raw(Box::new(TrlModel { model })))
    })
}

/// Copies `model` for use from another thread. Returns null on failure.
///
/// # Safety
///
/// `model` must be null or a live pointer returned by this library.
#[no_mangle]
pub unsafe extern "C" fn trl_clone_model(model: *const TrlModel) -> *mut TrlModel {
    boundary(ptr::null_mut(), || {
        let model = model.as_ref().ok_or(FfiError::NullArgument("model"))?;
        let model = model.model.try_clone()?;
        Ok(Box::into_raw(Box::new(TrlModel { model })))
    })
}

/// Releases `model`. Null is ignored.
///
/// # Safety
///
/// `model` must be null or a live pointer returned by this library, and must
/// not be used afterwards.
#[no_mangle]
pub unsafe extern "C" fn trl_destroy_model(model: *mut TrlModel) {
    if !model.is_null() {
        drop(Box::from_raw(model));
    }
}

/// Translates `count` strings from `source` into `target`.
///
/// On failure `target` is left untouched. Each string written to `target`
/// must be released with [`crate::trl_destroy_string`].
///
/// # Safety
///
/// `model` must be a live model not in use by another thread. `source` must
/// hold `count` live strings and `target` must have room for `count`
/// pointers; both may be null when `count` is 0.
#[no_mangle]
pub unsafe extern "C" fn trl_translate(
    model: *mut TrlModel,
    source: *const *const TrlString,
    target: *mut *const TrlString,
    count: usize,
) -> TrlError {
    boundary(TrlError::Error, || {
        let model = model.as_mut().ok_or(FfiError::NullArgument("model"))?;
        if count == 0 {
            return Ok(TrlError::Ok);
        }
        if source.is_null() {
            return Err(FfiError::NullArgument("source"));
        }
        if target.is_null() {
            return Err(FfiError::NullArgument("target"));
        }

        let sources = slice::from_raw_parts(source, count)
            .iter()
            .map(|string| string.as_ref().map(TrlString::wrapped))
            .collect::<Option<Vec<&WrappedString>>>()
            .ok_or(FfiError::NullArgument("source string"))?;

        let translated = translate(&mut model.model, &sources)?;
        let target = slice::from_raw_parts_mut(target, count);
        for (slot, string) in target.iter_mut().zip(translated) {
            *slot = Box::into_raw(Box::new(string)).cast_const();
        }
        Ok(TrlError::Ok)
    })
}

/// Translate and wrap every result before any is handed out
fn translate(model: &mut Model, sources: &[&WrappedString]) -> Result<Vec<TrlString>> {
    model
        .translate(sources)?
        .into_iter()
        .map(TrlString::from_wrapped)
        .collect()
}
