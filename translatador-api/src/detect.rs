//! Language detection
//!
//! Backed by `whatlang` when the `detect` feature is enabled.

use crate::error::Result;
#[cfg(not(feature = "detect"))]
use crate::error::ApiError;

/// Confidence at or above which a detection is considered reliable
pub const RELIABLE_CONFIDENCE: f32 = 0.9;

/// Most likely language of a text
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DetectedLanguage {
    /// Position in the detector's language table, stable across releases
    pub id: u8,
    /// ISO 639-3 code
    pub code: &'static str,
    /// English name
    pub name: &'static str,
    /// Confidence between 0 and 1
    pub confidence: f32,
}

impl DetectedLanguage {
    /// Whether `confidence` reaches [`RELIABLE_CONFIDENCE`]
    pub fn is_reliable(&self) -> bool {
        self.confidence >= RELIABLE_CONFIDENCE
    }
}

/// Detect the language of `text`.
///
/// Returns `Ok(None)` when the text carries no usable signal, such as an
/// empty string or only digits and punctuation.
#[cfg(feature = "detect")]
pub fn detect_language(text: &str) -> Result<Option<DetectedLanguage>> {
    Ok(whatlang::detect(text).map(|info| {
        let lang = info.lang();
        DetectedLanguage {
            id: lang as u8,
            code: lang.code(),
            name: lang.eng_name(),
            confidence: info.confidence() as f32,
        }
    }))
}

/// Detect the language of `text`.
///
/// Always fails: this build was compiled without the `detect` feature.
#[cfg(not(feature = "detect"))]
pub fn detect_language(_text: &str) -> Result<Option<DetectedLanguage>> {
    Err(ApiError::FeatureDisabled("language detection"))
}

#[cfg(all(test, feature = "detect"))]
mod tests {
    use super::*;

    #[test]
    fn test_detect_english() {
        let detected = detect_language(
            "The quick brown fox jumps over the lazy dog while the farmer watches from the porch.",
        )
        .unwrap()
        .unwrap();
        assert_eq!(detected.code, "eng");
        assert_eq!(detected.name, "English");
        assert!(detected.confidence > 0.0 && detected.confidence <= 1.0);
    }

    #[test]
    fn test_detect_spanish() {
        let detected = detect_language(
            "El rápido zorro marrón salta sobre el perro perezoso mientras el granjero mira desde la casa.",
        )
        .unwrap()
        .unwrap();
        assert_eq!(detected.code, "spa");
    }

    #[test]
    fn test_no_signal() {
        assert!(detect_language("").unwrap().is_none());
    }

    #[test]
    fn test_reliability_threshold() {
        let mut detected = DetectedLanguage {
            id: 1,
            code: "eng",
            name: "English",
            confidence: 0.9,
        };
        assert!(detected.is_reliable());
        detected.confidence = 0.89;
        assert!(!detected.is_reliable());
    }
}

#[cfg(all(test, not(feature = "detect")))]
mod tests {
    use super::*;
    use translatador_engine::ErrorKind;

    #[test]
    fn test_detection_disabled() {
        let err = detect_language("hello").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FeatureDisabled);
        assert_eq!(err.to_string(), "language detection is disabled");
    }
}
