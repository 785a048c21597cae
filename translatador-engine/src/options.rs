//! Model options
//!
//! Options are TOML text with kebab-case keys. Every key has a fixed default
//! tuned for single-sentence CPU translation; supplied text overrides the
//! defaults, and bookkeeping keys are forced back afterwards.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use translatador_core::{SentenceSplitter, SplitMode};

/// Value of `vocabs` after parsing, whatever the caller supplied
pub const FORCED_VOCABS: [&str; 2] = ["source", "target"];

/// Options controlling tokenization and search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ModelOptions {
    /// Maximum tokens per segment
    pub max_length_break: usize,
    /// Maximum target length as a multiple of the source length
    pub max_length_factor: f32,
    /// Beam width
    pub beam_size: usize,
    /// Length normalization exponent
    pub normalize: f32,
    /// Per-word score penalty
    pub word_penalty: f32,
    /// Skip computing hypothesis costs
    pub skip_cost: bool,
    /// Workspace size in megabytes
    pub workspace: usize,
    /// Alignment mode passed to the engine
    pub alignment: String,
    /// Document layout
    #[serde(
        deserialize_with = "deserialize_split_mode",
        serialize_with = "serialize_split_mode"
    )]
    pub ssplit_mode: SplitMode,
    /// Non-breaking prefixes replacing the built-in English list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssplit_prefixes: Option<Vec<String>>,
    /// Integer GEMM precision
    pub gemm_precision: String,
    /// Float precision of the parameters
    pub precision: Vec<String>,
    /// Padded word budget per engine call; one call for everything when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mini_batch_words: Option<usize>,
    /// Silence the engine logger
    pub quiet: bool,
    /// Silence per-sentence engine output
    pub quiet_translation: bool,
    /// Names of the loaded vocabularies
    pub vocabs: Vec<String>,
    /// Keys this crate does not interpret, handed to the backend unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            max_length_break: 128,
            max_length_factor: 2.0,
            beam_size: 1,
            normalize: 1.0,
            word_penalty: 0.0,
            skip_cost: true,
            workspace: 128,
            alignment: "soft".to_string(),
            ssplit_mode: SplitMode::Paragraph,
            ssplit_prefixes: None,
            gemm_precision: "int8shiftAlphaAll".to_string(),
            precision: vec!["float32".to_string()],
            mini_batch_words: None,
            quiet: true,
            quiet_translation: true,
            vocabs: FORCED_VOCABS.iter().map(|v| v.to_string()).collect(),
            extra: toml::Table::new(),
        }
    }
}

impl ModelOptions {
    /// Defaults overridden by `config`, then validated.
    ///
    /// `None` and blank text both yield the defaults.
    pub fn parse(config: Option<&str>) -> Result<Self> {
        let mut options = match config {
            Some(text) if !text.trim().is_empty() => toml::from_str::<ModelOptions>(text)?,
            _ => ModelOptions::default(),
        };

        if options.vocabs != FORCED_VOCABS {
            log::warn!(
                "ignoring vocabs = {:?}; vocabularies are supplied as buffers",
                options.vocabs
            );
            options.vocabs = FORCED_VOCABS.iter().map(|v| v.to_string()).collect();
        }

        options.validate()?;
        Ok(options)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.max_length_break == 0 {
            return Err(EngineError::ConfigError(
                "max-length-break must be greater than zero".to_string(),
            ));
        }
        if self.beam_size == 0 {
            return Err(EngineError::ConfigError(
                "beam-size must be greater than zero".to_string(),
            ));
        }
        if self.mini_batch_words == Some(0) {
            return Err(EngineError::ConfigError(
                "mini-batch-words must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Splitter honoring `ssplit-prefixes`
    pub fn splitter(&self) -> SentenceSplitter {
        match &self.ssplit_prefixes {
            Some(prefixes) => SentenceSplitter::with_prefixes(prefixes),
            None => SentenceSplitter::new(),
        }
    }

    /// Effective options as TOML text
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string(self)
            .map_err(|e| EngineError::ConfigError(format!("failed to render model options: {e}")))
    }
}

fn deserialize_split_mode<'de, D>(deserializer: D) -> std::result::Result<SplitMode, D::Error>
where
    D: Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    name.parse().map_err(serde::de::Error::custom)
}

fn serialize_split_mode<S>(mode: &SplitMode, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(mode.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_defaults() {
        let options = ModelOptions::parse(None).unwrap();
        assert_eq!(options, ModelOptions::default());
        assert_eq!(options.max_length_break, 128);
        assert_eq!(options.max_length_factor, 2.0);
        assert_eq!(options.beam_size, 1);
        assert_eq!(options.ssplit_mode, SplitMode::Paragraph);
        assert_eq!(options.gemm_precision, "int8shiftAlphaAll");
        assert_eq!(options.precision, vec!["float32"]);
        assert!(options.skip_cost);
        assert!(options.quiet && options.quiet_translation);
        assert_eq!(options.vocabs, FORCED_VOCABS);
        assert!(options.extra.is_empty());
    }

    #[test]
    fn test_blank_config_is_default() {
        assert_eq!(
            ModelOptions::parse(Some("  \n")).unwrap(),
            ModelOptions::default()
        );
    }

    #[test]
    fn test_overrides() {
        let options = ModelOptions::parse(Some(
            r#"
            max-length-break = 16
            beam-size = 4
            ssplit-mode = "wrapped_text"
            mini-batch-words = 512
            ssplit-prefixes = ["Sr", "Sra"]
            "#,
        ))
        .unwrap();

        assert_eq!(options.max_length_break, 16);
        assert_eq!(options.beam_size, 4);
        assert_eq!(options.ssplit_mode, SplitMode::WrappedText);
        assert_eq!(options.mini_batch_words, Some(512));
        assert_eq!(options.splitter().rules().prefixes.len(), 2);
        // untouched keys keep their defaults
        assert_eq!(options.workspace, 128);
        assert_eq!(options.alignment, "soft");
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let options = ModelOptions::parse(Some("cpu-threads = 2\nshortlist-mode = \"fast\"")).unwrap();
        assert_eq!(options.extra.get("cpu-threads").and_then(|v| v.as_integer()), Some(2));
        assert_eq!(
            options.extra.get("shortlist-mode").and_then(|v| v.as_str()),
            Some("fast")
        );
    }

    #[test]
    fn test_vocabs_are_forced() {
        let options = ModelOptions::parse(Some(r#"vocabs = ["a.spm", "b.spm"]"#)).unwrap();
        assert_eq!(options.vocabs, FORCED_VOCABS);
    }

    #[test]
    fn test_invalid_values() {
        for config in [
            "max-length-break = 0",
            "beam-size = 0",
            "mini-batch-words = 0",
            "ssplit-mode = \"lines\"",
            "max-length-break = \"long\"",
            "not toml at all",
        ] {
            let err = ModelOptions::parse(Some(config)).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Config, "{config}");
        }
    }

    #[test]
    fn test_unknown_split_mode_message() {
        let err = ModelOptions::parse(Some("ssplit-mode = \"lines\"")).unwrap_err();
        assert!(err.to_string().contains("unrecognized ssplit-mode: lines"));
    }

    #[test]
    fn test_render_round_trip() {
        let mut options = ModelOptions::default();
        options.beam_size = 3;
        options.extra.insert("cpu-threads".into(), toml::Value::Integer(4));

        let text = options.to_toml().unwrap();
        assert!(text.contains("ssplit-mode = \"paragraph\""));
        assert_eq!(ModelOptions::parse(Some(&text)).unwrap(), options);
    }
}
