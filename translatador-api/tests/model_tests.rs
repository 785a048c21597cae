//! High-level API against the stub backend

use std::collections::HashMap;
use std::sync::Arc;
use translatador_api::{
    compose, ApiError, ErrorKind, IdentityModel, ModelRef, PivotedTranslationModel,
    Translatador, TranslationBatch, TranslationModel,
};
use translatador_engine::testing::{vocabulary, weights, Scorer, StubBackend};

const ENGLISH: &[&str] = &["hello", "world", "Hello", "Goodbye"];
const SPANISH: &[&str] = &["hola", "mundo", "Hola", "Adios"];
const GERMAN: &[&str] = &["hallo", "welt", "Hallo", "Tschuess"];

fn native(source: &[&str], target: &[&str], scorer: Scorer) -> translatador_api::NativeModel {
    Translatador::builder()
        .backend(StubBackend::shared())
        .model(weights(scorer))
        .vocabs(vocabulary(source), vocabulary(target))
        .load()
        .unwrap()
}

#[test]
fn test_native_translate() {
    let model = native(SPANISH, ENGLISH, Scorer::Identity);
    assert_eq!(model.translate("Hola mundo.").unwrap(), "Hello world.");
    assert_eq!(
        model.translate_strings(&["hola", "", "Adios!"]).unwrap(),
        vec!["hello", "", "Goodbye!"]
    );
}

#[test]
fn test_builder_requires_model_and_vocab() {
    let err = Translatador::builder()
        .vocab(vocabulary(ENGLISH))
        .backend(StubBackend::shared())
        .load()
        .unwrap_err();
    assert!(matches!(err, ApiError::Config(_)));
    assert_eq!(err.kind(), ErrorKind::Config);

    let err = Translatador::builder()
        .model(weights(Scorer::Identity))
        .backend(StubBackend::shared())
        .load()
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error: missing translation model vocabularies"
    );
}

#[test]
fn test_builder_reports_load_failures() {
    let err = Translatador::builder()
        .model(b"garbage".to_vec())
        .vocab(vocabulary(ENGLISH))
        .backend(StubBackend::shared())
        .load()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ModelLoad);
}

#[test]
fn test_builder_passes_config() {
    let model = Translatador::builder()
        .backend(StubBackend::shared())
        .config("max-length-break = 1")
        .model(weights(Scorer::Reverse))
        .vocab(vocabulary(ENGLISH))
        .load()
        .unwrap();

    // one-word segments are unaffected by reversal
    assert_eq!(model.translate("hello world").unwrap(), "hello world");
}

#[test]
fn test_builder_reads_files() {
    let dir = tempfile::tempdir().unwrap();
    let model_path = dir.path().join("model.bin");
    let vocab_path = dir.path().join("vocab.spm");
    let config_path = dir.path().join("config.toml");
    std::fs::write(&model_path, weights(Scorer::Reverse)).unwrap();
    std::fs::write(&vocab_path, vocabulary(ENGLISH)).unwrap();
    std::fs::write(&config_path, "beam-size = 2\n").unwrap();

    let model = Translatador::builder()
        .backend(StubBackend::shared())
        .config_file(&config_path)
        .unwrap()
        .model_file(&model_path)
        .unwrap()
        .vocab_file(&vocab_path)
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(model.translate("hello world").unwrap(), "world hello");

    let err = Translatador::builder()
        .model_file(dir.path().join("missing.bin"))
        .unwrap_err();
    assert!(matches!(err, ApiError::Io(_)));
}

#[test]
fn test_closed_model() {
    let model = native(ENGLISH, ENGLISH, Scorer::Identity);
    model.close();
    assert!(model.is_closed());

    let err = model.translate("hello").unwrap_err();
    assert!(matches!(err, ApiError::ModelClosed));
    assert!(matches!(model.fork(), Err(ApiError::ModelClosed)));
}

#[test]
fn test_fork_outlives_original() {
    let model = native(ENGLISH, ENGLISH, Scorer::Reverse);
    let fork = model.fork().unwrap();
    model.close();

    assert_eq!(fork.translate("hello world").unwrap(), "world hello");
}

#[test]
fn test_forks_run_on_threads() {
    let model: ModelRef = Arc::new(native(SPANISH, ENGLISH, Scorer::Identity));
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let fork = model.fork().unwrap();
            std::thread::spawn(move || fork.translate("Hola mundo").unwrap())
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), "Hello world");
    }
}

#[test]
fn test_composed_models_pivot() {
    let es_en: ModelRef = Arc::new(native(SPANISH, ENGLISH, Scorer::Identity));
    let en_de: ModelRef = Arc::new(native(ENGLISH, GERMAN, Scorer::Reverse));
    let es_de = compose(es_en, en_de);

    assert_eq!(es_de.translate("Hola mundo.").unwrap(), "welt Hallo.");
    let forked = es_de.fork().unwrap();
    assert_eq!(forked.translate("Adios").unwrap(), "Tschuess");
}

#[test]
fn test_batch_keeps_tokenization_between_models() {
    let es_en = native(SPANISH, ENGLISH, Scorer::Identity);
    let pivot = es_en
        .translate_batch(&TranslationBatch::of(["Hola mundo."]))
        .unwrap();

    assert!(pivot.wrapped()[0].cached().is_some());
    assert_eq!(pivot.get(), vec!["Hello world."]);
}

#[test]
fn test_pivoted_model() {
    let encoders: HashMap<&str, ModelRef> = HashMap::from([
        ("es", Arc::new(native(SPANISH, ENGLISH, Scorer::Identity)) as ModelRef),
        ("en", Arc::new(IdentityModel) as ModelRef),
    ]);
    let decoders: HashMap<&str, ModelRef> = HashMap::from([
        ("de", Arc::new(native(ENGLISH, GERMAN, Scorer::Identity)) as ModelRef),
        ("en", Arc::new(IdentityModel) as ModelRef),
    ]);
    let pivoted = PivotedTranslationModel::new(encoders, decoders);

    let results = pivoted.translate(&"es", "Hola mundo!").unwrap();
    assert_eq!(results["en"], "Hello world!");
    assert_eq!(results["de"], "Hallo welt!");

    assert!(pivoted.translate(&"fr", "Bonjour").unwrap().is_empty());

    let batches = pivoted
        .fork()
        .unwrap()
        .translate_batch(&"en", &TranslationBatch::of(["hello", "world"]))
        .unwrap();
    assert_eq!(batches["de"].get(), vec!["hallo", "welt"]);
}
