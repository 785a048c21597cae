//! Basic usage of the high-level API
//!
//! Uses the in-process stub engine so it runs without model files.
//! Run with: cargo run -p translatador-api --example basic_usage

use std::collections::HashMap;
use std::sync::Arc;
use translatador_api::{
    compose, detect_language, IdentityModel, ModelRef, PivotedTranslationModel, Translatador,
    TranslationBatch, TranslationModel,
};
use translatador_engine::testing::{vocabulary, weights, Scorer, StubBackend};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let backend = StubBackend::shared();

    // Method 1: Load a model and translate single strings
    println!("=== Method 1: Single Model ===");
    let es_en = Translatador::builder()
        .backend(backend.clone())
        .model(weights(Scorer::Identity))
        .vocabs(
            vocabulary(&["hola", "mundo", "Hola", "Adios"]),
            vocabulary(&["hello", "world", "Hello", "Goodbye"]),
        )
        .load()?;
    println!("{}", es_en.translate("Hola mundo. Adios!")?);

    // Method 2: Batches keep their tokenization between models
    println!("\n=== Method 2: Batches ===");
    let batch = TranslationBatch::of(["Hola", "mundo"]);
    let translated = es_en.translate_batch(&batch)?;
    println!("{batch} -> {translated}");

    // Method 3: Compose through a pivot language
    println!("\n=== Method 3: Composition ===");
    let es_en: ModelRef = Arc::new(es_en);
    let en_de: ModelRef = Arc::new(
        Translatador::builder()
            .backend(backend.clone())
            .model(weights(Scorer::Identity))
            .vocabs(
                vocabulary(&["hello", "world", "Hello", "Goodbye"]),
                vocabulary(&["hallo", "welt", "Hallo", "Tschuess"]),
            )
            .load()?,
    );
    let es_de = compose(es_en.clone(), en_de.clone());
    println!("{}", es_de.translate("Hola mundo")?);

    // Method 4: Many-to-many through one pivot
    println!("\n=== Method 4: Pivoted Model ===");
    let pivoted = PivotedTranslationModel::new(
        HashMap::from([("es", es_en), ("en", Arc::new(IdentityModel) as ModelRef)]),
        HashMap::from([("de", en_de), ("en", Arc::new(IdentityModel) as ModelRef)]),
    );
    for (language, text) in pivoted.translate(&"es", "Adios mundo")? {
        println!("  {language}: {text}");
    }

    // Method 5: Language detection
    println!("\n=== Method 5: Language Detection ===");
    match detect_language("Der schnelle braune Fuchs springt über den faulen Hund.") {
        Ok(Some(detected)) => println!(
            "{} ({}) with confidence {:.2}",
            detected.name, detected.code, detected.confidence
        ),
        Ok(None) => println!("no language detected"),
        Err(err) => println!("{err}"),
    }

    Ok(())
}
