use super::*;

fn magnitude(vector: &[f32]) -> f32 {
    vector.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[test]
fn empty_input_is_zero_vector() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    for input in ["", "   ", "\t\n"] {
        let vector = embedder.embed(input).expect("hash embedding cannot fail");
        assert_eq!(vector.len(), DEFAULT_DIMENSION);
        assert!(vector.iter().all(|v| *v == 0.0), "input {:?}", input);
    }
}

#[test]
fn stop_words_and_short_tokens_carry_no_signal() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    let vector = embedder
        .embed("the and of a I to")
        .expect("hash embedding cannot fail");
    assert!(vector.iter().all(|v| *v == 0.0));
}

#[test]
fn embedding_is_deterministic() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    let text = "Phishing is a common attack against email users.";
    let first = embedder.embed(text).expect("hash embedding cannot fail");
    let second = embedder.embed(text).expect("hash embedding cannot fail");
    assert_eq!(first, second);
}

#[test]
fn non_empty_text_is_unit_length() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    let vector = embedder
        .embed("Security awareness training reduces risk.")
        .expect("hash embedding cannot fail");
    assert!((magnitude(&vector) - 1.0).abs() < 1e-5);
}

#[test]
fn dimension_is_configurable() {
    let embedder = HashEmbedder::new(64);
    let vector = embedder.embed("hello world").expect("hash embedding cannot fail");
    assert_eq!(vector.len(), 64);
    assert_eq!(embedder.dimension(), 64);
}

#[test]
fn casing_and_punctuation_do_not_matter() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    let plain = embedder
        .embed("phishing attack email")
        .expect("hash embedding cannot fail");
    let noisy = embedder
        .embed("Phishing! Attack?? EMAIL...")
        .expect("hash embedding cannot fail");
    assert_eq!(plain, noisy);
}

#[test]
fn related_text_scores_higher_than_unrelated() {
    let embedder = HashEmbedder::new(DEFAULT_DIMENSION);
    let document = embedder
        .embed("Phishing is a common attack using deceptive email messages.")
        .expect("hash embedding cannot fail");
    let related = embedder
        .embed("phishing email")
        .expect("hash embedding cannot fail");
    let unrelated = embedder
        .embed("quarterly revenue spreadsheet")
        .expect("hash embedding cannot fail");

    let related_score = embedder
        .similarity(&document, &related)
        .expect("dimensions match");
    let unrelated_score = embedder
        .similarity(&document, &unrelated)
        .expect("dimensions match");
    assert!(
        related_score > unrelated_score,
        "related {} should beat unrelated {}",
        related_score,
        unrelated_score
    );
}

#[test]
fn token_hash_is_stable() {
    assert_eq!(token_hash("phishing"), token_hash("phishing"));
    assert_ne!(token_hash("phishing"), token_hash("phishinh"));
}
