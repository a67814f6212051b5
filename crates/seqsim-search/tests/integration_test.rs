//! Integration tests for the full sequence → prediction pipeline.
//!
//! These tests build a small SQLite corpus on disk and a scaler artifact,
//! then drive predictions through the same initialization path the CLI uses.

use std::path::Path;
use std::sync::Arc;

use seqsim_core::alphabet::AMINO_ACIDS;
use seqsim_core::schema::fixtures::write_corpus;
use seqsim_core::{extract, ReferenceEntry, ScaledFeatureVector, FEATURE_DIM};
use seqsim_search::{Config, Predictor, SearchContext, SearchError, SearchMode};
use tempfile::TempDir;

/// Deterministic pseudo-random protein of `len` residues.
fn synthetic_sequence(seed: u64, len: usize) -> String {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            let index = usize::try_from((state >> 33) % 20).unwrap();
            char::from(AMINO_ACIDS[index])
        })
        .collect()
}

/// Entry whose stored features are the raw features of `sequence`; with the
/// identity scaler, distances are plain feature-space distances.
fn entry(id: &str, sequence: &str) -> ReferenceEntry {
    let raw = extract(sequence).unwrap();
    ReferenceEntry::new(
        id,
        format!("synthetic protein {id}"),
        sequence,
        ScaledFeatureVector::new(*raw.values()).unwrap(),
    )
    .with_organism("Synthetica exempli")
}

fn corpus_entries(count: u64) -> Vec<ReferenceEntry> {
    (0..count)
        .map(|i| {
            let len = 40 + usize::try_from((i * 13) % 200).unwrap();
            entry(&format!("P{i:05}"), &synthetic_sequence(i, len))
        })
        .collect()
}

fn write_identity_scaler(path: &Path) {
    let json = serde_json::json!({
        "mean": vec![0.0; FEATURE_DIM],
        "scale": vec![1.0; FEATURE_DIM],
    });
    std::fs::write(path, json.to_string()).unwrap();
}

struct Fixture {
    _dir: TempDir,
    config: Config,
    entries: Vec<ReferenceEntry>,
}

fn fixture(count: u64) -> Fixture {
    fixture_with(corpus_entries(count))
}

fn fixture_with(entries: Vec<ReferenceEntry>) -> Fixture {
    let dir = TempDir::new().unwrap();
    let config = Config::default()
        .with_database_path(dir.path().join("corpus.db"))
        .with_scaler_path(dir.path().join("scaler.json"));
    write_corpus(&config.database_path, &entries).unwrap();
    write_identity_scaler(&config.scaler_path);
    Fixture {
        _dir: dir,
        config,
        entries,
    }
}

fn predictor(fixture: &Fixture) -> Predictor {
    let context = SearchContext::init(&fixture.config).expect("Failed to init context");
    Predictor::from_config(context, &fixture.config).expect("Failed to build predictor")
}

/// A corpus sequence used as a query finds itself first in both modes.
#[test]
fn test_fast_mode_recalls_exhaustive_top_hit() {
    let fixture = fixture(300);
    let predictor = predictor(&fixture);

    for entry in fixture.entries.iter().step_by(37) {
        let fast = predictor
            .predict(&entry.sequence, 5, SearchMode::Fast)
            .unwrap();
        let exhaustive = predictor
            .predict(&entry.sequence, 5, SearchMode::Exhaustive)
            .unwrap();

        let fast_best = fast.best().unwrap();
        let exhaustive_best = exhaustive.best().unwrap();
        assert_eq!(fast_best.id, exhaustive_best.id);
        assert!(fast_best.distance < 1e-12);
        assert!(fast.candidates_scored <= exhaustive.candidates_scored);
        assert_eq!(exhaustive.candidates_scored, 300);
    }
}

/// 100 residues, every residue five times.
fn balanced_member() -> String {
    "ACDEFGHIKLMNPQRSTVWY".repeat(5)
}

/// `balanced_member` with every fifth residue substituted by tryptophan.
fn mutated_query() -> String {
    balanced_member()
        .chars()
        .enumerate()
        .map(|(i, residue)| if i % 5 == 0 { 'W' } else { residue })
        .collect()
}

/// A query that is not itself in the corpus still agrees across modes when
/// its nearest neighbour lies inside the length window.
#[test]
fn test_fast_mode_recalls_inexact_neighbour() {
    let query = mutated_query();
    let fixture = fixture_with(vec![
        entry("poly_g", &"G".repeat(100)),
        entry("member", &balanced_member()),
        entry("long", &synthetic_sequence(3, 300)),
        entry("short", &synthetic_sequence(5, 30)),
    ]);
    let predictor = predictor(&fixture);

    let fast = predictor.predict(&query, 5, SearchMode::Fast).unwrap();
    let exhaustive = predictor
        .predict(&query, 5, SearchMode::Exhaustive)
        .unwrap();

    let fast_best = fast.best().unwrap();
    assert_eq!(fast_best.id.as_str(), "member");
    assert_eq!(fast_best.id, exhaustive.best().unwrap().id);
    assert!(fast_best.distance > 0.1, "distance {}", fast_best.distance);
    assert!(fast_best.similarity < 100.0);
    assert_eq!(fast.candidates_scored, 2);
    assert_eq!(exhaustive.candidates_scored, 4);
}

/// An entry just past the window can be closer in feature space than the
/// best in-window entry; only the exhaustive scan finds it.
#[test]
fn test_exhaustive_mode_finds_neighbour_outside_window() {
    let query = mutated_query();
    // Same composition as the query, 121 residues: above the [80, 120] window.
    let decoy = format!("{query}{}", &query[..21]);
    let fixture = fixture_with(vec![
        entry("member", &balanced_member()),
        entry("decoy", &decoy),
        entry("poly_g", &"G".repeat(100)),
    ]);
    let predictor = predictor(&fixture);

    let fast = predictor.predict(&query, 5, SearchMode::Fast).unwrap();
    let exhaustive = predictor
        .predict(&query, 5, SearchMode::Exhaustive)
        .unwrap();

    assert_eq!(fast.strategy, "length window [80, 120]");
    assert!(fast.results.iter().all(|r| r.id.as_str() != "decoy"));
    let fast_best = fast.best().unwrap();
    assert_eq!(fast_best.id.as_str(), "member");

    let exhaustive_best = exhaustive.best().unwrap();
    assert_eq!(exhaustive_best.id.as_str(), "decoy");
    assert_eq!(exhaustive_best.sequence_length, 121);
    assert!(exhaustive_best.distance > 0.0);
    assert!(exhaustive_best.distance < fast_best.distance);
    assert_eq!(exhaustive.results[1].id.as_str(), "member");
}

#[test]
fn test_results_are_ordered_and_bounded() {
    let fixture = fixture(120);
    let predictor = predictor(&fixture);
    let query = synthetic_sequence(9_999, 150);

    let prediction = predictor.predict(&query, 10, SearchMode::Exhaustive).unwrap();
    assert_eq!(prediction.results.len(), 10);
    for (i, result) in prediction.results.iter().enumerate() {
        assert_eq!(result.rank, i + 1);
        assert!((0.0..=100.0).contains(&result.similarity));
        assert!(result.sequence_snippet.chars().count() <= 53);
    }
    assert!(prediction
        .results
        .windows(2)
        .all(|w| w[0].distance <= w[1].distance));
}

#[test]
fn test_predictions_are_deterministic() {
    let fixture = fixture(80);
    let predictor = predictor(&fixture);
    let query = synthetic_sequence(4_242, 100);

    let first = predictor.predict(&query, 8, SearchMode::Fast).unwrap();
    let second = predictor.predict(&query, 8, SearchMode::Fast).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.results, second.results);
}

#[test]
fn test_empty_length_window_reports_no_candidates() {
    let fixture = fixture(50);
    let predictor = predictor(&fixture);
    // Corpus lengths are 40..=239; a 1000-residue window starts at 800.
    let query = synthetic_sequence(7, 1000);

    let err = predictor.predict(&query, 5, SearchMode::Fast).unwrap_err();
    assert!(err.is_no_candidates(), "unexpected error: {err}");
    assert!(err.is_recoverable());

    let prediction = predictor
        .predict(&query, 5, SearchMode::Exhaustive)
        .unwrap();
    assert_eq!(prediction.results.len(), 5);
}

#[test]
fn test_missing_artifacts_fail_initialization() {
    let dir = TempDir::new().unwrap();
    let config = Config::default()
        .with_database_path(dir.path().join("absent.db"))
        .with_scaler_path(dir.path().join("absent.json"));
    let err = SearchContext::init(&config).unwrap_err();
    assert!(matches!(err, seqsim_core::Error::Initialization(_)));
}

#[test]
fn test_prediction_serializes_to_json() {
    let fixture = fixture(30);
    let predictor = predictor(&fixture);
    let prediction = predictor
        .predict(&fixture.entries[3].sequence, 3, SearchMode::Exhaustive)
        .unwrap();

    let json = serde_json::to_value(&prediction).unwrap();
    assert_eq!(json["mode"], "exhaustive");
    assert_eq!(json["results"].as_array().unwrap().len(), 3);
    assert_eq!(json["results"][0]["id"], "P00003");
    assert!(json["timing"]["total_ms"].is_number());
}

/// Concurrent async predictions share one context.
#[tokio::test]
async fn test_concurrent_async_predictions() {
    let fixture = fixture(200);
    let predictor = Arc::new(predictor(&fixture));

    let handles: Vec<_> = fixture
        .entries
        .iter()
        .take(16)
        .map(|entry| {
            let predictor = Arc::clone(&predictor);
            let expected = entry.id.clone();
            let sequence = entry.sequence.clone();
            tokio::spawn(async move {
                let prediction = predictor
                    .predict_async(sequence, 3, SearchMode::Fast)
                    .await
                    .unwrap();
                assert_eq!(prediction.best().unwrap().id, expected);
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }
}

#[test]
fn test_degenerate_query() {
    let fixture = fixture(10);
    let predictor = predictor(&fixture);
    let err = predictor.predict("XXXX", 5, SearchMode::Fast).unwrap_err();
    assert!(matches!(err, SearchError::DegenerateInput(_)));
}
