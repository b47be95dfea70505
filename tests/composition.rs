// Composition tests — verifying the modules chain together correctly.
//
// These tests exercise the data flow:
//   Artifacts -> Engine -> TitleIndex -> SimilaritySource -> top-K -> RecommendedMovie
// entirely in memory, without network calls or filesystem side effects.

use marquee::artifacts::Artifacts;
use marquee::catalog::{Catalog, CatalogRecord, DuplicatePolicy};
use marquee::engine::{EngineOptions, Recommender, ScorerChoice};
use marquee::error::RecommendError;
use marquee::evaluation::EvaluationParams;
use marquee::similarity::{
    EmbeddingMatrix, HybridWeights, PairwiseSimilarityMatrix, PopularityVector,
};

fn record(id: i64, title: &str, genres: &[&str]) -> CatalogRecord {
    CatalogRecord {
        movie_id: id,
        title: title.to_string(),
        genres: genres.iter().map(|g| g.to_string()).collect(),
        vote_count: None,
        vote_average: None,
    }
}

/// Unit embeddings with cos(A, B) = 0.9 and cos(A, C) = 0.1.
fn abc_engine() -> Recommender {
    let catalog = Catalog::from_records(vec![
        record(10, "A", &["Drama"]),
        record(20, "B", &["Drama"]),
        record(30, "C", &["Horror"]),
    ]);
    let embeddings = EmbeddingMatrix::new(vec![
        vec![1.0, 0.0],
        vec![0.9, 0.19f32.sqrt()],
        vec![0.1, 0.99f32.sqrt()],
    ])
    .unwrap();
    let artifacts = Artifacts {
        catalog,
        embeddings: Some(embeddings),
        similarity: None,
        popularity: None,
    };
    Recommender::from_artifacts(artifacts, &EngineOptions::default()).unwrap()
}

// ============================================================
// Chain: title -> embedding cosine -> ranked movies
// ============================================================

#[test]
fn recommend_ranks_by_embedding_cosine() {
    let engine = abc_engine();
    let movies = engine.recommend("A", 2, ScorerChoice::Embedding).unwrap();

    let ranked: Vec<(usize, &str)> = movies
        .iter()
        .map(|m| (m.position, m.title.as_str()))
        .collect();
    assert_eq!(ranked, vec![(1, "B"), (2, "C")]);
    assert!((movies[0].score - 0.9).abs() < 1e-5);
    assert!((movies[1].score - 0.1).abs() < 1e-5);
    assert_eq!(movies[0].external_id, 20);
    assert!(movies.iter().all(|m| m.poster_url.is_none()));
}

#[test]
fn recommend_never_includes_query_movie() {
    let engine = abc_engine();
    for title in ["A", "B", "C"] {
        let movies = engine.recommend(title, 10, ScorerChoice::Embedding).unwrap();
        assert_eq!(movies.len(), 2);
        assert!(movies.iter().all(|m| m.title != title));
    }
}

#[test]
fn recommend_is_case_insensitive() {
    let engine = abc_engine();
    let upper = engine.recommend("A", 2, ScorerChoice::Embedding).unwrap();
    let lower = engine.recommend("  a ", 2, ScorerChoice::Embedding).unwrap();
    assert_eq!(upper, lower);
}

#[test]
fn unknown_title_is_title_not_found() {
    let engine = abc_engine();
    let err = engine
        .recommend("NonexistentTitle123", 5, ScorerChoice::Embedding)
        .unwrap_err();
    assert_eq!(
        err,
        RecommendError::TitleNotFound {
            query: "NonexistentTitle123".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "Movie 'NonexistentTitle123' not found in database!"
    );
}

#[test]
fn missing_scorer_is_reported_not_panicked() {
    let engine = abc_engine();
    let err = engine.recommend("A", 2, ScorerChoice::Matrix).unwrap_err();
    assert!(matches!(err, RecommendError::ScorerUnavailable { .. }));
}

// ============================================================
// Chain: matrix + popularity -> hybrid -> ranked movies
// ============================================================

fn hybrid_engine(weights: HybridWeights) -> Recommender {
    let catalog = Catalog::from_records(vec![
        record(1, "Alien", &["Horror", "Science Fiction"]),
        record(2, "Aliens", &["Action", "Science Fiction"]),
        record(3, "Alien 3", &["Science Fiction"]),
        record(4, "Prometheus", &["Science Fiction"]),
    ]);
    let similarity = PairwiseSimilarityMatrix::new(vec![
        vec![1.0, 0.8, 0.7, 0.6],
        vec![0.8, 1.0, 0.5, 0.4],
        vec![0.7, 0.5, 1.0, 0.3],
        vec![0.6, 0.4, 0.3, 1.0],
    ])
    .unwrap();
    let popularity = PopularityVector::new(vec![1.0, 0.2, 0.0, 1.0]).unwrap();
    let artifacts = Artifacts {
        catalog,
        embeddings: None,
        similarity: Some(similarity),
        popularity: Some(popularity),
    };
    let options = EngineOptions {
        weights,
        duplicate_policy: DuplicatePolicy::FirstInserted,
    };
    Recommender::from_artifacts(artifacts, &options).unwrap()
}

#[test]
fn hybrid_without_embeddings_renormalizes_remaining_weights() {
    let engine = hybrid_engine(HybridWeights::default());
    // Lexical 0.6, popularity 0.4 after dropping the semantic weight.
    let movies = engine.recommend("Alien", 3, ScorerChoice::Hybrid).unwrap();
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Prometheus", "Aliens", "Alien 3"]);
    assert!((movies[0].score - (0.6 * 0.6 + 0.4 * 1.0)).abs() < 1e-9);
}

#[test]
fn matrix_scorer_ignores_popularity() {
    let engine = hybrid_engine(HybridWeights::default());
    let movies = engine.recommend("Alien", 3, ScorerChoice::Matrix).unwrap();
    let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
    assert_eq!(titles, vec!["Aliens", "Alien 3", "Prometheus"]);
}

#[test]
fn evaluation_runs_through_engine() {
    let engine = hybrid_engine(HybridWeights::default());
    let params = EvaluationParams {
        sample_size: 10,
        k: 2,
        seed: Some(3),
    };
    let report = engine.evaluate(&params, ScorerChoice::Matrix).unwrap();
    assert_eq!(report.sampled, 4);
    assert_eq!(report.scorer, "matrix");
    // Every movie shares Science Fiction with every other.
    assert!((report.mean - 1.0).abs() < 1e-9);
}

// ============================================================
// Duplicate titles through the engine
// ============================================================

#[test]
fn duplicate_title_uses_first_inserted_position() {
    let mut records: Vec<CatalogRecord> = (0..10)
        .map(|i| record(i, &format!("Movie {i}"), &["Drama"]))
        .collect();
    records[3].title = "Batman".to_string();
    records[9].title = "Batman".to_string();
    let rows: Vec<Vec<f32>> = (0..10).map(|i| vec![1.0, i as f32]).collect();
    let artifacts = Artifacts {
        catalog: Catalog::from_records(records),
        embeddings: Some(EmbeddingMatrix::new(rows).unwrap()),
        similarity: None,
        popularity: None,
    };
    let engine = Recommender::from_artifacts(artifacts, &EngineOptions::default()).unwrap();

    assert_eq!(engine.resolve("batman"), Some(3));
    let movies = engine.recommend("BATMAN", 3, ScorerChoice::Embedding).unwrap();
    assert!(movies.iter().all(|m| m.position != 3));
}
