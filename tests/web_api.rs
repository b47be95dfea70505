// HTTP API tests, driven through the router with tower's oneshot.
//
// Only built with `--features web`.

#![cfg(feature = "web")]

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use marquee::artifacts::Artifacts;
use marquee::catalog::{Catalog, CatalogRecord, DuplicatePolicy};
use marquee::config::Config;
use marquee::engine::{EngineOptions, Recommender, ScorerChoice};
use marquee::posters::traits::NoopPosterSource;
use marquee::similarity::{EmbeddingMatrix, HybridWeights};
use marquee::web::{build_router, AppState};

fn config() -> Config {
    Config {
        artifact_dir: PathBuf::from("/nonexistent"),
        default_scorer: ScorerChoice::Embedding,
        default_top_k: 5,
        weights: HybridWeights::default(),
        duplicate_policy: DuplicatePolicy::FirstInserted,
        tmdb_api_key: String::new(),
        poster_timeout: Duration::from_secs(5),
    }
}

fn ready_engine() -> Recommender {
    let records = ["Avatar", "Titanic", "The Terminator"]
        .iter()
        .enumerate()
        .map(|(i, title)| CatalogRecord {
            movie_id: i as i64 + 1,
            title: title.to_string(),
            genres: vec!["Drama".to_string()],
            vote_count: None,
            vote_average: None,
        })
        .collect();
    let embeddings =
        EmbeddingMatrix::new(vec![vec![1.0, 0.0], vec![0.2, 1.0], vec![0.9, 0.3]]).unwrap();
    let artifacts = Artifacts {
        catalog: Catalog::from_records(records),
        embeddings: Some(embeddings),
        similarity: None,
        popularity: None,
    };
    Recommender::from_artifacts(artifacts, &EngineOptions::default()).unwrap()
}

fn router(engine: Recommender) -> axum::Router {
    build_router(AppState {
        engine: Arc::new(engine),
        posters: Arc::new(NoopPosterSource),
        config: Arc::new(config()),
    })
}

async fn get(engine: Recommender, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = router(engine)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn recommend_returns_ranked_results() {
    let (status, body) = get(ready_engine(), "/api/recommend?title=avatar&k=2").await;
    assert_eq!(status, StatusCode::OK);
    let titles: Vec<&str> = body["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["The Terminator", "Titanic"]);
    assert_eq!(body["scorer"], "embedding");
}

#[tokio::test]
async fn unknown_title_is_404_with_message() {
    let (status, body) = get(ready_engine(), "/api/recommend?title=Nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie 'Nope' not found in database!");
}

#[tokio::test]
async fn missing_title_is_400() {
    let (status, body) = get(ready_engine(), "/api/recommend").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Please select a movie.");
}

#[tokio::test]
async fn negative_k_returns_empty_list() {
    let (status, body) = get(ready_engine(), "/api/recommend?title=Avatar&k=-3").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unavailable_engine_is_503_but_healthy() {
    let (status, _) = get(
        Recommender::unavailable("movies.json missing"),
        "/api/recommend?title=Avatar",
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, body) = get(Recommender::unavailable("movies.json missing"), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["engine"]["reason"], "movies.json missing");
}

#[tokio::test]
async fn titles_can_be_filtered() {
    let (status, body) = get(ready_engine(), "/api/titles?q=TI").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["titles"][0], "Titanic");
}
