// Poster decoration tests with in-memory PosterSource mocks.
//
// A failing or empty lookup must degrade to a placeholder for that one movie
// and never reorder or drop recommendations.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;

use marquee::engine::RecommendedMovie;
use marquee::posters::tmdb::image_url;
use marquee::posters::traits::{NoopPosterSource, PosterSource};
use marquee::posters::{attach_posters, PLACEHOLDER_ERROR, PLACEHOLDER_NO_IMAGE};

/// Known posters by id; id 0 fails, anything else is a miss.
struct MockPosters(HashMap<i64, String>);

#[async_trait]
impl PosterSource for MockPosters {
    async fn poster_url(&self, external_id: i64) -> Result<Option<String>> {
        if external_id == 0 {
            anyhow::bail!("simulated timeout");
        }
        Ok(self.0.get(&external_id).cloned())
    }
}

fn movie(position: usize, external_id: i64, score: f64) -> RecommendedMovie {
    RecommendedMovie {
        position,
        external_id,
        title: format!("Movie {position}"),
        score,
        poster_url: None,
    }
}

#[tokio::test]
async fn attaches_posters_in_ranked_order() {
    let source = MockPosters(HashMap::from([
        (10, image_url("/a.jpg")),
        (30, image_url("c.jpg")),
    ]));
    let movies = vec![movie(4, 10, 0.9), movie(2, 0, 0.8), movie(7, 20, 0.5), movie(1, 30, 0.1)];

    let decorated = attach_posters(&source, movies.clone(), 2).await;

    assert_eq!(decorated.len(), 4);
    for (before, after) in movies.iter().zip(&decorated) {
        assert_eq!(before.position, after.position);
        assert_eq!(before.score, after.score);
    }
    let urls: Vec<&str> = decorated
        .iter()
        .map(|m| m.poster_url.as_deref().unwrap())
        .collect();
    assert_eq!(
        urls,
        vec![
            "https://image.tmdb.org/t/p/w500/a.jpg",
            PLACEHOLDER_ERROR,
            PLACEHOLDER_NO_IMAGE,
            "https://image.tmdb.org/t/p/w500/c.jpg",
        ]
    );
}

#[tokio::test]
async fn noop_source_yields_no_image_placeholders() {
    let decorated = attach_posters(&NoopPosterSource, vec![movie(0, 1, 0.5)], 5).await;
    assert_eq!(decorated[0].poster_url.as_deref(), Some(PLACEHOLDER_NO_IMAGE));
}

#[tokio::test]
async fn empty_list_stays_empty() {
    let decorated = attach_posters(&NoopPosterSource, Vec::new(), 5).await;
    assert!(decorated.is_empty());
}
