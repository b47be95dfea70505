// Posters — decorating ranked results with artwork after ranking.
//
// Lookups run with bounded concurrency and preserve the ranked order. Each
// lookup fails independently: a miss or an error turns into a placeholder
// image for that one movie and leaves the ranking untouched.

pub mod tmdb;
pub mod traits;

use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::engine::RecommendedMovie;
use traits::PosterSource;

/// Shown when the catalog has no poster for a movie.
pub const PLACEHOLDER_NO_IMAGE: &str = "https://via.placeholder.com/500x750?text=No+Image";
/// Shown when the poster lookup failed.
pub const PLACEHOLDER_ERROR: &str = "https://via.placeholder.com/500x750?text=Error";

/// Default number of concurrent poster lookups.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Poster URL for one movie, falling back to a placeholder on miss or error.
pub async fn poster_or_placeholder(source: &dyn PosterSource, external_id: i64) -> String {
    match source.poster_url(external_id).await {
        Ok(Some(url)) => url,
        Ok(None) => PLACEHOLDER_NO_IMAGE.to_string(),
        Err(e) => {
            warn!(external_id, error = %e, "Poster lookup failed");
            PLACEHOLDER_ERROR.to_string()
        }
    }
}

/// Fill `poster_url` on every movie. Order and scores are never changed.
pub async fn attach_posters(
    source: &dyn PosterSource,
    mut movies: Vec<RecommendedMovie>,
    concurrency: usize,
) -> Vec<RecommendedMovie> {
    let ids: Vec<i64> = movies.iter().map(|m| m.external_id).collect();

    let urls: Vec<String> = stream::iter(ids)
        .map(|id| poster_or_placeholder(source, id))
        .buffered(concurrency.max(1))
        .collect()
        .await;

    for (movie, url) in movies.iter_mut().zip(urls) {
        movie.poster_url = Some(url);
    }
    movies
}
