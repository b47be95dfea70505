// Poster lookup trait.
//
// Poster URLs are presentation data fetched from a remote catalog after
// ranking is finished. Implementations may fail or time out; callers treat
// that as "no poster", never as a failed recommendation.

use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait PosterSource: Send + Sync {
    /// Full image URL for the movie, or None if the catalog has no poster.
    async fn poster_url(&self, external_id: i64) -> Result<Option<String>>;
}

/// Used when no poster backend is configured. Every lookup is a clean miss.
pub struct NoopPosterSource;

#[async_trait]
impl PosterSource for NoopPosterSource {
    async fn poster_url(&self, _external_id: i64) -> Result<Option<String>> {
        Ok(None)
    }
}
