// TMDB poster client.
//
// Looks up `/3/movie/{id}` and builds a w500 image URL from `poster_path`.
// Every request carries a hard timeout so a slow image service can only
// delay the poster, not the recommendation list it decorates.
//
// API docs: https://developer.themoviedb.org/reference/movie-details

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::traits::PosterSource;

pub const DEFAULT_TMDB_API_URL: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p/w500/";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct MovieDetails {
    poster_path: Option<String>,
}

/// Build the full image URL from TMDB's relative poster path.
pub fn image_url(poster_path: &str) -> String {
    format!("{}{}", TMDB_IMAGE_BASE, poster_path.trim_start_matches('/'))
}

pub struct TmdbPosterClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbPosterClient {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
        Self::with_base_url(api_key, timeout, DEFAULT_TMDB_API_URL)
    }

    pub fn with_base_url(api_key: String, timeout: Duration, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent("marquee/0.1 (movie-recommendations)")
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PosterSource for TmdbPosterClient {
    async fn poster_url(&self, external_id: i64) -> Result<Option<String>> {
        let url = format!("{}/movie/{}", self.base_url, external_id);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .send()
            .await
            .with_context(|| format!("Failed to fetch TMDB details for movie {external_id}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "TMDB returned {} for movie {}",
                response.status(),
                external_id
            );
        }

        let details: MovieDetails = response
            .json()
            .await
            .context("Failed to parse TMDB movie details")?;

        debug!(external_id, has_poster = details.poster_path.is_some(), "Fetched TMDB details");

        Ok(details
            .poster_path
            .filter(|p| !p.is_empty())
            .map(|p| image_url(&p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_url_joins_without_double_slash() {
        assert_eq!(
            image_url("/kqjL17yufvn9OVLyXYpvtyrFfak.jpg"),
            "https://image.tmdb.org/t/p/w500/kqjL17yufvn9OVLyXYpvtyrFfak.jpg"
        );
    }

    #[test]
    fn test_client_builds() {
        let client = TmdbPosterClient::with_base_url(
            "test-key".to_string(),
            DEFAULT_TIMEOUT,
            "http://localhost:9/3/",
        )
        .unwrap();
        assert_eq!(client.base_url, "http://localhost:9/3");
    }
}
