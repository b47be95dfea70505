use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::catalog::DuplicatePolicy;
use crate::engine::{EngineOptions, ScorerChoice};
use crate::similarity::HybridWeights;

/// Number of recommendations shown when the caller doesn't say.
pub const DEFAULT_TOP_K: usize = 5;

/// Central configuration loaded from environment variables.
///
/// Secrets (the TMDB key) only ever come from the environment. The .env
/// file is loaded at startup via dotenvy before this runs.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding movies.json and the similarity artifacts
    pub artifact_dir: PathBuf,
    /// Scorer used when a request doesn't pick one
    pub default_scorer: ScorerChoice,
    pub default_top_k: usize,
    pub weights: HybridWeights,
    pub duplicate_policy: DuplicatePolicy,
    /// TMDB API key for poster lookups (empty disables posters)
    pub tmdb_api_key: String,
    pub poster_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Everything has a default; malformed values are errors rather than
    /// silently replaced, so a typo in .env is caught at startup.
    pub fn load() -> Result<Self> {
        let artifact_dir = env::var("MARQUEE_ARTIFACT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::artifacts::default_artifact_dir());

        let default_scorer = match env::var("MARQUEE_SCORER") {
            Ok(s) => s.parse().map_err(anyhow::Error::msg)?,
            Err(_) => ScorerChoice::default(),
        };

        let duplicate_policy = match env::var("MARQUEE_DUPLICATE_POLICY") {
            Ok(s) => s.parse().map_err(anyhow::Error::msg)?,
            Err(_) => DuplicatePolicy::default(),
        };

        let defaults = HybridWeights::default();
        let weights = HybridWeights {
            semantic: parse_var("MARQUEE_WEIGHT_SEMANTIC", defaults.semantic)?,
            lexical: parse_var("MARQUEE_WEIGHT_LEXICAL", defaults.lexical)?,
            popularity: parse_var("MARQUEE_WEIGHT_POPULARITY", defaults.popularity)?,
        };
        if (weights.sum() - 1.0).abs() > 1e-6 {
            anyhow::bail!(
                "Hybrid weights must sum to 1.0 (got {:.4}).\n\
                 Check MARQUEE_WEIGHT_SEMANTIC, MARQUEE_WEIGHT_LEXICAL and MARQUEE_WEIGHT_POPULARITY.",
                weights.sum()
            );
        }

        Ok(Self {
            artifact_dir,
            default_scorer,
            default_top_k: parse_var("MARQUEE_TOP_K", DEFAULT_TOP_K)?,
            weights,
            duplicate_policy,
            tmdb_api_key: env::var("TMDB_API_KEY").unwrap_or_default(),
            poster_timeout: Duration::from_secs(parse_var("MARQUEE_POSTER_TIMEOUT_SECS", 5u64)?),
        })
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            weights: self.weights,
            duplicate_policy: self.duplicate_policy,
        }
    }

    /// Check that the TMDB key is configured.
    /// Call this before any operation that needs poster lookups.
    pub fn require_tmdb(&self) -> Result<()> {
        if self.tmdb_api_key.is_empty() {
            anyhow::bail!(
                "TMDB_API_KEY not set. Add it to your .env file to enable posters."
            );
        }
        Ok(())
    }
}

/// Read and parse an env var, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}
