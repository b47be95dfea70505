// Genre-overlap precision@K — an offline quality proxy.
//
// For a random sample of catalog items, take the top-K neighbors and count
// how many share at least one genre with the sampled item. Precision for
// that item is hits / K. The denominator is always K, so catalogs with
// fewer than K + 1 items cap precision below 1.0.
//
// Items without genres cannot be scored; they are counted and reported
// rather than silently dropped, so the effective sample size is auditable.
//
// The run also keeps a histogram of raw similarity scores (self excluded)
// drawn from the scored items, capped at SIMILARITY_SAMPLE_CAP values.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};

use super::histogram::Histogram;
use crate::catalog::Catalog;
use crate::error::RecommendError;
use crate::ranking::rank_scores;
use crate::similarity::traits::check_position;
use crate::similarity::SimilaritySource;

/// Neighbors checked per sampled item.
pub const DEFAULT_TOP_K: usize = 10;
/// Items sampled per evaluation run.
pub const DEFAULT_SAMPLE_SIZE: usize = 500;
/// Most raw similarity scores kept for the distribution histogram.
pub const SIMILARITY_SAMPLE_CAP: usize = 10_000;
/// Bins over [-1, 1] for the similarity distribution.
pub const SIMILARITY_BINS: usize = 20;

/// Evaluation knobs.
#[derive(Debug, Clone)]
pub struct EvaluationParams {
    pub sample_size: usize,
    pub k: usize,
    /// Fixed seed for a reproducible sample; None draws from the thread RNG
    pub seed: Option<u64>,
}

impl Default for EvaluationParams {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            k: DEFAULT_TOP_K,
            seed: None,
        }
    }
}

/// Outcome of one evaluation run.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    /// Precision@K for each scored item, in sample order
    pub per_item_scores: Vec<f64>,
    /// Catalog positions matching `per_item_scores` one-to-one
    pub evaluated_positions: Vec<usize>,
    /// Mean of `per_item_scores` (0.0 when nothing was scored)
    pub mean: f64,
    /// Items drawn from the catalog, including skipped ones
    pub sampled: usize,
    /// Sampled items excluded because they have no genres
    pub skipped_empty_genres: usize,
    pub k: usize,
    pub scorer: String,
    /// Raw neighbor scores over [-1, 1], sampled from the scored items
    pub similarity_distribution: Histogram,
    pub evaluated_at: DateTime<Utc>,
}

impl EvaluationReport {
    /// Number of items that contributed to the mean.
    pub fn scored(&self) -> usize {
        self.per_item_scores.len()
    }
}

/// Draw `sample_size` distinct positions (clamped to the catalog size).
pub fn sample_positions(catalog_len: usize, sample_size: usize, seed: Option<u64>) -> Vec<usize> {
    let amount = sample_size.min(catalog_len);
    if amount == 0 {
        return Vec::new();
    }
    let sample = match seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            rand::seq::index::sample(&mut rng, catalog_len, amount)
        }
        None => rand::seq::index::sample(&mut rand::rng(), catalog_len, amount),
    };
    sample.into_vec()
}

/// Fraction of `k` neighbors sharing a genre with the base item.
pub fn genre_precision(
    catalog: &Catalog,
    base: usize,
    neighbors: &[usize],
    k: usize,
) -> Option<f64> {
    let item = catalog.get(base)?;
    if item.genres.is_empty() || k == 0 {
        return None;
    }
    let hits = neighbors
        .iter()
        .filter_map(|&p| catalog.get(p))
        .filter(|n| item.shares_genre_with(n))
        .count();
    Some(hits as f64 / k as f64)
}

/// Evenly strided scores from one row, skipping `base`, at most `quota` of them.
fn stride_sample(base: usize, scores: &[f64], quota: usize, out: &mut Vec<f64>) {
    let others = scores.len().saturating_sub(1);
    if quota == 0 || others == 0 {
        return;
    }
    let step = others.div_ceil(quota).max(1);
    out.extend(
        scores
            .iter()
            .enumerate()
            .filter(|&(p, _)| p != base)
            .step_by(step)
            .take(quota)
            .map(|(_, &s)| s),
    );
}

/// Run an evaluation without progress reporting.
pub fn evaluate(
    catalog: &Catalog,
    source: &dyn SimilaritySource,
    params: &EvaluationParams,
) -> Result<EvaluationReport, RecommendError> {
    evaluate_with_progress(catalog, source, params, |_| {})
}

/// Run an evaluation, calling `on_item` after each sampled item.
pub fn evaluate_with_progress<F>(
    catalog: &Catalog,
    source: &dyn SimilaritySource,
    params: &EvaluationParams,
    mut on_item: F,
) -> Result<EvaluationReport, RecommendError>
where
    F: FnMut(usize),
{
    if params.k == 0 {
        return Err(RecommendError::InvalidParameter {
            name: "k",
            reason: "precision@K needs K >= 1".to_string(),
        });
    }

    let sample = sample_positions(catalog.len(), params.sample_size, params.seed);
    let mut per_item_scores = Vec::with_capacity(sample.len());
    let mut evaluated_positions = Vec::with_capacity(sample.len());
    let mut skipped_empty_genres = 0;
    let per_row_quota = SIMILARITY_SAMPLE_CAP / sample.len().max(1);
    let mut similarity_samples = Vec::new();

    for (done, &base) in sample.iter().enumerate() {
        let has_genres = catalog.get(base).is_some_and(|i| !i.genres.is_empty());
        if has_genres {
            check_position(base, source.len())?;
            let scores = source.score_all(base)?;
            stride_sample(base, &scores, per_row_quota, &mut similarity_samples);
            let neighbors: Vec<usize> = rank_scores(base, params.k, &scores)
                .into_iter()
                .map(|r| r.position)
                .collect();
            if let Some(precision) = genre_precision(catalog, base, &neighbors, params.k) {
                per_item_scores.push(precision);
                evaluated_positions.push(base);
            }
        } else {
            debug!(base, "Skipping item with no genres");
            skipped_empty_genres += 1;
        }
        on_item(done + 1);
    }

    let mean = if per_item_scores.is_empty() {
        0.0
    } else {
        per_item_scores.iter().sum::<f64>() / per_item_scores.len() as f64
    };

    info!(
        scorer = source.name(),
        sampled = sample.len(),
        scored = per_item_scores.len(),
        skipped = skipped_empty_genres,
        mean,
        similarity_samples = similarity_samples.len(),
        "Evaluation complete"
    );

    Ok(EvaluationReport {
        per_item_scores,
        evaluated_positions,
        mean,
        sampled: sample.len(),
        skipped_empty_genres,
        k: params.k,
        scorer: source.name().to_string(),
        similarity_distribution: Histogram::with_range(
            &similarity_samples,
            SIMILARITY_BINS,
            -1.0,
            1.0,
        ),
        evaluated_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_is_clamped_and_distinct() {
        let sample = sample_positions(5, 50, Some(7));
        assert_eq!(sample.len(), 5);
        let mut sorted = sample.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_sample_is_reproducible_with_seed() {
        assert_eq!(
            sample_positions(1000, 20, Some(42)),
            sample_positions(1000, 20, Some(42))
        );
    }

    #[test]
    fn test_stride_sample_skips_base_and_respects_quota() {
        let scores = [9.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6];
        let mut out = Vec::new();
        stride_sample(0, &scores, 3, &mut out);
        assert_eq!(out, vec![0.1, 0.3, 0.5]);

        let mut out = Vec::new();
        stride_sample(3, &scores, 100, &mut out);
        assert_eq!(out, vec![9.0, 0.1, 0.2, 0.4, 0.5, 0.6]);

        let mut out = Vec::new();
        stride_sample(0, &[1.0], 5, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn test_sample_empty_catalog() {
        assert!(sample_positions(0, 10, None).is_empty());
        assert!(sample_positions(10, 0, None).is_empty());
    }
}
