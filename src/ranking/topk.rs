// Top-K neighbor selection.
//
// Ordering is score descending, then position ascending, so equal scores
// always come out in catalog order. The base item is removed before
// ordering and can never appear in its own neighbor list, even when another
// item ties it. NaN scores (only possible from a corrupt artifact) sort after
// every real score.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::RecommendError;
use crate::similarity::traits::{check_position, SimilaritySource};

/// One ranked neighbor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub position: usize,
    pub score: f64,
}

/// Total order used for ranking: higher score first, lower position on ties.
///
/// NaN of either sign goes last; `total_cmp` alone would rank positive NaN
/// above every number.
fn ranking_order(a: &Recommendation, b: &Recommendation) -> Ordering {
    a.score
        .is_nan()
        .cmp(&b.score.is_nan())
        .then_with(|| b.score.total_cmp(&a.score))
        .then_with(|| a.position.cmp(&b.position))
}

/// Rank a precomputed score vector, excluding `base`.
///
/// Returns at most `k` entries; fewer when the vector has fewer than `k + 1`
/// positions.
pub fn rank_scores(base: usize, k: usize, scores: &[f64]) -> Vec<Recommendation> {
    if k == 0 {
        return Vec::new();
    }

    let mut candidates: Vec<Recommendation> = scores
        .iter()
        .enumerate()
        .filter(|&(position, _)| position != base)
        .map(|(position, &score)| Recommendation { position, score })
        .collect();

    // Partition first so only the k winners get fully sorted
    if k < candidates.len() {
        candidates.select_nth_unstable_by(k - 1, ranking_order);
        candidates.truncate(k);
    }
    candidates.sort_by(ranking_order);
    candidates
}

/// Score every position against `base` with `source` and keep the best `k`.
pub fn top_k(
    base: usize,
    k: usize,
    source: &dyn SimilaritySource,
) -> Result<Vec<Recommendation>, RecommendError> {
    check_position(base, source.len())?;
    if k == 0 {
        return Ok(Vec::new());
    }
    let scores = source.score_all(base)?;
    Ok(rank_scores(base, k, &scores))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn positions(recs: &[Recommendation]) -> Vec<usize> {
        recs.iter().map(|r| r.position).collect()
    }

    #[test]
    fn test_orders_by_score_descending() {
        let recs = rank_scores(0, 3, &[1.0, 0.2, 0.9, 0.5]);
        assert_eq!(positions(&recs), vec![2, 3, 1]);
    }

    #[test]
    fn test_excludes_base_even_when_tied() {
        let recs = rank_scores(1, 3, &[1.0, 1.0, 1.0]);
        assert_eq!(positions(&recs), vec![0, 2]);
    }

    #[test]
    fn test_ties_break_by_position() {
        let recs = rank_scores(0, 3, &[1.0, 0.4, 0.7, 0.4, 0.4]);
        assert_eq!(positions(&recs), vec![2, 1, 3]);
    }

    #[test]
    fn test_k_zero_is_empty() {
        assert!(rank_scores(0, 0, &[1.0, 0.5]).is_empty());
    }

    #[test]
    fn test_k_larger_than_catalog() {
        let recs = rank_scores(0, 10, &[1.0, 0.5, 0.1]);
        assert_eq!(positions(&recs), vec![1, 2]);
    }

    #[test]
    fn test_nan_sorts_last() {
        let recs = rank_scores(0, 3, &[1.0, f64::NAN, 0.1, 0.3]);
        assert_eq!(positions(&recs), vec![3, 2, 1]);
    }

    #[test]
    fn test_signed_nan_and_infinities() {
        let scores = [0.0, -f64::NAN, f64::INFINITY, f64::NAN, f64::NEG_INFINITY, 0.5];
        let recs = rank_scores(0, 5, &scores);
        assert_eq!(positions(&recs), vec![2, 5, 4, 1, 3]);
    }

    #[test]
    fn test_partial_selection_matches_full_sort() {
        let scores: Vec<f64> = (0..50).map(|i| ((i * 37) % 11) as f64 / 10.0).collect();
        let full = rank_scores(7, 49, &scores);
        let partial = rank_scores(7, 5, &scores);
        assert_eq!(partial, full[..5].to_vec());
    }
}
