// Popularity prior.
//
// One score per catalog position in [0, 1], independent of the base item.
// It is a quality signal, not a similarity: the same vector is returned for
// every base, which lets the hybrid scorer nudge well-liked movies upward.
//
// When no popularity artifact ships with the catalog, it can be derived from
// vote statistics as
//
//   raw = ln(1 + v) * R
//
// where v is the movie's vote count and R its vote average, then min-max
// scaled into [0, 1]. For non-negative averages the score never decreases
// as either the vote count or the average grows.

use super::traits::{check_position, SimilaritySource};
use crate::error::{ArtifactError, RecommendError};

/// Per-position popularity, each value in [0, 1].
#[derive(Debug, Clone, PartialEq)]
pub struct PopularityVector {
    values: Vec<f64>,
}

impl PopularityVector {
    pub fn new(values: Vec<f64>) -> Result<Self, ArtifactError> {
        if let Some((i, v)) = values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(ArtifactError::Invalid {
                artifact: "popularity vector",
                reason: format!("value {v} at position {i} is outside [0, 1]"),
            });
        }
        Ok(Self { values })
    }

    /// Derive popularity from vote counts and averages (see module docs).
    pub fn from_votes(counts: &[u64], averages: &[f64]) -> Result<Self, ArtifactError> {
        if counts.len() != averages.len() {
            return Err(ArtifactError::Invalid {
                artifact: "popularity vector",
                reason: format!(
                    "{} vote counts but {} vote averages",
                    counts.len(),
                    averages.len()
                ),
            });
        }
        if let Some((i, r)) = averages
            .iter()
            .enumerate()
            .find(|(_, r)| !r.is_finite() || **r < 0.0)
        {
            return Err(ArtifactError::Invalid {
                artifact: "popularity vector",
                reason: format!("vote average {r} at position {i} is not a non-negative number"),
            });
        }

        let raw: Vec<f64> = counts
            .iter()
            .zip(averages.iter())
            .map(|(&v, &r)| (v as f64).ln_1p() * r)
            .collect();

        Ok(Self {
            values: min_max_scale(&raw),
        })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Scale into [0, 1]. A constant input maps to all zeros.
fn min_max_scale(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if range <= f64::EPSILON {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| (v - min) / range).collect()
}

/// Similarity source returning the global popularity vector for any base.
pub struct PopularitySource {
    popularity: PopularityVector,
}

impl PopularitySource {
    pub fn new(popularity: PopularityVector) -> Self {
        Self { popularity }
    }

    pub fn popularity(&self) -> &PopularityVector {
        &self.popularity
    }
}

impl SimilaritySource for PopularitySource {
    fn name(&self) -> &'static str {
        "popularity"
    }

    fn len(&self) -> usize {
        self.popularity.len()
    }

    fn score_all(&self, base: usize) -> Result<Vec<f64>, RecommendError> {
        check_position(base, self.popularity.len())?;
        Ok(self.popularity.values.clone())
    }
}
