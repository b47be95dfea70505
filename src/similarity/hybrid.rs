// Hybrid scorer — weighted linear blend of independent sources.
//
//   hybrid(i) = sum_k weight_k * source_k(base)[i]
//
// Weights are fixed at construction and must sum to 1.0. Components are
// expected to be on comparable scales already (cosine in [-1, 1], matrix
// similarity in [0, 1], popularity in [0, 1]); nothing rescales them here,
// so an unnormalized component will dominate the blend.

use std::sync::Arc;

use tracing::debug;

use super::traits::{check_position, SimilaritySource};
use crate::error::{ArtifactError, RecommendError};

/// Allowed drift of the weight sum away from 1.0.
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Weights for the three standard components.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridWeights {
    /// Dense embedding cosine
    pub semantic: f64,
    /// Precomputed bag-of-words matrix
    pub lexical: f64,
    /// Global popularity prior
    pub popularity: f64,
}

impl Default for HybridWeights {
    fn default() -> Self {
        Self {
            semantic: 0.5,
            lexical: 0.3,
            popularity: 0.2,
        }
    }
}

impl HybridWeights {
    pub fn sum(&self) -> f64 {
        self.semantic + self.lexical + self.popularity
    }

    /// Drop the components whose source is missing and rescale the rest so
    /// they still sum to 1.0. Returns None if nothing with positive weight
    /// is left.
    pub fn renormalized(&self, semantic: bool, lexical: bool, popularity: bool) -> Option<Self> {
        let kept = Self {
            semantic: if semantic { self.semantic } else { 0.0 },
            lexical: if lexical { self.lexical } else { 0.0 },
            popularity: if popularity { self.popularity } else { 0.0 },
        };
        let total = kept.sum();
        if total <= 0.0 || !total.is_finite() {
            return None;
        }
        Some(Self {
            semantic: kept.semantic / total,
            lexical: kept.lexical / total,
            popularity: kept.popularity / total,
        })
    }
}

/// One weighted component of a hybrid score.
pub struct Component {
    pub weight: f64,
    pub source: Arc<dyn SimilaritySource>,
}

/// Position-wise weighted sum over several similarity sources.
pub struct HybridScorer {
    components: Vec<Component>,
    len: usize,
}

impl std::fmt::Debug for HybridScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<(&str, f64)> = self
            .components
            .iter()
            .map(|c| (c.source.name(), c.weight))
            .collect();
        f.debug_struct("HybridScorer")
            .field("components", &parts)
            .field("len", &self.len)
            .finish()
    }
}

impl HybridScorer {
    /// Build a scorer. Weights must be finite, non-negative and sum to 1.0,
    /// and every source must cover the same number of positions.
    pub fn new(components: Vec<Component>) -> Result<Self, ArtifactError> {
        if components.is_empty() {
            return Err(ArtifactError::Invalid {
                artifact: "hybrid weights",
                reason: "no components".to_string(),
            });
        }

        if let Some(bad) = components
            .iter()
            .find(|c| !c.weight.is_finite() || c.weight < 0.0)
        {
            return Err(ArtifactError::Invalid {
                artifact: "hybrid weights",
                reason: format!("weight {} for '{}' is invalid", bad.weight, bad.source.name()),
            });
        }

        let sum: f64 = components.iter().map(|c| c.weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ArtifactError::Invalid {
                artifact: "hybrid weights",
                reason: format!("weights sum to {sum}, expected 1.0"),
            });
        }

        let len = components[0].source.len();
        if let Some(c) = components.iter().find(|c| c.source.len() != len) {
            return Err(ArtifactError::Inconsistent {
                artifact: c.source.name(),
                expected: len,
                found: c.source.len(),
            });
        }

        Ok(Self { components, len })
    }

    /// Build from the standard weights. Missing sources are dropped and the
    /// remaining weights renormalized.
    pub fn from_weights(
        weights: HybridWeights,
        semantic: Option<Arc<dyn SimilaritySource>>,
        lexical: Option<Arc<dyn SimilaritySource>>,
        popularity: Option<Arc<dyn SimilaritySource>>,
    ) -> Result<Self, ArtifactError> {
        let effective = weights
            .renormalized(semantic.is_some(), lexical.is_some(), popularity.is_some())
            .ok_or_else(|| ArtifactError::Invalid {
                artifact: "hybrid weights",
                reason: "no loaded source has a positive weight".to_string(),
            })?;

        let components = [
            (effective.semantic, semantic),
            (effective.lexical, lexical),
            (effective.popularity, popularity),
        ]
        .into_iter()
        .filter_map(|(weight, source)| source.map(|source| Component { weight, source }))
        .filter(|c| c.weight > 0.0)
        .collect();

        Self::new(components)
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }
}

impl SimilaritySource for HybridScorer {
    fn name(&self) -> &'static str {
        "hybrid"
    }

    fn len(&self) -> usize {
        self.len
    }

    fn score_all(&self, base: usize) -> Result<Vec<f64>, RecommendError> {
        check_position(base, self.len)?;

        let mut combined = vec![0.0; self.len];
        for component in &self.components {
            let scores = component.source.score_all(base)?;
            for (total, score) in combined.iter_mut().zip(scores) {
                *total += component.weight * score;
            }
        }

        debug!(base, components = self.components.len(), "Computed hybrid scores");
        Ok(combined)
    }
}
