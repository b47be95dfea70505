// Dense embedding similarity.
//
// Each catalog position has one fixed-length vector produced offline by a
// sentence-embedding model. Scores are cosine similarity between the base
// row and every row, computed on demand for one base at a time instead of
// materializing the full n x n matrix.
//
// Row norms are computed once at load time. A row with zero magnitude has
// no direction, so its similarity to anything is defined as 0.0.

use tracing::{debug, warn};

use super::traits::{check_position, SimilaritySource};
use crate::error::{ArtifactError, RecommendError};

/// Norms below this are treated as zero-magnitude.
const ZERO_NORM: f64 = f64::EPSILON;

/// Immutable matrix of item embeddings, one row per catalog position.
#[derive(Debug, Clone)]
pub struct EmbeddingMatrix {
    rows: Vec<Vec<f32>>,
    dim: usize,
    norms: Vec<f64>,
}

impl EmbeddingMatrix {
    /// Validate and wrap raw rows. All rows must share one non-zero dimension
    /// and contain only finite values.
    pub fn new(rows: Vec<Vec<f32>>) -> Result<Self, ArtifactError> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        if !rows.is_empty() && dim == 0 {
            return Err(ArtifactError::Invalid {
                artifact: "item embeddings",
                reason: "rows have zero dimensions".to_string(),
            });
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != dim {
                return Err(ArtifactError::Invalid {
                    artifact: "item embeddings",
                    reason: format!("row {i} has {} dimensions, expected {dim}", row.len()),
                });
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(ArtifactError::Invalid {
                    artifact: "item embeddings",
                    reason: format!("row {i} contains a non-finite value"),
                });
            }
        }

        let norms: Vec<f64> = rows.iter().map(|r| l2_norm(r)).collect();

        let degenerate = norms.iter().filter(|&&n| n < ZERO_NORM).count();
        if degenerate > 0 {
            warn!(
                degenerate,
                "Embedding matrix has zero-magnitude rows; their similarity will be 0.0"
            );
        }

        Ok(Self { rows, dim, norms })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn row(&self, position: usize) -> Option<&[f32]> {
        self.rows.get(position).map(Vec::as_slice)
    }

    /// Cosine similarity between two rows, 0.0 if either has no magnitude.
    pub fn cosine(&self, a: usize, b: usize) -> f64 {
        let denom = self.norms[a] * self.norms[b];
        if denom < ZERO_NORM {
            return 0.0;
        }
        dot(&self.rows[a], &self.rows[b]) / denom
    }
}

/// Cosine similarity of two slices. Mismatched lengths, empty input, or a
/// zero-magnitude side all yield 0.0. The result is not clamped, so opposite
/// vectors score -1.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let denom = l2_norm(a) * l2_norm(b);
    if denom < ZERO_NORM {
        0.0
    } else {
        dot(a, b) / denom
    }
}

fn dot(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(&x, &y)| x as f64 * y as f64)
        .sum()
}

fn l2_norm(v: &[f32]) -> f64 {
    v.iter().map(|&x| (x as f64) * (x as f64)).sum::<f64>().sqrt()
}

/// Similarity source backed by an embedding matrix.
pub struct EmbeddingSource {
    matrix: EmbeddingMatrix,
}

impl EmbeddingSource {
    pub fn new(matrix: EmbeddingMatrix) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &EmbeddingMatrix {
        &self.matrix
    }
}

impl SimilaritySource for EmbeddingSource {
    fn name(&self) -> &'static str {
        "embedding"
    }

    fn len(&self) -> usize {
        self.matrix.len()
    }

    fn score_all(&self, base: usize) -> Result<Vec<f64>, RecommendError> {
        check_position(base, self.matrix.len())?;

        if self.matrix.norms[base] < ZERO_NORM {
            debug!(base, "Base embedding has zero magnitude; all scores are 0.0");
            return Ok(vec![0.0; self.matrix.len()]);
        }

        Ok((0..self.matrix.len())
            .map(|i| self.matrix.cosine(base, i))
            .collect())
    }
}
