// Similarity source trait — the swap-ready scoring abstraction.
//
// Every way of scoring catalog items against a base item (embedding cosine,
// a precomputed matrix row, the popularity prior, or a weighted blend of
// those) implements this one trait. The ranker only ever sees the trait, so
// choosing a scorer is a configuration decision, not a branch in the ranking
// code.

use crate::error::RecommendError;

/// Scores every catalog position against a base position.
pub trait SimilaritySource: Send + Sync {
    /// Short identifier used in logs and error messages.
    fn name(&self) -> &'static str;

    /// Number of catalog positions this source covers.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Score for every position, indexed by position. The base item's own
    /// score is included; excluding it is the ranker's job.
    fn score_all(&self, base: usize) -> Result<Vec<f64>, RecommendError>;
}

/// Reject positions outside `0..len` with a typed error.
pub(crate) fn check_position(base: usize, len: usize) -> Result<(), RecommendError> {
    if base >= len {
        return Err(RecommendError::PositionOutOfRange {
            position: base,
            size: len,
        });
    }
    Ok(())
}
