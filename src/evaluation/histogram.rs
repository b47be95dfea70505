// Fixed-width histogram over a closed range. Precision scores use [0, 1];
// raw similarity scores use [-1, 1] since cosine can go negative.

use serde::Serialize;

/// Default number of bins (0.0-0.1, 0.1-0.2, ..., 0.9-1.0).
pub const DEFAULT_BINS: usize = 10;

/// Guards against 0.3 * 10 landing in bin 2 through float error.
const BIN_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    lower: f64,
    upper: f64,
    counts: Vec<usize>,
}

impl Histogram {
    /// Bucket scores into `bins` equal-width bins over [0, 1].
    pub fn from_scores(scores: &[f64], bins: usize) -> Self {
        Self::with_range(scores, bins, 0.0, 1.0)
    }

    /// Bucket scores into `bins` equal-width bins over [lower, upper].
    /// Values are clamped into the range; `upper` lands in the last bin.
    /// NaN values are ignored. An empty or inverted range collapses to a
    /// single bin.
    pub fn with_range(scores: &[f64], bins: usize, lower: f64, upper: f64) -> Self {
        let (bins, upper) = if upper > lower {
            (bins.max(1), upper)
        } else {
            (1, lower)
        };
        let span = upper - lower;
        let mut counts = vec![0; bins];
        for &s in scores.iter().filter(|s| !s.is_nan()) {
            let idx = if span > 0.0 {
                let unit = (s.clamp(lower, upper) - lower) / span;
                ((unit * bins as f64) + BIN_EPSILON).floor() as usize
            } else {
                0
            };
            counts[idx.min(bins - 1)] += 1;
        }
        Self {
            lower,
            upper,
            counts,
        }
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(lower, upper, count)` for each bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        let lower = self.lower;
        let width = (self.upper - self.lower) / self.counts.len() as f64;
        self.counts.iter().enumerate().map(move |(i, &c)| {
            (
                lower + i as f64 * width,
                lower + (i + 1) as f64 * width,
                c,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buckets_precision_steps() {
        let h = Histogram::from_scores(&[0.0, 0.3, 0.3, 0.7, 1.0], DEFAULT_BINS);
        assert_eq!(h.counts()[0], 1);
        assert_eq!(h.counts()[3], 2);
        assert_eq!(h.counts()[7], 1);
        assert_eq!(h.counts()[9], 1);
        assert_eq!(h.total(), 5);
    }

    #[test]
    fn test_ignores_nan_and_clamps() {
        let h = Histogram::from_scores(&[f64::NAN, -0.5, 1.5], 4);
        assert_eq!(h.counts(), &[1, 0, 0, 1]);
    }

    #[test]
    fn test_signed_range() {
        let h = Histogram::with_range(&[-1.0, -0.6, -0.05, 0.0, 0.55, 1.0, 3.0], 4, -1.0, 1.0);
        assert_eq!(h.counts(), &[2, 1, 1, 3]);
        let edges: Vec<(f64, f64, usize)> = h.bins().collect();
        assert!((edges[0].0 + 1.0).abs() < 1e-12);
        assert!((edges[1].1 - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_range_is_single_bin() {
        let h = Histogram::with_range(&[0.2, 0.9], 5, 1.0, 1.0);
        assert_eq!(h.counts(), &[2]);
    }

    #[test]
    fn test_bin_edges() {
        let h = Histogram::from_scores(&[], 4);
        let edges: Vec<(f64, f64, usize)> = h.bins().collect();
        assert_eq!(edges.len(), 4);
        assert!((edges[1].0 - 0.25).abs() < 1e-12);
        assert!((edges[3].1 - 1.0).abs() < 1e-12);
    }
}
