// Title resolution — free-text query to catalog position.
//
// Matching is exact after normalization (lower-case, trimmed). No fuzzy or
// prefix matching happens here.
//
// Duplicate titles (remakes, re-releases) map to several positions. The
// default policy returns the first position inserted while building the
// index. That mirrors how the old lookup table behaved; it is a compatibility
// choice, not a claim that the first entry is the "right" movie.

use std::collections::HashMap;

use tracing::debug;

use super::item::Catalog;

/// How to pick one position when a title maps to several catalog entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Lowest catalog position wins.
    #[default]
    FirstInserted,
    /// Highest popularity score wins; ties fall back to the lowest position.
    MostPopular,
}

impl std::str::FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first" | "first-inserted" => Ok(Self::FirstInserted),
            "popular" | "most-popular" => Ok(Self::MostPopular),
            other => Err(format!("unknown duplicate policy '{other}'")),
        }
    }
}

/// Normalize a title for lookup: trim surrounding whitespace and lower-case.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Lookup table from normalized title to every position carrying it.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    entries: HashMap<String, Vec<usize>>,
    policy: DuplicatePolicy,
    /// Per-position popularity, only consulted by `MostPopular`.
    popularity: Option<Vec<f64>>,
}

impl TitleIndex {
    /// Build the index in catalog order so each bucket is sorted by position.
    pub fn build(catalog: &Catalog) -> Self {
        let mut entries: HashMap<String, Vec<usize>> = HashMap::with_capacity(catalog.len());
        for item in catalog.items() {
            entries
                .entry(normalize_title(&item.title))
                .or_default()
                .push(item.position);
        }

        let duplicated = entries.values().filter(|p| p.len() > 1).count();
        if duplicated > 0 {
            debug!(duplicated, "Catalog contains duplicate titles");
        }

        Self {
            entries,
            policy: DuplicatePolicy::FirstInserted,
            popularity: None,
        }
    }

    /// Switch the duplicate policy. `MostPopular` needs the popularity values;
    /// without them it behaves like `FirstInserted`.
    pub fn with_policy(mut self, policy: DuplicatePolicy, popularity: Option<Vec<f64>>) -> Self {
        self.policy = policy;
        self.popularity = popularity;
        self
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Resolve a query to a single catalog position.
    pub fn resolve(&self, query: &str) -> Option<usize> {
        let positions = self.entries.get(&normalize_title(query))?;
        match (self.policy, self.popularity.as_deref()) {
            (DuplicatePolicy::MostPopular, Some(popularity)) => {
                let mut best = positions[0];
                for &p in &positions[1..] {
                    let score = popularity.get(p).copied().unwrap_or(0.0);
                    let best_score = popularity.get(best).copied().unwrap_or(0.0);
                    if score > best_score {
                        best = p;
                    }
                }
                Some(best)
            }
            _ => positions.first().copied(),
        }
    }

    /// Every position whose title normalizes to the query, in catalog order.
    pub fn duplicates(&self, query: &str) -> &[usize] {
        self.entries
            .get(&normalize_title(query))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Number of distinct normalized titles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
