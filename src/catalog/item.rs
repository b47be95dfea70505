// Catalog items — the ordered list every similarity artifact is aligned to.
//
// An item's position is its index in the catalog artifact. Positions are
// assigned once when the catalog is built and never reused, so position `i`
// means the same movie in the embedding matrix, the similarity matrix and the
// popularity vector.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One record as it appears in the catalog artifact (`movies.json`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    /// Number of votes on the source site, if the ingestion step kept it
    #[serde(default)]
    pub vote_count: Option<u64>,
    /// Mean vote (0-10 scale on TMDB), if the ingestion step kept it
    #[serde(default)]
    pub vote_average: Option<f64>,
}

/// A movie in the loaded catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// 0-based position; the join key into every similarity artifact
    pub position: usize,
    /// Upstream catalog id (TMDB movie id), used for poster lookups
    pub external_id: i64,
    pub title: String,
    pub genres: BTreeSet<String>,
    pub vote_count: Option<u64>,
    pub vote_average: Option<f64>,
}

impl CatalogItem {
    /// True when the two items have at least one genre in common.
    pub fn shares_genre_with(&self, other: &CatalogItem) -> bool {
        !self.genres.is_disjoint(&other.genres)
    }
}

/// Immutable, position-addressed collection of catalog items.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<CatalogItem>,
}

impl Catalog {
    /// Build a catalog from artifact records, assigning positions in record order.
    pub fn from_records(records: Vec<CatalogRecord>) -> Self {
        let items = records
            .into_iter()
            .enumerate()
            .map(|(position, r)| CatalogItem {
                position,
                external_id: r.movie_id,
                title: r.title,
                genres: r
                    .genres
                    .into_iter()
                    .map(|g| g.trim().to_string())
                    .filter(|g| !g.is_empty())
                    .collect(),
                vote_count: r.vote_count,
                vote_average: r.vote_average,
            })
            .collect();
        Self { items }
    }

    pub fn get(&self, position: usize) -> Option<&CatalogItem> {
        self.items.get(position)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    /// All titles in catalog order, duplicates included.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|i| i.title.as_str())
    }

    /// True if every item carries both vote statistics.
    pub fn has_votes(&self) -> bool {
        !self.items.is_empty()
            && self
                .items
                .iter()
                .all(|i| i.vote_count.is_some() && i.vote_average.is_some())
    }
}
