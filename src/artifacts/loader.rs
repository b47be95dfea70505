// Artifact loading and cross-artifact validation.
//
// The ingestion step writes JSON files into one directory:
//
//   movies.json           required  [{movie_id, title, genres, vote_count?, vote_average?}]
//   item_embeddings.json  optional  [[f32; dim]; n]
//   similarity.json       optional  [[f64; n]; n]
//   popularity.json       optional  [f64; n]
//
// At least one of the two similarity artifacts must exist. Every artifact
// present must be aligned to the catalog (n rows). Any mismatch fails the
// whole load; the engine never serves from a partially valid set.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::catalog::{Catalog, CatalogRecord};
use crate::error::ArtifactError;
use crate::similarity::{EmbeddingMatrix, PairwiseSimilarityMatrix, PopularityVector};

pub const CATALOG_FILE: &str = "movies.json";
pub const EMBEDDINGS_FILE: &str = "item_embeddings.json";
pub const SIMILARITY_FILE: &str = "similarity.json";
pub const POPULARITY_FILE: &str = "popularity.json";

/// Returns the default artifact directory.
/// Uses the platform data directory: ~/.local/share/marquee/artifacts/ on Linux.
pub fn default_artifact_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marquee")
        .join("artifacts")
}

/// Everything the engine needs, validated and aligned to the catalog.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub catalog: Catalog,
    pub embeddings: Option<EmbeddingMatrix>,
    pub similarity: Option<PairwiseSimilarityMatrix>,
    pub popularity: Option<PopularityVector>,
}

impl Artifacts {
    /// Check the cross-artifact invariants: a non-empty catalog, at least one
    /// similarity artifact, and every artifact the same length as the catalog.
    pub fn validate(&self) -> Result<(), ArtifactError> {
        let expected = self.catalog.len();
        if expected == 0 {
            return Err(ArtifactError::Invalid {
                artifact: "catalog",
                reason: "catalog is empty".to_string(),
            });
        }
        if self.embeddings.is_none() && self.similarity.is_none() {
            return Err(ArtifactError::Invalid {
                artifact: "similarity artifacts",
                reason: format!("need {EMBEDDINGS_FILE} or {SIMILARITY_FILE}"),
            });
        }

        let lengths = [
            ("item embeddings", self.embeddings.as_ref().map(|e| e.len())),
            ("similarity matrix", self.similarity.as_ref().map(|s| s.len())),
            ("popularity vector", self.popularity.as_ref().map(|p| p.len())),
        ];
        for (artifact, found) in lengths {
            if let Some(found) = found {
                if found != expected {
                    return Err(ArtifactError::Inconsistent {
                        artifact,
                        expected,
                        found,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Load and validate every artifact in `dir`.
///
/// If no popularity artifact exists but every catalog record carries vote
/// statistics, popularity is derived from the votes.
pub fn load_artifacts(dir: &Path) -> Result<Artifacts, ArtifactError> {
    let catalog_path = dir.join(CATALOG_FILE);
    if !catalog_path.exists() {
        return Err(ArtifactError::Missing { path: catalog_path });
    }
    let records: Vec<CatalogRecord> = read_json(&catalog_path)?;
    let catalog = Catalog::from_records(records);
    debug!(items = catalog.len(), "Loaded catalog");

    let embeddings = read_optional::<Vec<Vec<f32>>>(&dir.join(EMBEDDINGS_FILE))?
        .map(EmbeddingMatrix::new)
        .transpose()?;
    let similarity = read_optional::<Vec<Vec<f64>>>(&dir.join(SIMILARITY_FILE))?
        .map(PairwiseSimilarityMatrix::new)
        .transpose()?;

    let popularity = match read_optional::<Vec<f64>>(&dir.join(POPULARITY_FILE))? {
        Some(values) => Some(PopularityVector::new(values)?),
        None if catalog.has_votes() => {
            debug!("No popularity artifact; deriving from vote statistics");
            Some(derive_popularity(&catalog)?)
        }
        None => None,
    };

    let artifacts = Artifacts {
        catalog,
        embeddings,
        similarity,
        popularity,
    };
    artifacts.validate()?;

    info!(
        items = artifacts.catalog.len(),
        embedding_dim = artifacts.embeddings.as_ref().map(|e| e.dim()),
        has_matrix = artifacts.similarity.is_some(),
        has_popularity = artifacts.popularity.is_some(),
        dir = %dir.display(),
        "Artifacts loaded"
    );

    Ok(artifacts)
}

/// Vote-based popularity from the catalog's vote fields. Missing fields count as zero.
pub fn derive_popularity(catalog: &Catalog) -> Result<PopularityVector, ArtifactError> {
    let counts: Vec<u64> = catalog
        .items()
        .iter()
        .map(|i| i.vote_count.unwrap_or(0))
        .collect();
    let averages: Vec<f64> = catalog
        .items()
        .iter()
        .map(|i| i.vote_average.unwrap_or(0.0))
        .collect();
    PopularityVector::from_votes(&counts, &averages)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, ArtifactError> {
    if !path.exists() {
        debug!(path = %path.display(), "Optional artifact not present");
        return Ok(None);
    }
    read_json(path).map(Some)
}
