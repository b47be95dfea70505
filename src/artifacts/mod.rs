// Artifacts — the read-only files produced by the offline ingestion step.

pub mod loader;

pub use loader::{default_artifact_dir, load_artifacts, Artifacts};
