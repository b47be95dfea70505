// Catalog — ordered movie items and free-text title resolution.

pub mod item;
pub mod resolver;

pub use item::{Catalog, CatalogItem, CatalogRecord};
pub use resolver::{normalize_title, DuplicatePolicy, TitleIndex};
