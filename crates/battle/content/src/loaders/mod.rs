//! Content loaders for reading combat data from files.
//!
//! Catalog files are RON, tables are TOML. Both are deserialized straight
//! into `battle-core` types.

pub mod catalog;
pub mod tables;

pub use catalog::{CatalogLoader, CatalogSources};
pub use tables::TablesLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
