//! Authored combat content and its loaders.
//!
//! The catalog (skills, items, statuses, intrinsics, elements, map statuses)
//! is written in RON and the balance tables in TOML. A default content set is
//! embedded in the binary; [`CatalogLoader::load_dir`] and
//! [`TablesLoader::load`] read the same formats from disk.
//!
//! Everything loaded here is validated before it is handed out, so the
//! engine can treat missing ids as "no effect" at resolution time.
pub mod embedded;
pub mod loaders;

pub use loaders::{CatalogLoader, CatalogSources, LoadResult, TablesLoader};
