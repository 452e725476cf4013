//! Balance tables loader.

use std::path::Path;

use battle_core::CombatTables;

use crate::embedded;
use crate::loaders::{LoadResult, read_file};

/// Loader for combat balance tables from TOML files.
///
/// Missing keys keep their [`CombatTables::default`] values.
pub struct TablesLoader;

impl TablesLoader {
    /// Load tables from a TOML file.
    pub fn load(path: &Path) -> LoadResult<CombatTables> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Load the embedded default tables.
    pub fn load_embedded() -> LoadResult<CombatTables> {
        Self::parse(embedded::TABLES)
    }

    /// Parse and validate tables from TOML text.
    pub fn parse(content: &str) -> LoadResult<CombatTables> {
        let tables: CombatTables = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse tables TOML: {}", e))?;
        tables
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid tables: {}", e))?;
        Ok(tables)
    }
}
