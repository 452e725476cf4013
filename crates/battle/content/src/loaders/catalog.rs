//! Catalog loader.

use std::path::Path;

use battle_core::env::{
    Catalog, ElementData, IntrinsicData, ItemData, MapStatusData, SkillData, StatusData,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::embedded;
use crate::loaders::{LoadResult, read_file};

/// Skill catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCatalog {
    pub items: Vec<ItemData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCatalog {
    pub statuses: Vec<StatusData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntrinsicCatalog {
    pub intrinsics: Vec<IntrinsicData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementCatalog {
    pub elements: Vec<ElementData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapStatusCatalog {
    pub map_statuses: Vec<MapStatusData>,
}

/// Raw RON text of every catalog file.
#[derive(Debug, Clone, Copy)]
pub struct CatalogSources<'a> {
    pub skills: &'a str,
    pub items: &'a str,
    pub statuses: &'a str,
    pub intrinsics: &'a str,
    pub elements: &'a str,
    pub map_statuses: &'a str,
}

impl CatalogSources<'static> {
    /// The content compiled into this crate.
    pub fn embedded() -> Self {
        Self {
            skills: embedded::SKILLS,
            items: embedded::ITEMS,
            statuses: embedded::STATUSES,
            intrinsics: embedded::INTRINSICS,
            elements: embedded::ELEMENTS,
            map_statuses: embedded::MAP_STATUSES,
        }
    }
}

/// Loader for the combat catalog.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load the embedded default catalog.
    pub fn load_embedded() -> LoadResult<Catalog> {
        Self::parse(CatalogSources::embedded())
    }

    /// Load a catalog from a data directory.
    ///
    /// # Directory Structure
    ///
    /// ```text
    /// data_dir/
    /// ├── skills.ron
    /// ├── items.ron
    /// ├── statuses.ron
    /// ├── intrinsics.ron
    /// ├── elements.ron
    /// └── map_statuses.ron
    /// ```
    pub fn load_dir(dir: &Path) -> LoadResult<Catalog> {
        let skills = read_file(&dir.join("skills.ron"))?;
        let items = read_file(&dir.join("items.ron"))?;
        let statuses = read_file(&dir.join("statuses.ron"))?;
        let intrinsics = read_file(&dir.join("intrinsics.ron"))?;
        let elements = read_file(&dir.join("elements.ron"))?;
        let map_statuses = read_file(&dir.join("map_statuses.ron"))?;

        Self::parse(CatalogSources {
            skills: &skills,
            items: &items,
            statuses: &statuses,
            intrinsics: &intrinsics,
            elements: &elements,
            map_statuses: &map_statuses,
        })
    }

    /// Parse and validate a catalog from RON sources.
    pub fn parse(sources: CatalogSources<'_>) -> LoadResult<Catalog> {
        let skills: SkillCatalog = parse_ron("skill", sources.skills)?;
        let items: ItemCatalog = parse_ron("item", sources.items)?;
        let statuses: StatusCatalog = parse_ron("status", sources.statuses)?;
        let intrinsics: IntrinsicCatalog = parse_ron("intrinsic", sources.intrinsics)?;
        let elements: ElementCatalog = parse_ron("element", sources.elements)?;
        let map_statuses: MapStatusCatalog = parse_ron("map status", sources.map_statuses)?;

        let counts = (
            skills.skills.len(),
            items.items.len(),
            statuses.statuses.len(),
        );

        let mut catalog = Catalog::new();
        skills.skills.into_iter().for_each(|s| catalog.insert_skill(s));
        items.items.into_iter().for_each(|i| catalog.insert_item(i));
        statuses
            .statuses
            .into_iter()
            .for_each(|s| catalog.insert_status(s));
        intrinsics
            .intrinsics
            .into_iter()
            .for_each(|i| catalog.insert_intrinsic(i));
        elements
            .elements
            .into_iter()
            .for_each(|e| catalog.insert_element(e));
        map_statuses
            .map_statuses
            .into_iter()
            .for_each(|m| catalog.insert_map_status(m));

        catalog
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid catalog: {}", e))?;

        info!(
            target: "content::catalog",
            skills = counts.0,
            items = counts.1,
            statuses = counts.2,
            "catalog loaded"
        );
        Ok(catalog)
    }
}

fn parse_ron<T: for<'de> Deserialize<'de>>(kind: &str, source: &str) -> LoadResult<T> {
    ron::from_str(source)
        .map_err(|e| anyhow::anyhow!("Failed to parse {} catalog RON: {}", kind, e))
}
