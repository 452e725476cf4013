//! Collaborators the engine consults but does not own.
//!
//! Read-only content (catalog, balance tables) travels in [`BattleEnv`].
//! Mutable collaborators (battlefield, scene, random stream) travel in
//! [`World`](crate::World). Both are passed explicitly to every resume, so
//! nothing in the engine reaches for global state.
mod catalog;
mod rng;
mod scene;
mod tables;

pub use catalog::{
    Catalog, CatalogError, CatalogOracle, ElementData, Hooks, IntrinsicData, ItemData,
    MapStatusData, Matchup, Reference, SkillData, StatusData, ThrowData,
};
pub use rng::{PcgRng, RngOracle, action_seed};
pub use scene::{Message, Scene, SignalId};
pub use tables::{CombatTables, LevelTable, TableError};

/// Read-only content shared by every action.
#[derive(Clone, Copy)]
pub struct BattleEnv<'a> {
    pub catalog: &'a dyn CatalogOracle,
    pub tables: &'a CombatTables,
}

impl<'a> BattleEnv<'a> {
    pub fn new(catalog: &'a dyn CatalogOracle, tables: &'a CombatTables) -> Self {
        Self { catalog, tables }
    }
}

impl std::fmt::Debug for BattleEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BattleEnv")
            .field("tables", self.tables)
            .finish_non_exhaustive()
    }
}
