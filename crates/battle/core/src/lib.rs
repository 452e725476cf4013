//! Deterministic combat resolution for a turn-based dungeon crawler.
//!
//! `battle-core` resolves one action at a time: an [`ActionRun`] walks the
//! action through its phases and strikes, collecting [`EffectNode`]s from the
//! move, the item, map statuses and the participants' statuses and
//! intrinsics, and running them in [`PriorityList`] order against a
//! [`BattleContext`]. Effects talk to each other through typed state cells
//! ([`CellStore`]) and may suspend for frames or scene signals; the caller
//! resumes the run until it finishes.
//!
//! Content is read through [`CatalogOracle`] and balance numbers through
//! [`CombatTables`], both bundled in [`BattleEnv`]. The mutable collaborators
//! (battlefield, scene, random stream) are lent per resume through [`World`].
pub mod cells;
pub mod combat;
pub mod config;
pub mod context;
pub mod effect;
pub mod env;
pub mod error;
pub mod pipeline;
pub mod priority;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod world;

pub use cells::{Cell, CellCategory, CellStore, Fraction, Ratio};
pub use combat::{ActionReport, DamageRoll, HitCheck, StrikeOutcome, StrikeResult};
pub use config::BattleConfig;
pub use context::{
    ActionKind, BattleContext, Category, Explosion, HitRate, Hitbox, ItemPayload, MoveFlags,
    MoveSpec, UsageSlot,
};
pub use effect::{
    Condition, EffectNode, EffectOwner, EffectRun, EffectSource, Phase, PhasedEffect, Progress,
    Suspension, Who,
};
pub use env::{
    BattleEnv, Catalog, CatalogError, CatalogOracle, CombatTables, Message, PcgRng, RngOracle,
    Scene, SignalId, TableError,
};
pub use error::{BattleError, ErrorSeverity};
pub use pipeline::{ActionError, ActionRequest, ActionRun};
pub use priority::PriorityList;
pub use state::{Battlefield, CharacterId, Combatant, Position};
pub use world::World;
