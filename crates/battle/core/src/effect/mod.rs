//! Effect nodes: the small, independently authored units an action is built from.
//!
//! An [`EffectNode`] is an immutable template, usually borrowed straight out
//! of the catalog. Executing one creates an [`EffectRun`] that carries the
//! per-execution progress (child index, remaining repeats, queued
//! suspensions) and is resumed by whoever drives it until it reports
//! [`Progress::Finished`].
//!
//! # Architecture
//!
//! Enum + struct hybrid:
//! - Combinators (`Sequence`, `ChooseOne`, `Conditional`, ...) are variants
//!   the runner interprets, delegating to child runs.
//! - Leaves are one struct per effect with `pre_validate` / `apply` methods.
//!   `pre_validate` failures become a logged message plus the cancellation
//!   flag; nothing is mutated before it passes.
//! - Leaves mutate atomically and may queue suspension points, which the
//!   runner hands out one resume at a time.

mod condition;
mod cx;
mod damage;
mod flow;
mod kinds;
mod modifier;
mod presentation;
mod run;
mod status;

pub use condition::Condition;
pub use cx::{EffectCx, EffectRefusal};
pub use damage::{DamageEffect, DrainEffect, FixedDamageEffect, HealEffect, RecoilEffect};
pub use flow::{CancelEffect, ReplaceMoveEffect};
pub use kinds::EffectNode;
pub use modifier::{BoostEffect, BoostStat, ChangeStageEffect, StrikeFlag};
pub use presentation::{AnimateEffect, LogEffect, SoundEffect};
pub use run::{ChildCursor, EffectRun, Progress, Suspension};
pub use status::{ApplyStatusEffect, RemoveStatusEffect, StealItemEffect};

use crate::state::{CharacterId, IntrinsicId, ItemId, MapStatusId, SkillId, StatusId};

/// Resolution phase an effect is scheduled in.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Phase {
    /// Once, before the first strike.
    BeforeAction,
    /// Each strike, right after stats are staged.
    Prepare,
    /// Each strike, right before the accuracy check.
    BeforeHit,
    /// Each strike that hits.
    #[default]
    OnHit,
    /// Each strike that misses.
    OnMiss,
    /// Each strike, after its totals are published.
    AfterStrike,
    /// Once, after the last strike.
    AfterAction,
}

/// An effect node with its scheduling.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhasedEffect {
    pub node: EffectNode,

    #[cfg_attr(feature = "serde", serde(default))]
    pub phase: Phase,

    /// Lower runs earlier; ties keep collection order.
    #[cfg_attr(feature = "serde", serde(default))]
    pub priority: i32,
}

impl PhasedEffect {
    /// Creates an effect with default phase (OnHit) and priority (0).
    pub fn new(node: EffectNode) -> Self {
        Self {
            node,
            phase: Phase::OnHit,
            priority: 0,
        }
    }

    /// Builder: set phase.
    pub fn phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    /// Builder: set priority.
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Participant an effect is aimed at.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Who {
    User,
    #[default]
    Target,
    /// Whoever carries the status, intrinsic or item the effect came from.
    /// Falls back to the user for effects without a holder.
    Holder,
}

/// Where an effect was collected from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectSource {
    MapStatus(MapStatusId),
    Skill(SkillId),
    Item(ItemId),
    Intrinsic(IntrinsicId),
    Status(StatusId),
}

/// Source and holder of a running effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EffectOwner {
    pub source: EffectSource,
    pub holder: Option<CharacterId>,
}

impl EffectOwner {
    pub fn new(source: EffectSource, holder: Option<CharacterId>) -> Self {
        Self { source, holder }
    }
}
