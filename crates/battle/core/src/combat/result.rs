//! Summary of a finished action.

use crate::context::ActionKind;
use crate::state::{CharacterId, ItemId, SkillId};

/// What happened to one strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum StrikeResult {
    Hit,
    Miss,
    /// Cancelled before the accuracy check.
    Fizzled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StrikeOutcome {
    pub result: StrikeResult,
    pub critical: bool,
    pub damage: u32,
    pub healed: u32,
}

impl StrikeOutcome {
    pub fn fizzled() -> Self {
        Self {
            result: StrikeResult::Fizzled,
            critical: false,
            damage: 0,
            healed: 0,
        }
    }
}

/// Outcome of one resolved action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionReport {
    pub user: CharacterId,
    pub target: CharacterId,
    pub action: ActionKind,
    /// Skill executed last (after any replacement).
    pub skill: Option<SkillId>,
    pub strikes: Vec<StrikeOutcome>,
    pub total_damage: u32,
    pub total_healed: u32,
    /// Item removed from its source when the action finished.
    pub consumed: Option<ItemId>,
    /// Cancelled before any strike started.
    pub fizzled: bool,
    pub turn_cancelled: bool,
}

impl ActionReport {
    pub fn new(user: CharacterId, target: CharacterId, action: ActionKind) -> Self {
        Self {
            user,
            target,
            action,
            skill: None,
            strikes: Vec::new(),
            total_damage: 0,
            total_healed: 0,
            consumed: None,
            fizzled: false,
            turn_cancelled: false,
        }
    }

    pub fn hits(&self) -> usize {
        self.strikes
            .iter()
            .filter(|s| s.result == StrikeResult::Hit)
            .count()
    }

    pub fn criticals(&self) -> usize {
        self.strikes.iter().filter(|s| s.critical).count()
    }
}
