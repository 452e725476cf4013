//! Status and held-item effects.

use tracing::debug;

use crate::env::Message;
use crate::state::{StatusId, StatusInstance};

use super::Who;
use super::cx::{EffectCx, EffectRefusal};

/// Attach a status condition, optionally behind a chance roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ApplyStatusEffect {
    pub status: StatusId,
    /// Percent chance; 100 and above never draws from the random stream.
    #[cfg_attr(feature = "serde", serde(default = "ApplyStatusEffect::always"))]
    pub chance: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Who,
    #[cfg_attr(feature = "serde", serde(default))]
    pub turns: Option<u32>,
}

impl ApplyStatusEffect {
    pub fn new(status: StatusId) -> Self {
        Self {
            status,
            chance: Self::always(),
            target: Who::Target,
            turns: None,
        }
    }

    pub const fn always() -> u32 {
        100
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        if cx.env.catalog.status(self.status).is_none() {
            debug!(target: "battle::effect", status = %self.status, "unknown status skipped");
            return;
        }
        let id = cx.resolve(self.target);
        if cx.combatant(self.target).is_none() {
            debug!(target: "battle::effect", %id, "status skipped: not in play");
            return;
        }
        if self.chance < 100 && !cx.world.rng.chance(self.chance) {
            return;
        }

        let instance = StatusInstance {
            id: self.status,
            turns_left: self.turns,
        };
        let added = cx
            .combatant_mut(self.target)
            .is_some_and(|c| c.add_status(instance));
        let key = if added {
            "battle.status.added"
        } else {
            "battle.status.unchanged"
        };
        cx.log(Message::new(key).subject(id).value(i64::from(self.status.0)));
    }
}

/// Remove a status condition if present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoveStatusEffect {
    pub status: StatusId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Who,
}

impl RemoveStatusEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let id = cx.resolve(self.target);
        let removed = cx
            .combatant_mut(self.target)
            .is_some_and(|c| c.remove_status(self.status));
        if removed {
            cx.log(
                Message::new("battle.status.removed")
                    .subject(id)
                    .value(i64::from(self.status.0)),
            );
        }
    }
}

/// Take the target's held item.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StealItemEffect;

impl StealItemEffect {
    pub fn pre_validate(&self, cx: &EffectCx<'_, '_>) -> Result<(), EffectRefusal> {
        let (Some(user), Some(target)) = (cx.combatant(Who::User), cx.combatant(Who::Target))
        else {
            return Err(EffectRefusal::NoTarget);
        };
        if user.held_item.is_some() {
            return Err(EffectRefusal::HandsFull);
        }
        if target.held_item.is_none() {
            return Err(EffectRefusal::NothingToSteal);
        }
        Ok(())
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let Some(item) = cx
            .combatant_mut(Who::Target)
            .and_then(|t| t.held_item.take())
        else {
            return;
        };
        if let Some(user) = cx.combatant_mut(Who::User) {
            user.held_item = Some(item);
        }
        let (user, target) = (cx.ctx.user, cx.ctx.target);
        cx.log(
            Message::new("battle.steal")
                .subject(user)
                .object(target)
                .value(i64::from(item.0)),
        );
    }
}
