//! HP-changing effects: formula damage, fixed damage, healing, recoil, drain.

use tracing::debug;

use crate::cells::{DamageDealt, HealDealt};
use crate::combat::calculate_damage;
use crate::env::Message;
use crate::state::CharacterId;

use super::Who;
use super::cx::{EffectCx, EffectRefusal};

/// Deal formula damage to the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageEffect {
    /// Overrides the move's power when set.
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: Option<u32>,
}

impl DamageEffect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_power(power: u32) -> Self {
        Self { power: Some(power) }
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let Some(position) = cx.combatant(Who::Target).map(|t| t.position) else {
            debug!(target: "battle::effect", target = %cx.ctx.target, "damage skipped: target not in play");
            return;
        };
        let target = cx.ctx.target;
        let power = self.power.unwrap_or(cx.ctx.spec.power);
        let roll = calculate_damage(cx.env, cx.ctx, cx.world, power);

        let signal = cx.world.scene.spawn_visual("hit", position);
        cx.wait_signal(signal);

        if roll.critical {
            cx.log(Message::new("battle.critical").object(target));
        }
        match roll.effectiveness {
            None => cx.log(Message::new("battle.immune").subject(target)),
            Some(level) if level > 0 => cx.log(Message::new("battle.super_effective")),
            Some(level) if level < 0 => cx.log(Message::new("battle.not_very_effective")),
            Some(_) => {}
        }
        if roll.damage > 0 {
            let dealt = inflict(cx, target, roll.damage);
            cx.ctx.local.add::<DamageDealt>(i64::from(dealt));
        }
    }
}

/// Deal a fixed amount of damage, bypassing the formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FixedDamageEffect {
    pub amount: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Who,
}

impl FixedDamageEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let id = cx.resolve(self.target);
        if cx.combatant(self.target).is_none() {
            debug!(target: "battle::effect", %id, "fixed damage skipped: not in play");
            return;
        }
        let dealt = inflict(cx, id, self.amount);
        if id == cx.ctx.target {
            cx.ctx.local.add::<DamageDealt>(i64::from(dealt));
        }
    }
}

/// Restore a percentage of maximum HP.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HealEffect {
    pub percent: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Who,
    /// Refuse (and cancel the phase) when the target is already at full HP.
    #[cfg_attr(feature = "serde", serde(default))]
    pub fail_if_full: bool,
}

impl HealEffect {
    pub fn pre_validate(&self, cx: &EffectCx<'_, '_>) -> Result<(), EffectRefusal> {
        match cx.combatant(self.target) {
            Some(c) if self.fail_if_full && c.hp.is_full() => Err(EffectRefusal::AlreadyAtFullHp),
            _ => Ok(()),
        }
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let id = cx.resolve(self.target);
        let Some(combatant) = cx.combatant(self.target) else {
            debug!(target: "battle::effect", %id, "heal skipped: not in play");
            return;
        };
        let amount = percent_of(combatant.hp.maximum, self.percent);
        restore(cx, id, amount);
    }
}

/// The user takes a share of the damage dealt this strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RecoilEffect {
    pub percent: u32,
}

impl RecoilEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let dealt = dealt_this_strike(cx);
        if dealt == 0 || cx.combatant(Who::User).is_none() {
            return;
        }
        let user = cx.ctx.user;
        let amount = percent_of(dealt, self.percent);
        cx.log(Message::new("battle.recoil").subject(user).value(i64::from(amount)));
        inflict(cx, user, amount);
    }
}

/// The user heals by a share of the damage dealt this strike.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DrainEffect {
    pub percent: u32,
}

impl DrainEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let dealt = dealt_this_strike(cx);
        if dealt == 0 || cx.combatant(Who::User).is_none() {
            return;
        }
        let user = cx.ctx.user;
        restore(cx, user, percent_of(dealt, self.percent));
    }
}

fn dealt_this_strike(cx: &EffectCx<'_, '_>) -> u32 {
    u32::try_from(cx.ctx.local.count::<DamageDealt>().max(0)).unwrap_or(u32::MAX)
}

/// `value × percent / 100`, at least 1 for a non-zero percentage.
fn percent_of(value: u32, percent: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(percent) / 100;
    let scaled = u32::try_from(scaled).unwrap_or(u32::MAX);
    if percent > 0 { scaled.max(1) } else { 0 }
}

/// Removes HP, logs the damage and a faint. Returns the HP actually removed.
fn inflict(cx: &mut EffectCx<'_, '_>, id: CharacterId, amount: u32) -> u32 {
    let Some(combatant) = cx.world.field.get_mut(id) else {
        return 0;
    };
    let removed = combatant.hp.drain(amount);
    let fainted = combatant.is_fainted();
    cx.log(Message::new("battle.damage").subject(id).value(i64::from(removed)));
    if fainted {
        cx.log(Message::new("battle.fainted").subject(id));
    }
    removed
}

/// Restores HP and publishes it as healing when anything was restored.
fn restore(cx: &mut EffectCx<'_, '_>, id: CharacterId, amount: u32) {
    let Some(combatant) = cx.world.field.get_mut(id) else {
        return;
    };
    let added = combatant.hp.restore(amount);
    if added > 0 {
        cx.ctx.local.add::<HealDealt>(i64::from(added));
        cx.log(Message::new("battle.heal").subject(id).value(i64::from(added)));
    } else {
        cx.log(Message::new("battle.heal.none").subject(id));
    }
}

#[cfg(test)]
mod tests {
    use super::percent_of;

    #[test]
    fn percent_of_floors_at_one() {
        assert_eq!(percent_of(40, 25), 10);
        assert_eq!(percent_of(3, 10), 1);
        assert_eq!(percent_of(50, 0), 0);
    }
}
