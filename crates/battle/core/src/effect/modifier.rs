//! Modifier effects: write accumulator cells that the built-in hit and damage
//! steps read later in the same strike.

use tracing::debug;

use crate::cells::{
    AccuracyBoost, AttackBoost, CategoryFlip, Contact, CritLevel, DamageMult, DefenseBoost,
    EvasionBoost, NoCrit, Precision, SpAtkBoost, SpDefBoost, ZeroAllowed,
};
use crate::env::Message;
use crate::state::{ElementId, StageStat};

use super::Who;
use super::cx::EffectCx;

/// Strike-scoped boost counters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoostStat {
    /// Attacker's Attack level.
    Attack,
    SpAtk,
    /// Defender's Defense level.
    Defense,
    SpDef,
    Accuracy,
    Evasion,
    Crit,
}

/// Adds to a boost level for the current strike only.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostEffect {
    pub stat: BoostStat,
    pub amount: i32,
}

impl BoostEffect {
    pub fn new(stat: BoostStat, amount: i32) -> Self {
        Self { stat, amount }
    }

    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let local = &mut cx.ctx.local;
        let delta = i64::from(self.amount);
        match self.stat {
            BoostStat::Attack => local.add::<AttackBoost>(delta),
            BoostStat::SpAtk => local.add::<SpAtkBoost>(delta),
            BoostStat::Defense => local.add::<DefenseBoost>(delta),
            BoostStat::SpDef => local.add::<SpDefBoost>(delta),
            BoostStat::Accuracy => local.add::<AccuracyBoost>(delta),
            BoostStat::Evasion => local.add::<EvasionBoost>(delta),
            BoostStat::Crit => local.add::<CritLevel>(delta),
        };
    }
}

/// Shifts a persistent boost stage on a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeStageEffect {
    #[cfg_attr(feature = "serde", serde(default))]
    pub target: Who,
    pub stat: StageStat,
    pub amount: i32,
}

impl ChangeStageEffect {
    pub fn apply(&self, cx: &mut EffectCx<'_, '_>) {
        let id = cx.resolve(self.target);
        let Some(combatant) = cx.combatant_mut(self.target) else {
            debug!(target: "battle::effect", %id, "stage change skipped: not in play");
            return;
        };
        let applied = combatant.boosts.shift(self.stat, self.amount);
        let key = match applied.signum() {
            1 => "battle.stage.rise",
            -1 => "battle.stage.fall",
            _ => "battle.stage.unchanged",
        };
        cx.log(Message::new(key).subject(id).value(i64::from(applied)));
    }
}

/// Flags set for the current strike. The local store is cleared before the
/// next strike, so none of them outlive it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StrikeFlag {
    /// Critical hits use the precision ratio.
    Precision,
    NoCrit,
    ZeroAllowed,
    Contact,
}

pub(super) fn set_flag(cx: &mut EffectCx<'_, '_>, flag: StrikeFlag) {
    let local = &mut cx.ctx.local;
    match flag {
        StrikeFlag::Precision => local.set(Precision),
        StrikeFlag::NoCrit => local.set(NoCrit),
        StrikeFlag::ZeroAllowed => local.set(ZeroAllowed),
        StrikeFlag::Contact => local.set(Contact),
    }
}

pub(super) fn flip_category(cx: &mut EffectCx<'_, '_>) {
    cx.ctx.local.set(CategoryFlip);
}

/// Neutralizes damage from moves of `element`.
pub(super) fn element_immunity(cx: &mut EffectCx<'_, '_>, element: ElementId) {
    if cx.ctx.spec.element != element {
        return;
    }
    cx.ctx.local.multiply::<DamageMult>(0, 1);
    let holder = cx.resolve(Who::Holder);
    cx.log(Message::new("battle.immune").subject(holder));
}
