//! Predicates over the resolution record for conditional effects.

use crate::cells::{CriticalHit, Hit};
use crate::context::{ActionKind, Category};
use crate::state::{ElementId, StatusId};

use super::cx::EffectCx;
use super::Who;

/// Condition for conditional effects.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    /// All conditions must be true (short-circuits).
    And(Vec<Condition>),

    /// Any condition must be true (short-circuits).
    Or(Vec<Condition>),

    /// Condition must be false.
    Not(Box<Condition>),

    /// Random chance (percentage, 0-100). Draws from the shared stream.
    Chance(u32),

    UserHasStatus(StatusId),
    TargetHasStatus(StatusId),

    /// Target carries any status tagged with this category.
    TargetHasStatusTag(String),

    MoveCategory(Category),
    MoveElement(ElementId),

    /// Target HP strictly below this percentage of its maximum.
    TargetHpBelow(u32),
    TargetAtFullHp,

    /// The current strike is a critical hit.
    WasCritical,

    /// The current strike passed its accuracy check.
    DidHit,

    FirstStrike,
    ActionKind(ActionKind),
}

impl Condition {
    pub fn evaluate(&self, cx: &mut EffectCx<'_, '_>) -> bool {
        match self {
            Self::And(all) => all.iter().all(|c| c.evaluate(cx)),
            Self::Or(any) => any.iter().any(|c| c.evaluate(cx)),
            Self::Not(inner) => !inner.evaluate(cx),
            Self::Chance(percent) => cx.world.rng.chance(*percent),
            Self::UserHasStatus(status) => cx
                .combatant(Who::User)
                .is_some_and(|c| c.has_status(*status)),
            Self::TargetHasStatus(status) => cx
                .combatant(Who::Target)
                .is_some_and(|c| c.has_status(*status)),
            Self::TargetHasStatusTag(tag) => {
                let catalog = cx.env.catalog;
                cx.combatant(Who::Target).is_some_and(|c| {
                    c.statuses.iter().any(|s| {
                        catalog
                            .status(s.id)
                            .is_some_and(|data| data.has_tag(tag))
                    })
                })
            }
            Self::MoveCategory(category) => cx.ctx.spec.category == *category,
            Self::MoveElement(element) => cx.ctx.spec.element == *element,
            Self::TargetHpBelow(percent) => cx
                .combatant(Who::Target)
                .is_some_and(|c| c.hp.percent() < *percent),
            Self::TargetAtFullHp => cx
                .combatant(Who::Target)
                .is_some_and(|c| c.hp.is_full()),
            Self::WasCritical => cx.ctx.local.contains::<CriticalHit>(),
            Self::DidHit => cx.ctx.local.contains::<Hit>(),
            Self::FirstStrike => cx.ctx.is_first_strike(),
            Self::ActionKind(kind) => cx.ctx.action == *kind,
        }
    }

    /// Catalog ids this condition refers to.
    pub(crate) fn statuses(&self, out: &mut Vec<StatusId>) {
        match self {
            Self::And(all) | Self::Or(all) => all.iter().for_each(|c| c.statuses(out)),
            Self::Not(inner) => inner.statuses(out),
            Self::UserHasStatus(status) | Self::TargetHasStatus(status) => out.push(*status),
            _ => {}
        }
    }
}
