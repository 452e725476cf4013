//! Effect node enum and leaf dispatcher.

use crate::cells::{AccuracyMult, DamageMult, Ratio};
use crate::env::Reference;
use crate::state::{ElementId, SkillId};

use super::condition::Condition;
use super::cx::EffectCx;
use super::damage::{DamageEffect, DrainEffect, FixedDamageEffect, HealEffect, RecoilEffect};
use super::flow::{CancelEffect, ReplaceMoveEffect};
use super::modifier::{self, BoostEffect, ChangeStageEffect, StrikeFlag};
use super::presentation::{AnimateEffect, LogEffect, SoundEffect};
use super::status::{ApplyStatusEffect, RemoveStatusEffect, StealItemEffect};
use super::Phase;

/// An authored effect template.
///
/// Combinator variants are interpreted by [`EffectRun`](super::EffectRun);
/// every other variant is a leaf dispatched through [`EffectNode::run_leaf`].
/// `Clone` is deep: nested child lists are owned.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EffectNode {
    // ========================================================================
    // Combinators
    // ========================================================================
    /// Run all children in order.
    Sequence(Vec<EffectNode>),

    /// Run exactly one child, drawn uniformly from the shared stream.
    ChooseOne(Vec<EffectNode>),

    /// Run one branch depending on a condition.
    Conditional {
        condition: Condition,
        then_effects: Vec<EffectNode>,
        #[cfg_attr(feature = "serde", serde(default))]
        else_effects: Vec<EffectNode>,
    },

    /// Run a child `count` times.
    Repeat { count: u32, effect: Box<EffectNode> },

    /// Run a child while the condition holds, at most `limit` times.
    RepeatWhile {
        condition: Condition,
        limit: u32,
        effect: Box<EffectNode>,
    },

    /// Run a child at most once per action, across all strikes.
    OncePerAction { key: u32, effect: Box<EffectNode> },

    /// Run another skill's effects for one phase.
    Invoke { skill: SkillId, phase: Phase },

    // ========================================================================
    // Presentation
    // ========================================================================
    Wait(u32),
    PlaySound(SoundEffect),
    Animate(AnimateEffect),
    Log(LogEffect),

    // ========================================================================
    // Modifiers
    // ========================================================================
    Boost(BoostEffect),
    ChangeStage(ChangeStageEffect),
    MultiplyDamage(Ratio),
    MultiplyAccuracy(Ratio),
    ElementImmunity(ElementId),
    FlipCategory,
    SetFlag(StrikeFlag),

    // ========================================================================
    // Outcomes
    // ========================================================================
    Damage(DamageEffect),
    FixedDamage(FixedDamageEffect),
    Heal(HealEffect),
    Recoil(RecoilEffect),
    Drain(DrainEffect),
    ApplyStatus(ApplyStatusEffect),
    RemoveStatus(RemoveStatusEffect),
    StealItem(StealItemEffect),

    // ========================================================================
    // Flow
    // ========================================================================
    Cancel(CancelEffect),
    CancelTurn,
    SetStrikes(u32),
    AddStrikes(i32),
    ReplaceMove(ReplaceMoveEffect),
}

impl EffectNode {
    pub fn is_combinator(&self) -> bool {
        matches!(
            self,
            Self::Sequence(_)
                | Self::ChooseOne(_)
                | Self::Conditional { .. }
                | Self::Repeat { .. }
                | Self::RepeatWhile { .. }
                | Self::OncePerAction { .. }
                | Self::Invoke { .. }
        )
    }

    /// Runs a leaf: precondition check, then the mutation.
    ///
    /// A failed precondition is reported through [`EffectCx::refuse`], which
    /// cancels the current phase. Combinators are a no-op here.
    pub fn run_leaf(&self, cx: &mut EffectCx<'_, '_>) {
        let checked = match self {
            Self::Heal(e) => e.pre_validate(cx),
            Self::StealItem(e) => e.pre_validate(cx),
            _ => Ok(()),
        };
        if let Err(refusal) = checked {
            cx.refuse(refusal);
            return;
        }

        match self {
            Self::Wait(frames) => cx.wait_frames(*frames),
            Self::PlaySound(e) => e.apply(cx),
            Self::Animate(e) => e.apply(cx),
            Self::Log(e) => e.apply(cx),

            Self::Boost(e) => e.apply(cx),
            Self::ChangeStage(e) => e.apply(cx),
            Self::MultiplyDamage(ratio) => cx.ctx.local.multiply_by::<DamageMult>(*ratio),
            Self::MultiplyAccuracy(ratio) => cx.ctx.local.multiply_by::<AccuracyMult>(*ratio),
            Self::ElementImmunity(element) => modifier::element_immunity(cx, *element),
            Self::FlipCategory => modifier::flip_category(cx),
            Self::SetFlag(flag) => modifier::set_flag(cx, *flag),

            Self::Damage(e) => e.apply(cx),
            Self::FixedDamage(e) => e.apply(cx),
            Self::Heal(e) => e.apply(cx),
            Self::Recoil(e) => e.apply(cx),
            Self::Drain(e) => e.apply(cx),
            Self::ApplyStatus(e) => e.apply(cx),
            Self::RemoveStatus(e) => e.apply(cx),
            Self::StealItem(e) => e.apply(cx),

            Self::Cancel(e) => e.apply(cx),
            Self::CancelTurn => cx.ctx.cancel_turn(),
            Self::SetStrikes(n) => cx.ctx.set_strikes(*n),
            Self::AddStrikes(n) => cx.ctx.add_strikes(*n),
            Self::ReplaceMove(e) => e.apply(cx),

            Self::Sequence(_)
            | Self::ChooseOne(_)
            | Self::Conditional { .. }
            | Self::Repeat { .. }
            | Self::RepeatWhile { .. }
            | Self::OncePerAction { .. }
            | Self::Invoke { .. } => {}
        }
    }

    /// Collects catalog ids referenced anywhere in this tree.
    pub fn references(&self, out: &mut Vec<Reference>) {
        let mut statuses = Vec::new();
        match self {
            Self::Sequence(children) | Self::ChooseOne(children) => {
                children.iter().for_each(|c| c.references(out));
            }
            Self::Conditional {
                condition,
                then_effects,
                else_effects,
            } => {
                condition.statuses(&mut statuses);
                then_effects
                    .iter()
                    .chain(else_effects)
                    .for_each(|c| c.references(out));
            }
            Self::Repeat { effect, .. } | Self::OncePerAction { effect, .. } => {
                effect.references(out);
            }
            Self::RepeatWhile {
                condition, effect, ..
            } => {
                condition.statuses(&mut statuses);
                effect.references(out);
            }
            Self::Invoke { skill, .. } => out.push(Reference::Skill(*skill)),
            Self::ReplaceMove(e) => out.push(Reference::Skill(e.skill)),
            Self::ElementImmunity(element) => out.push(Reference::Element(*element)),
            Self::ApplyStatus(e) => statuses.push(e.status),
            Self::RemoveStatus(e) => statuses.push(e.status),
            _ => {}
        }
        out.extend(statuses.into_iter().map(Reference::Status));
    }

    /// Collects every `(skill, phase)` this tree would run through `Invoke`.
    pub fn invocations(&self, out: &mut Vec<(SkillId, Phase)>) {
        match self {
            Self::Sequence(children) | Self::ChooseOne(children) => {
                children.iter().for_each(|c| c.invocations(out));
            }
            Self::Conditional {
                then_effects,
                else_effects,
                ..
            } => then_effects
                .iter()
                .chain(else_effects)
                .for_each(|c| c.invocations(out)),
            Self::Repeat { effect, .. }
            | Self::RepeatWhile { effect, .. }
            | Self::OncePerAction { effect, .. } => effect.invocations(out),
            Self::Invoke { skill, phase } => out.push((*skill, *phase)),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StatusId;

    #[test]
    fn clone_is_deep() {
        let original = EffectNode::Sequence(vec![
            EffectNode::Wait(2),
            EffectNode::Conditional {
                condition: Condition::FirstStrike,
                then_effects: vec![EffectNode::CancelTurn],
                else_effects: Vec::new(),
            },
        ]);
        let mut copy = original.clone();
        if let EffectNode::Sequence(children) = &mut copy {
            children.push(EffectNode::FlipCategory);
            if let EffectNode::Conditional { then_effects, .. } = &mut children[1] {
                then_effects.clear();
            }
        }

        let EffectNode::Sequence(children) = &original else {
            panic!("expected sequence");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(
            &children[1],
            EffectNode::Conditional { then_effects, .. } if then_effects.len() == 1
        ));
        assert_ne!(original, copy);
    }

    #[test]
    fn references_walk_nested_trees() {
        let node = EffectNode::Repeat {
            count: 2,
            effect: Box::new(EffectNode::Conditional {
                condition: Condition::Not(Box::new(Condition::TargetHasStatus(StatusId(4)))),
                then_effects: vec![EffectNode::ApplyStatus(ApplyStatusEffect::new(StatusId(4)))],
                else_effects: vec![EffectNode::Invoke {
                    skill: SkillId(9),
                    phase: Phase::OnHit,
                }],
            }),
        };
        let mut out = Vec::new();
        node.references(&mut out);
        assert!(out.contains(&Reference::Skill(SkillId(9))));
        assert!(out.contains(&Reference::Status(StatusId(4))));
    }

    #[test]
    fn invocations_keep_the_invoked_phase() {
        let node = EffectNode::Sequence(vec![
            EffectNode::Wait(1),
            EffectNode::OncePerAction {
                key: 1,
                effect: Box::new(EffectNode::Invoke {
                    skill: SkillId(3),
                    phase: Phase::Prepare,
                }),
            },
        ]);
        let mut out = Vec::new();
        node.invocations(&mut out);
        assert_eq!(out, vec![(SkillId(3), Phase::Prepare)]);
    }

    #[test]
    fn only_combinators_report_as_such() {
        assert!(EffectNode::Sequence(Vec::new()).is_combinator());
        assert!(!EffectNode::Wait(1).is_combinator());
        assert!(!EffectNode::Damage(DamageEffect::new()).is_combinator());
    }
}
