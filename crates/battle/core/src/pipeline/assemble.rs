//! Collects the effects scheduled for one phase.

use crate::context::{ActionKind, BattleContext};
use crate::effect::{EffectNode, EffectOwner, EffectSource, Phase, PhasedEffect};
use crate::env::{BattleEnv, Hooks};
use crate::priority::PriorityList;
use crate::state::{Battlefield, CharacterId};

/// Which side of the action a participant's hooks are read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    User,
    Target,
}

impl Side {
    fn hooks(self, hooks: &Hooks) -> &[PhasedEffect] {
        match self {
            Side::User => &hooks.as_user,
            Side::Target => &hooks.as_target,
        }
    }
}

struct Collector<'c> {
    phase: Phase,
    list: PriorityList<(EffectOwner, &'c EffectNode)>,
}

impl<'c> Collector<'c> {
    fn extend(&mut self, owner: EffectOwner, effects: &'c [PhasedEffect]) {
        for effect in effects.iter().filter(|e| e.phase == self.phase) {
            self.list.push(effect.priority, (owner, &effect.node));
        }
    }
}

/// Effects for `phase`, in run order.
///
/// Collection order, which also breaks priority ties:
/// 1. active map statuses
/// 2. the current move's skill
/// 3. the item being used or thrown
/// 4. the user's intrinsics, statuses and held item (user-side hooks)
/// 5. the target's intrinsics, statuses and held item (target-side hooks)
///
/// Participants out of play contribute nothing. Traps have no user side.
pub fn phase_entries<'c>(
    env: BattleEnv<'c>,
    ctx: &BattleContext,
    field: &Battlefield,
    phase: Phase,
) -> Vec<(EffectOwner, &'c EffectNode)> {
    let catalog = env.catalog;
    let mut collector = Collector {
        phase,
        list: PriorityList::new(),
    };

    for &id in field.map_statuses() {
        if let Some(data) = catalog.map_status(id) {
            collector.extend(EffectOwner::new(EffectSource::MapStatus(id), None), &data.effects);
        }
    }

    if let Some((skill, data)) = ctx.spec.skill.and_then(|id| Some((id, catalog.skill(id)?))) {
        let owner = EffectOwner::new(EffectSource::Skill(skill), Some(ctx.user));
        collector.extend(owner, &data.effects);
    }

    if let Some((item, data)) = ctx.item.and_then(|p| Some((p.item, catalog.item(p.item)?))) {
        let owner = EffectOwner::new(EffectSource::Item(item), Some(ctx.user));
        collector.extend(owner, &data.effects);
    }

    if ctx.action != ActionKind::Trap {
        collect_hooks(env, field, ctx.user, Side::User, &mut collector);
    }
    collect_hooks(env, field, ctx.target, Side::Target, &mut collector);

    collector.list.into_ordered()
}

fn collect_hooks<'c>(
    env: BattleEnv<'c>,
    field: &Battlefield,
    holder: CharacterId,
    side: Side,
    collector: &mut Collector<'c>,
) {
    let Some(combatant) = field.get(holder).filter(|c| !c.is_fainted()) else {
        return;
    };
    let catalog = env.catalog;

    for &id in &combatant.intrinsics {
        if let Some(data) = catalog.intrinsic(id) {
            let owner = EffectOwner::new(EffectSource::Intrinsic(id), Some(holder));
            collector.extend(owner, side.hooks(&data.hooks));
        }
    }
    for status in &combatant.statuses {
        if let Some(data) = catalog.status(status.id) {
            let owner = EffectOwner::new(EffectSource::Status(status.id), Some(holder));
            collector.extend(owner, side.hooks(&data.hooks));
        }
    }
    if let Some((item, data)) = combatant.held_item.and_then(|id| Some((id, catalog.item(id)?))) {
        let owner = EffectOwner::new(EffectSource::Item(item), Some(holder));
        collector.extend(owner, side.hooks(&data.held));
    }
}
