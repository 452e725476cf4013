//! Damage calculation for one strike.

use tracing::debug;

use crate::cells::{
    AttackBoost, CategoryFlip, CriticalHit, CritLevel, DamageMult, DefenseBoost, Effectiveness,
    Precision, SpAtkBoost, SpDefBoost, TargetDefense, TargetSpDef, UserAttack, UserLevel,
    UserSpAtk,
};
use crate::config::BattleConfig;
use crate::context::{BattleContext, Category, MoveFlags};
use crate::env::{BattleEnv, Matchup};
use crate::state::ElementId;
use crate::world::World;

use super::hit::level;

/// Result of one damage calculation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    pub damage: u32,
    pub critical: bool,
    /// Summed effectiveness level, `None` when the defender is immune.
    pub effectiveness: Option<i32>,
}

/// Base damage before the accumulated multiplier.
///
/// # Formula
///
/// ```text
/// base = (level / 3 + 6) × atk × power / def / 50 × variance / 100
/// ```
///
/// Evaluated left to right, truncating at every division. Defense is
/// floored at 1.
pub fn base_damage(level: i64, atk: i64, def: i64, power: i64, variance: i64) -> i64 {
    let scale = level / BattleConfig::LEVEL_DIVISOR + BattleConfig::LEVEL_OFFSET;
    scale * atk * power / def.max(1) / BattleConfig::DAMAGE_DIVISOR * variance / 100
}

/// Summed effectiveness of `attacking` against every defending element.
///
/// `None` if any defending element is immune.
pub fn effectiveness_level(
    env: BattleEnv<'_>,
    attacking: ElementId,
    defending: &[ElementId],
) -> Option<i32> {
    defending
        .iter()
        .try_fold(0i32, |sum, element| match env.catalog.matchup(attacking, *element) {
            Matchup::Immune => None,
            Matchup::Level(level) => Some(sum.saturating_add(level)),
        })
}

/// Runs the damage calculation for the current strike.
///
/// Steps, in order:
/// 1. Pick the stat pair by category (swapped by [`CategoryFlip`]).
/// 2. Critical roll unless the move has `NO_CRIT`. On a critical hit the
///    damage multiplier takes the crit (or precision) ratio, the attacker's
///    negative boosts and the defender's positive boosts are ignored.
/// 3. Boost levels through the stat boost table.
/// 4. Same-element ratio when the user shares the move's element.
/// 5. Effectiveness ratio, or neutralization on immunity.
/// 6. Neutralized multiplier: 0 damage, nothing else is drawn.
/// 7. Variance roll, [`base_damage`], multiplier, floor of 1 unless
///    `ZERO_ALLOWED`.
///
/// Writes [`CriticalHit`], [`Effectiveness`] and [`DamageMult`] into the
/// local store.
pub fn calculate_damage(
    env: BattleEnv<'_>,
    ctx: &mut BattleContext,
    world: &mut World<'_>,
    power: u32,
) -> DamageRoll {
    let tables = env.tables;
    let flags = ctx.flags();
    let local = &mut ctx.local;

    let physical = match ctx.spec.category {
        Category::Magical => false,
        Category::Physical | Category::Status | Category::None => true,
    };
    let physical = physical != local.contains::<CategoryFlip>();
    let (atk, def, atk_level, def_level) = if physical {
        (
            local.count::<UserAttack>(),
            local.count::<TargetDefense>(),
            level(local.count::<AttackBoost>()),
            level(local.count::<DefenseBoost>()),
        )
    } else {
        (
            local.count::<UserSpAtk>(),
            local.count::<TargetSpDef>(),
            level(local.count::<SpAtkBoost>()),
            level(local.count::<SpDefBoost>()),
        )
    };

    let critical = !flags.contains(MoveFlags::NO_CRIT) && {
        let chance = tables.crit_chance(local.count::<CritLevel>());
        world.rng.range(0, 99) < chance
    };
    let (atk_level, def_level) = if critical {
        local.set(CriticalHit);
        let ratio = if local.contains::<Precision>() {
            tables.precision_crit_ratio
        } else {
            tables.crit_ratio
        };
        local.multiply_by::<DamageMult>(ratio);
        (atk_level.max(0), def_level.min(0))
    } else {
        (atk_level, def_level)
    };

    let atk = tables.stat_boost.apply(atk_level, atk);
    let def = tables.stat_boost.apply(def_level, def);

    let element = ctx.spec.element;
    let same_element = element != ElementId::NONE
        && world
            .field
            .get(ctx.user)
            .is_some_and(|user| user.has_element(element));
    if same_element {
        local.multiply_by::<DamageMult>(tables.same_element_ratio);
    }

    let defending = world
        .field
        .get(ctx.target)
        .map(|target| target.elements.to_vec())
        .unwrap_or_default();
    let effectiveness = effectiveness_level(env, element, &defending);
    match effectiveness {
        Some(sum) => {
            local.set(Effectiveness(sum));
            local.multiply_by::<DamageMult>(tables.effectiveness.ratio(sum));
        }
        None => local.multiply::<DamageMult>(0, 1),
    }

    if local.is_neutralized::<DamageMult>() {
        debug!(target: "battle::combat", user = %ctx.user, target = %ctx.target, "damage neutralized");
        return DamageRoll {
            damage: 0,
            critical,
            effectiveness,
        };
    }

    let variance = world
        .rng
        .range(BattleConfig::VARIANCE_MIN, BattleConfig::VARIANCE_MAX);
    let base = base_damage(
        local.count::<UserLevel>(),
        atk,
        def,
        i64::from(power),
        i64::from(variance),
    );
    let mut damage = local.apply::<DamageMult>(base).max(0);
    if !flags.contains(MoveFlags::ZERO_ALLOWED) {
        damage = damage.max(1);
    }

    debug!(
        target: "battle::combat",
        user = %ctx.user,
        target = %ctx.target,
        power,
        atk,
        def,
        variance,
        base,
        damage,
        critical,
        "damage calculated"
    );

    DamageRoll {
        damage: u32::try_from(damage).unwrap_or(u32::MAX),
        critical,
        effectiveness,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_damage_truncates_in_order() {
        // (10/3 + 6) = 9; 9*20*40 = 7200; /15 = 480; /50 = 9; *100/100 = 9
        assert_eq!(base_damage(10, 20, 15, 40, 100), 9);
        // variance 90: 9*90/100 = 8
        assert_eq!(base_damage(10, 20, 15, 40, 90), 8);
    }

    #[test]
    fn zero_defense_is_floored() {
        assert_eq!(base_damage(0, 10, 0, 50, 100), 60);
    }
}
