//! Accuracy check for one strike.

use tracing::debug;

use crate::cells::{AccuracyBoost, AccuracyMult, EvasionBoost, Fraction, TargetSpeed, UserSpeed};
use crate::config::BattleConfig;
use crate::context::{BattleContext, HitRate};
use crate::env::{BattleEnv, CombatTables};
use crate::world::World;

/// How an accuracy check was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitCheck {
    /// The user's previous check missed, so this one cannot.
    Forced,
    /// The move never misses.
    Always,
    /// The accuracy multiplier was neutralized.
    Nullified,
    Rolled { accuracy: i64, roll: u32 },
}

impl HitCheck {
    pub fn is_hit(&self) -> bool {
        match self {
            Self::Forced | Self::Always => true,
            Self::Nullified => false,
            Self::Rolled { accuracy, roll } => i64::from(*roll) < *accuracy,
        }
    }
}

/// Final accuracy percentage before the roll.
///
/// # Formula
///
/// ```text
/// acc = hit_rate
/// acc = acc × accuracy_table[acc_level]
/// acc = acc × accuracy_table[-eva_level]
/// acc = acc × user_speed / target_speed
/// acc = multiplier.apply(acc)
/// ```
///
/// Each step truncates. Target speed is floored at 1.
pub fn accuracy_percent(
    hit_rate: u32,
    acc_level: i32,
    eva_level: i32,
    user_speed: i64,
    target_speed: i64,
    multiplier: &Fraction,
    tables: &CombatTables,
) -> i64 {
    let mut acc = i64::from(hit_rate);
    acc = tables.accuracy.apply(acc_level, acc);
    acc = tables.accuracy.apply(eva_level.saturating_neg(), acc);
    acc = acc * user_speed / target_speed.max(1);
    multiplier.apply(acc)
}

/// Runs the accuracy check for the current strike.
///
/// Check order:
/// 1. A user whose previous check missed is guaranteed to hit. The guarantee
///    is consumed by every check, hit or miss.
/// 2. A neutralized accuracy multiplier misses.
/// 3. `HitRate::Always` hits.
/// 4. Otherwise roll `0..100` against [`accuracy_percent`].
///
/// A miss arms the guarantee for the user's next check.
pub fn check_hit(env: BattleEnv<'_>, ctx: &BattleContext, world: &mut World<'_>) -> HitCheck {
    let forced = world
        .field
        .get_mut(ctx.user)
        .is_some_and(|user| user.take_forced_hit());

    let check = if forced {
        HitCheck::Forced
    } else if ctx.local.is_neutralized::<AccuracyMult>() {
        HitCheck::Nullified
    } else {
        match ctx.spec.hit_rate {
            HitRate::Always => HitCheck::Always,
            HitRate::Percent(rate) => {
                let multiplier = ctx
                    .local
                    .get::<AccuracyMult>()
                    .map_or(Fraction::ONE, |cell| cell.0);
                let accuracy = accuracy_percent(
                    rate,
                    level(ctx.local.count::<AccuracyBoost>()),
                    level(ctx.local.count::<EvasionBoost>()),
                    ctx.local.count::<UserSpeed>(),
                    ctx.local.count::<TargetSpeed>(),
                    &multiplier,
                    env.tables,
                );
                let roll = world.rng.range(0, BattleConfig::ACCURACY_ROLL_SPAN - 1);
                HitCheck::Rolled { accuracy, roll }
            }
        }
    };

    if !check.is_hit() {
        if let Some(user) = world.field.get_mut(ctx.user) {
            user.record_miss();
        }
    }

    debug!(
        target: "battle::combat",
        user = %ctx.user,
        target = %ctx.target,
        ?check,
        hit = check.is_hit(),
        "accuracy check"
    );
    check
}

pub(crate) fn level(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_accuracy_is_hit_rate() {
        let tables = CombatTables::default();
        assert_eq!(
            accuracy_percent(90, 0, 0, 10, 10, &Fraction::ONE, &tables),
            90
        );
    }

    #[test]
    fn boosts_and_speed_scale_accuracy() {
        let tables = CombatTables::default();
        // +1 accuracy: 4/3, +1 evasion mirrored: 3/4, speed 20/10.
        assert_eq!(
            accuracy_percent(60, 1, 1, 20, 10, &Fraction::ONE, &tables),
            120
        );
        // -6 accuracy: 3/9.
        assert_eq!(
            accuracy_percent(90, -6, 0, 5, 5, &Fraction::ONE, &tables),
            30
        );
    }

    #[test]
    fn zero_target_speed_does_not_divide_by_zero() {
        let tables = CombatTables::default();
        assert_eq!(accuracy_percent(50, 0, 0, 3, 0, &Fraction::ONE, &tables), 150);
    }

    #[test]
    fn multiplier_applies_last() {
        let tables = CombatTables::default();
        let mut half = Fraction::ONE;
        half.multiply(1, 2);
        assert_eq!(accuracy_percent(75, 0, 0, 1, 1, &half, &tables), 37);
    }

    #[test]
    fn rolled_check_hits_strictly_below_accuracy() {
        assert!(HitCheck::Rolled { accuracy: 70, roll: 69 }.is_hit());
        assert!(!HitCheck::Rolled { accuracy: 70, roll: 70 }.is_hit());
        assert!(!HitCheck::Nullified.is_hit());
        assert!(HitCheck::Forced.is_hit());
    }
}
