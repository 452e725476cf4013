//! Cell types understood by the built-in resolution steps.

use std::collections::BTreeSet;

use super::accumulator::{Counter, Fraction, Multiplier};
use super::{Cell, CellCategory};

macro_rules! counter_cells {
    ($category:ident => $($(#[$meta:meta])* $name:ident,)+) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name(pub i64);

            impl Cell for $name {
                const CATEGORY: CellCategory = CellCategory::$category;
            }

            impl Counter for $name {
                fn value(&self) -> i64 {
                    self.0
                }

                fn value_mut(&mut self) -> &mut i64 {
                    &mut self.0
                }
            }
        )+
    };
}

macro_rules! multiplier_cells {
    ($($(#[$meta:meta])* $name:ident,)+) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name(pub Fraction);

            impl Cell for $name {
                const CATEGORY: CellCategory = CellCategory::Modifier;
            }

            impl Multiplier for $name {
                fn fraction(&self) -> &Fraction {
                    &self.0
                }

                fn fraction_mut(&mut self) -> &mut Fraction {
                    &mut self.0
                }
            }
        )+
    };
}

macro_rules! flag_cells {
    ($category:ident => $($(#[$meta:meta])* $name:ident,)+) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
            pub struct $name;

            impl Cell for $name {
                const CATEGORY: CellCategory = CellCategory::$category;
            }
        )+
    };
}

counter_cells! { Staged =>
    UserLevel,
    TargetLevel,
    /// Attacker's effective Attack when the strike began.
    UserAttack,
    UserSpAtk,
    /// Defender's effective Defense when the strike began.
    TargetDefense,
    TargetSpDef,
    UserSpeed,
    TargetSpeed,
}

counter_cells! { Modifier =>
    /// Attacker's Attack boost level for this strike.
    AttackBoost,
    SpAtkBoost,
    /// Defender's Defense boost level for this strike.
    DefenseBoost,
    SpDefBoost,
    AccuracyBoost,
    EvasionBoost,
    /// Index into the critical chance table.
    CritLevel,
}

counter_cells! { Outcome =>
    /// Damage dealt by the current strike.
    DamageDealt,
    /// HP restored by the current strike.
    HealDealt,
    /// Damage dealt across all strikes of the action.
    TotalDamage,
    TotalHealed,
    StrikesLanded,
}

multiplier_cells! {
    /// Final damage multiplier. Neutralized means the strike deals no damage.
    DamageMult,
    /// Accuracy multiplier. Neutralized means the strike always misses.
    AccuracyMult,
}

flag_cells! { Modifier =>
    /// Swap the physical and magical stat pairs for this strike.
    CategoryFlip,
    /// Critical hits use the precision ratio instead of the normal one.
    Precision,
    /// No critical roll for this strike.
    NoCrit,
    /// This strike may deal 0 damage.
    ZeroAllowed,
    Contact,
}

flag_cells! { Outcome =>
    CriticalHit,
    /// The accuracy check of the current strike succeeded.
    Hit,
}

/// Summed effectiveness level of the last damage calculation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Effectiveness(pub i32);

impl Cell for Effectiveness {
    const CATEGORY: CellCategory = CellCategory::Outcome;
}

/// Keys of once-per-action effects that already ran.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FiredOnce(pub BTreeSet<u32>);

impl Cell for FiredOnce {
    const CATEGORY: CellCategory = CellCategory::Scratch;
}
