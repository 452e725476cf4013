//! The resolution record threaded through every effect of one action.

use bitflags::bitflags;

use crate::cells::{CellCategory, CellStore, Contact, NoCrit, ZeroAllowed};
use crate::state::{CharacterId, ElementId, ItemId, Position, SkillId};

/// What kind of action is being resolved.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ActionKind {
    #[default]
    Skill,
    Item,
    Throw,
    Trap,
}

/// Where the executed move came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum UsageSlot {
    /// No selection: the move was forced on the user by another effect.
    Forced,
    DefaultAttack,
    EquippedItem,
    FloorItem,
    /// Index into the user's skill slots.
    Skill(u8),
    /// Index into the inventory.
    Inventory(u8),
}

/// Damage category. Selects which stat pair the damage formula reads.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Category {
    #[default]
    Physical,
    Magical,
    Status,
    None,
}

/// Base accuracy of a move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HitRate {
    Always,
    Percent(u32),
}

impl Default for HitRate {
    fn default() -> Self {
        Self::Percent(100)
    }
}

bitflags! {
    /// Static traits of a move.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MoveFlags: u8 {
        /// The move touches the target.
        const CONTACT      = 1 << 0;
        /// Damage may round down to 0 instead of the usual floor of 1.
        const ZERO_ALLOWED = 1 << 1;
        /// The move never rolls a critical hit.
        const NO_CRIT      = 1 << 2;
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for MoveFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        bitflags::serde::serialize(self, serializer)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for MoveFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        bitflags::serde::deserialize(deserializer)
    }
}

/// Targeting shape of a move. Opaque to resolution; consumed by targeting code.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hitbox {
    #[default]
    Adjacent,
    Line {
        range: u8,
    },
    Room,
    Radius {
        radius: u8,
    },
}

/// Area damage around the impact tile.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Explosion {
    pub radius: u8,
    pub hits_user: bool,
}

/// Item being used or thrown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemPayload {
    pub item: ItemId,
    /// Removed from its source when the action finishes.
    pub consumed: bool,
}

/// The move currently being executed.
///
/// Built from catalog data when the action starts and replaceable by effects
/// mid-resolution. Later phases read whatever is current.
#[derive(Clone, Debug, Default)]
pub struct MoveSpec {
    pub skill: Option<SkillId>,
    pub element: ElementId,
    pub category: Category,
    pub power: u32,
    pub hit_rate: HitRate,
    pub flags: MoveFlags,
    /// Traits carried by the move, copied into the local store at each strike.
    pub cells: CellStore,
}

/// Resolution record for one action.
///
/// Owned by exactly one in-flight action run. Participants are registry ids;
/// character state itself lives in the [`Battlefield`](crate::state::Battlefield).
#[derive(Clone, Debug)]
pub struct BattleContext {
    pub user: CharacterId,
    pub target: CharacterId,
    pub action: ActionKind,
    pub slot: UsageSlot,
    pub spec: MoveSpec,
    pub hitbox: Hitbox,
    pub explosion: Option<Explosion>,
    pub item: Option<ItemPayload>,

    strikes: u32,
    strikes_made: u32,

    /// Per-strike cells, cleared before each strike.
    pub local: CellStore,
    /// Per-action cells.
    pub global: CellStore,

    cancelled: bool,
    turn_cancelled: bool,

    pub origin: Position,
    pub target_tile: Position,
    pub explosion_tile: Option<Position>,
    pub range_mod: i32,
}

impl BattleContext {
    pub fn new(
        user: CharacterId,
        target: CharacterId,
        action: ActionKind,
        slot: UsageSlot,
        spec: MoveSpec,
        strikes: u32,
    ) -> Self {
        Self {
            user,
            target,
            action,
            slot,
            spec,
            hitbox: Hitbox::default(),
            explosion: None,
            item: None,
            strikes,
            strikes_made: 0,
            local: CellStore::new(),
            global: CellStore::new(),
            cancelled: false,
            turn_cancelled: false,
            origin: Position::ORIGIN,
            target_tile: Position::ORIGIN,
            explosion_tile: None,
            range_mod: 0,
        }
    }

    // ===== strikes =====

    pub fn strikes(&self) -> u32 {
        self.strikes
    }

    pub fn strikes_made(&self) -> u32 {
        self.strikes_made
    }

    pub fn remaining_strikes(&self) -> u32 {
        self.strikes - self.strikes_made
    }

    /// Sets the strike total. Never drops below the strikes already made.
    pub fn set_strikes(&mut self, strikes: u32) {
        self.strikes = strikes.max(self.strikes_made);
    }

    pub fn add_strikes(&mut self, delta: i32) {
        let total = i64::from(self.strikes) + i64::from(delta);
        self.set_strikes(total.clamp(0, i64::from(u32::MAX)) as u32);
    }

    pub fn is_first_strike(&self) -> bool {
        self.strikes_made == 1
    }

    pub(crate) fn begin_strike(&mut self) {
        debug_assert!(self.strikes_made < self.strikes);
        self.strikes_made += 1;
    }

    pub(crate) fn reset_local(&mut self) {
        self.local.clear();
    }

    // ===== flags =====

    /// Move flags plus those raised for the current strike only.
    pub fn flags(&self) -> MoveFlags {
        let mut flags = self.spec.flags;
        if self.local.contains::<NoCrit>() {
            flags.insert(MoveFlags::NO_CRIT);
        }
        if self.local.contains::<ZeroAllowed>() {
            flags.insert(MoveFlags::ZERO_ALLOWED);
        }
        if self.local.contains::<Contact>() {
            flags.insert(MoveFlags::CONTACT);
        }
        flags
    }

    // ===== cancellation =====

    /// Aborts the rest of the current phase.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    pub(crate) fn clear_cancel(&mut self) {
        self.cancelled = false;
    }

    /// Stops any strikes after the current one.
    pub fn cancel_turn(&mut self) {
        self.turn_cancelled = true;
    }

    pub fn is_turn_cancelled(&self) -> bool {
        self.turn_cancelled
    }

    // ===== move replacement =====

    /// Swaps in a new move. With `carry_traits`, modifier cells of the old
    /// move are copied over the new move's own.
    pub fn replace_move(&mut self, mut spec: MoveSpec, carry_traits: bool) {
        if carry_traits {
            self.spec
                .cells
                .copy_category_into(CellCategory::Modifier, &mut spec.cells);
        }
        self.spec = spec;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cells::{CritLevel, Precision};

    fn context(strikes: u32) -> BattleContext {
        BattleContext::new(
            CharacterId(0),
            CharacterId(1),
            ActionKind::Skill,
            UsageSlot::DefaultAttack,
            MoveSpec::default(),
            strikes,
        )
    }

    #[test]
    fn strike_total_never_drops_below_strikes_made() {
        let mut ctx = context(3);
        ctx.begin_strike();
        ctx.begin_strike();
        ctx.set_strikes(1);
        assert_eq!(ctx.strikes(), 2);
        ctx.add_strikes(-5);
        assert_eq!(ctx.strikes(), 2);
        ctx.add_strikes(2);
        assert_eq!(ctx.remaining_strikes(), 2);
    }

    #[test]
    fn cancellation_is_only_cleared_internally() {
        let mut ctx = context(1);
        ctx.cancel();
        assert!(ctx.is_cancelled());
        ctx.clear_cancel();
        assert!(!ctx.is_cancelled());
        assert!(!ctx.is_turn_cancelled());
    }

    #[test]
    fn replace_move_can_carry_modifier_traits() {
        let mut ctx = context(1);
        ctx.spec.cells.add::<CritLevel>(1);
        ctx.spec.cells.set(Precision);

        let mut next = MoveSpec {
            skill: Some(SkillId(7)),
            power: 90,
            ..MoveSpec::default()
        };
        next.cells.add::<CritLevel>(3);
        ctx.replace_move(next.clone(), true);
        assert_eq!(ctx.spec.skill, Some(SkillId(7)));
        assert_eq!(ctx.spec.cells.count::<CritLevel>(), 1);
        assert!(ctx.spec.cells.contains::<Precision>());

        ctx.replace_move(next, false);
        assert_eq!(ctx.spec.cells.count::<CritLevel>(), 3);
        assert!(!ctx.spec.cells.contains::<Precision>());
    }
}
