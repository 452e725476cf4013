//! Character state as seen by the combat engine.

use arrayvec::ArrayVec;

use crate::config::BattleConfig;

use super::common::{ElementId, IntrinsicId, ItemId, Position, ResourceMeter, SkillId, StatusId};

/// Base combat statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Stat {
    Attack,
    Defense,
    SpAtk,
    SpDef,
    Speed,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatBlock {
    pub attack: i32,
    pub defense: i32,
    pub sp_atk: i32,
    pub sp_def: i32,
    pub speed: i32,
}

impl StatBlock {
    pub const fn new(attack: i32, defense: i32, sp_atk: i32, sp_def: i32, speed: i32) -> Self {
        Self {
            attack,
            defense,
            sp_atk,
            sp_def,
            speed,
        }
    }

    pub fn get(&self, stat: Stat) -> i32 {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAtk => self.sp_atk,
            Stat::SpDef => self.sp_def,
            Stat::Speed => self.speed,
        }
    }
}

/// Per-stat overrides installed by transformation-like effects.
///
/// When present, an override replaces the base stat for every read through
/// [`Combatant::effective`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatOverrides {
    pub attack: Option<i32>,
    pub defense: Option<i32>,
    pub sp_atk: Option<i32>,
    pub sp_def: Option<i32>,
    pub speed: Option<i32>,
}

impl StatOverrides {
    pub fn get(&self, stat: Stat) -> Option<i32> {
        match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::SpAtk => self.sp_atk,
            Stat::SpDef => self.sp_def,
            Stat::Speed => self.speed,
        }
    }

    pub fn set(&mut self, stat: Stat, value: Option<i32>) {
        let slot = match stat {
            Stat::Attack => &mut self.attack,
            Stat::Defense => &mut self.defense,
            Stat::SpAtk => &mut self.sp_atk,
            Stat::SpDef => &mut self.sp_def,
            Stat::Speed => &mut self.speed,
        };
        *slot = value;
    }
}

/// Stats that carry persistent boost stages on a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StageStat {
    Attack,
    Defense,
    SpAtk,
    SpDef,
    Accuracy,
    Evasion,
}

/// Persistent boost stages, clamped to `-LIMIT..=LIMIT`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoostStages {
    pub attack: i32,
    pub defense: i32,
    pub sp_atk: i32,
    pub sp_def: i32,
    pub accuracy: i32,
    pub evasion: i32,
}

impl BoostStages {
    pub const LIMIT: i32 = 6;

    pub fn get(&self, stat: StageStat) -> i32 {
        match stat {
            StageStat::Attack => self.attack,
            StageStat::Defense => self.defense,
            StageStat::SpAtk => self.sp_atk,
            StageStat::SpDef => self.sp_def,
            StageStat::Accuracy => self.accuracy,
            StageStat::Evasion => self.evasion,
        }
    }

    /// Shifts a stage and returns the change that actually applied after clamping.
    pub fn shift(&mut self, stat: StageStat, delta: i32) -> i32 {
        let slot = match stat {
            StageStat::Attack => &mut self.attack,
            StageStat::Defense => &mut self.defense,
            StageStat::SpAtk => &mut self.sp_atk,
            StageStat::SpDef => &mut self.sp_def,
            StageStat::Accuracy => &mut self.accuracy,
            StageStat::Evasion => &mut self.evasion,
        };
        let before = *slot;
        *slot = (before + delta).clamp(-Self::LIMIT, Self::LIMIT);
        *slot - before
    }
}

/// A status condition currently attached to a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusInstance {
    pub id: StatusId,
    /// Remaining turns, `None` for conditions that last until removed.
    pub turns_left: Option<u32>,
}

/// A character participating in combat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Combatant {
    pub name: String,
    pub level: u32,
    pub hp: ResourceMeter,
    pub stats: StatBlock,
    pub proxy: StatOverrides,
    pub boosts: BoostStages,
    pub elements: ArrayVec<ElementId, { BattleConfig::MAX_ELEMENTS }>,
    pub intrinsics: ArrayVec<IntrinsicId, { BattleConfig::MAX_INTRINSICS }>,
    pub skills: ArrayVec<SkillId, { BattleConfig::MAX_SKILLS }>,
    pub statuses: ArrayVec<StatusInstance, { BattleConfig::MAX_STATUS_EFFECTS }>,
    pub held_item: Option<ItemId>,
    pub position: Position,
    /// Set when this character's last accuracy check missed.
    missed_last: bool,
}

impl Combatant {
    pub fn new(name: impl Into<String>, level: u32, max_hp: u32, stats: StatBlock) -> Self {
        Self {
            name: name.into(),
            level,
            hp: ResourceMeter::full(max_hp),
            stats,
            proxy: StatOverrides::default(),
            boosts: BoostStages::default(),
            elements: ArrayVec::new(),
            intrinsics: ArrayVec::new(),
            skills: ArrayVec::new(),
            statuses: ArrayVec::new(),
            held_item: None,
            position: Position::ORIGIN,
            missed_last: false,
        }
    }

    /// Builder: set elements (extra entries beyond capacity are dropped).
    pub fn with_elements(mut self, elements: impl IntoIterator<Item = ElementId>) -> Self {
        self.elements = elements.into_iter().take(BattleConfig::MAX_ELEMENTS).collect();
        self
    }

    /// Builder: set intrinsics (extra entries beyond capacity are dropped).
    pub fn with_intrinsics(mut self, intrinsics: impl IntoIterator<Item = IntrinsicId>) -> Self {
        self.intrinsics = intrinsics
            .into_iter()
            .take(BattleConfig::MAX_INTRINSICS)
            .collect();
        self
    }

    /// Builder: set skill slots (extra entries beyond capacity are dropped).
    pub fn with_skills(mut self, skills: impl IntoIterator<Item = SkillId>) -> Self {
        self.skills = skills.into_iter().take(BattleConfig::MAX_SKILLS).collect();
        self
    }

    /// Builder: set held item.
    pub fn with_item(mut self, item: ItemId) -> Self {
        self.held_item = Some(item);
        self
    }

    /// Builder: set position.
    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Stat value after proxy overrides.
    pub fn effective(&self, stat: Stat) -> i32 {
        self.proxy.get(stat).unwrap_or_else(|| self.stats.get(stat))
    }

    /// A character with no HP left has been removed from play.
    pub fn is_fainted(&self) -> bool {
        self.hp.is_empty()
    }

    pub fn has_element(&self, element: ElementId) -> bool {
        self.elements.contains(&element)
    }

    pub fn has_status(&self, status: StatusId) -> bool {
        self.statuses.iter().any(|s| s.id == status)
    }

    /// Attaches a status. Returns `false` if it is already present or no slot is free.
    pub fn add_status(&mut self, status: StatusInstance) -> bool {
        if self.has_status(status.id) {
            return false;
        }
        self.statuses.try_push(status).is_ok()
    }

    /// Detaches a status. Returns `false` if it was not present.
    pub fn remove_status(&mut self, status: StatusId) -> bool {
        match self.statuses.iter().position(|s| s.id == status) {
            Some(index) => {
                self.statuses.remove(index);
                true
            }
            None => false,
        }
    }

    /// Consumes the no-double-miss guarantee.
    ///
    /// Returns whether the previous accuracy check missed, and clears the flag
    /// regardless.
    pub fn take_forced_hit(&mut self) -> bool {
        std::mem::take(&mut self.missed_last)
    }

    /// Marks the latest accuracy check as a miss.
    pub fn record_miss(&mut self) {
        self.missed_last = true;
    }

    pub fn has_forced_hit(&self) -> bool {
        self.missed_last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Combatant {
        Combatant::new("Sample", 5, 40, StatBlock::new(10, 10, 10, 10, 10))
    }

    #[test]
    fn proxy_overrides_base_stat() {
        let mut c = sample();
        assert_eq!(c.effective(Stat::Attack), 10);
        c.proxy.set(Stat::Attack, Some(25));
        assert_eq!(c.effective(Stat::Attack), 25);
        assert_eq!(c.effective(Stat::Defense), 10);
    }

    #[test]
    fn boost_stages_clamp_and_report_applied_change() {
        let mut stages = BoostStages::default();
        assert_eq!(stages.shift(StageStat::Attack, 4), 4);
        assert_eq!(stages.shift(StageStat::Attack, 4), 2);
        assert_eq!(stages.get(StageStat::Attack), BoostStages::LIMIT);
        assert_eq!(stages.shift(StageStat::Evasion, -9), -6);
    }

    #[test]
    fn statuses_are_unique_and_bounded() {
        let mut c = sample();
        let burn = StatusInstance {
            id: StatusId(1),
            turns_left: Some(3),
        };
        assert!(c.add_status(burn));
        assert!(!c.add_status(burn));
        for id in 2..=BattleConfig::MAX_STATUS_EFFECTS as u32 {
            assert!(c.add_status(StatusInstance {
                id: StatusId(id),
                turns_left: None,
            }));
        }
        assert!(!c.add_status(StatusInstance {
            id: StatusId(99),
            turns_left: None,
        }));
        assert!(c.remove_status(StatusId(1)));
        assert!(!c.has_status(StatusId(1)));
    }

    #[test]
    fn forced_hit_flag_is_consumed_once() {
        let mut c = sample();
        assert!(!c.take_forced_hit());
        c.record_miss();
        assert!(c.take_forced_hit());
        assert!(!c.take_forced_hit());
    }
}
