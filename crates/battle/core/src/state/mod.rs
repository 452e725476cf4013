//! Character registry and the value types it is built from.
//!
//! The [`Battlefield`] owns every [`Combatant`]. Resolution records refer to
//! characters by [`CharacterId`] and mutate them through the registry, so
//! there is exactly one owner of character state at any time.
mod combatant;
mod common;

pub use combatant::{
    BoostStages, Combatant, StageStat, Stat, StatBlock, StatOverrides, StatusInstance,
};
pub use common::{
    CharacterId, ElementId, IntrinsicId, ItemId, MapStatusId, Position, ResourceMeter, SkillId,
    StatusId,
};

/// Character registry plus the map-wide statuses active on the floor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Battlefield {
    combatants: Vec<Combatant>,
    map_statuses: Vec<MapStatusId>,
}

impl Battlefield {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a combatant and returns its id, or `None` once every
    /// [`CharacterId`] is taken.
    pub fn spawn(&mut self, combatant: Combatant) -> Option<CharacterId> {
        let id = CharacterId(u16::try_from(self.combatants.len()).ok()?);
        self.combatants.push(combatant);
        Some(id)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Combatant> {
        self.combatants.get(usize::from(id.0))
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Combatant> {
        self.combatants.get_mut(usize::from(id.0))
    }

    /// Returns true if the character exists and has not fainted.
    pub fn in_play(&self, id: CharacterId) -> bool {
        self.get(id).is_some_and(|c| !c.is_fainted())
    }

    pub fn iter(&self) -> impl Iterator<Item = (CharacterId, &Combatant)> {
        self.combatants
            .iter()
            .enumerate()
            .map(|(i, c)| (CharacterId(i as u16), c))
    }

    pub fn len(&self) -> usize {
        self.combatants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.combatants.is_empty()
    }

    pub fn map_statuses(&self) -> &[MapStatusId] {
        &self.map_statuses
    }

    /// Activates a map status. Returns `false` if it was already active.
    pub fn add_map_status(&mut self, status: MapStatusId) -> bool {
        if self.map_statuses.contains(&status) {
            return false;
        }
        self.map_statuses.push(status);
        true
    }

    pub fn remove_map_status(&mut self, status: MapStatusId) -> bool {
        let before = self.map_statuses.len();
        self.map_statuses.retain(|s| *s != status);
        before != self.map_statuses.len()
    }
}
