//! Catalog oracle: authored skills, items, statuses, intrinsics, elements and
//! map statuses.
//!
//! Catalog data is validated once when loaded ([`Catalog::validate`]); during
//! resolution a missing id only means "no effect".

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::cells::CritLevel;
use crate::context::{Category, Explosion, HitRate, Hitbox, MoveFlags, MoveSpec};
use crate::effect::{Phase, PhasedEffect};
use crate::error::{BattleError, ErrorSeverity};
use crate::state::{ElementId, IntrinsicId, ItemId, MapStatusId, SkillId, StatusId};

/// Lookup interface for authored content.
pub trait CatalogOracle: Send + Sync {
    fn skill(&self, id: SkillId) -> Option<&SkillData>;
    fn item(&self, id: ItemId) -> Option<&ItemData>;
    fn status(&self, id: StatusId) -> Option<&StatusData>;
    fn intrinsic(&self, id: IntrinsicId) -> Option<&IntrinsicData>;
    fn element(&self, id: ElementId) -> Option<&ElementData>;
    fn map_status(&self, id: MapStatusId) -> Option<&MapStatusData>;

    /// Matchup of an attacking element against one defending element.
    fn matchup(&self, attacking: ElementId, defending: ElementId) -> Matchup {
        self.element(attacking)
            .map_or(Matchup::NEUTRAL, |data| data.against(defending))
    }
}

/// Element-vs-element result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Matchup {
    Immune,
    /// Signed effectiveness level; levels of all defending elements are summed.
    Level(i32),
}

impl Matchup {
    pub const NEUTRAL: Self = Self::Level(0);
}

/// Effects a status or intrinsic contributes, split by which side of the
/// action its holder is on.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Hooks {
    pub as_user: Vec<PhasedEffect>,
    pub as_target: Vec<PhasedEffect>,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillData {
    pub id: SkillId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: ElementId,
    pub category: Category,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hit_rate: HitRate,
    #[cfg_attr(feature = "serde", serde(default = "SkillData::default_strikes"))]
    pub strikes: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub flags: MoveFlags,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hitbox: Hitbox,
    #[cfg_attr(feature = "serde", serde(default))]
    pub explosion: Option<Explosion>,
    /// Critical level the move starts each strike with.
    #[cfg_attr(feature = "serde", serde(default))]
    pub crit_level: i64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<PhasedEffect>,
}

impl SkillData {
    pub fn new(id: SkillId, name: impl Into<String>, category: Category, power: u32) -> Self {
        Self {
            id,
            name: name.into(),
            element: ElementId::NONE,
            category,
            power,
            hit_rate: HitRate::default(),
            strikes: Self::default_strikes(),
            flags: MoveFlags::empty(),
            hitbox: Hitbox::default(),
            explosion: None,
            crit_level: 0,
            effects: Vec::new(),
        }
    }

    pub const fn default_strikes() -> u32 {
        1
    }

    /// Builder: set element.
    pub fn element(mut self, element: ElementId) -> Self {
        self.element = element;
        self
    }

    /// Builder: set hit rate.
    pub fn hit_rate(mut self, hit_rate: HitRate) -> Self {
        self.hit_rate = hit_rate;
        self
    }

    /// Builder: set strike count.
    pub fn strikes(mut self, strikes: u32) -> Self {
        self.strikes = strikes;
        self
    }

    /// Builder: add flags.
    pub fn flags(mut self, flags: MoveFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Builder: add an effect.
    pub fn effect(mut self, effect: PhasedEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Move spec executed when this skill is used.
    pub fn to_move_spec(&self) -> MoveSpec {
        let mut spec = MoveSpec {
            skill: Some(self.id),
            element: self.element,
            category: self.category,
            power: self.power,
            hit_rate: self.hit_rate,
            flags: self.flags,
            ..MoveSpec::default()
        };
        if self.crit_level != 0 {
            spec.cells.add::<CritLevel>(self.crit_level);
        }
        spec
    }
}

/// How an item behaves when thrown.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ThrowData {
    pub power: u32,
    pub hit_rate: HitRate,
    #[cfg_attr(feature = "serde", serde(default))]
    pub element: ElementId,
}

impl Default for ThrowData {
    fn default() -> Self {
        Self {
            power: 0,
            hit_rate: HitRate::Percent(100),
            element: ElementId::NONE,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemData {
    pub id: ItemId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub throw: ThrowData,
    /// Effects when used or thrown.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<PhasedEffect>,
    /// Effects while held.
    #[cfg_attr(feature = "serde", serde(default))]
    pub held: Hooks,
}

impl ItemData {
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            throw: ThrowData::default(),
            effects: Vec::new(),
            held: Hooks::default(),
        }
    }

    /// Move spec for using the item on a target.
    pub fn use_spec(&self) -> MoveSpec {
        MoveSpec {
            category: Category::Status,
            hit_rate: HitRate::Always,
            flags: MoveFlags::ZERO_ALLOWED,
            ..MoveSpec::default()
        }
    }

    /// Move spec for throwing the item.
    pub fn throw_spec(&self) -> MoveSpec {
        MoveSpec {
            element: self.throw.element,
            category: Category::Physical,
            power: self.throw.power,
            hit_rate: self.throw.hit_rate,
            ..MoveSpec::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StatusData {
    pub id: StatusId,
    pub name: String,
    /// Category tags, e.g. "major", "poison".
    #[cfg_attr(feature = "serde", serde(default))]
    pub tags: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hooks: Hooks,
}

impl StatusData {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntrinsicData {
    pub id: IntrinsicId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hooks: Hooks,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementData {
    pub id: ElementId,
    pub name: String,
    /// Matchups against defending elements. Unlisted elements are neutral.
    #[cfg_attr(feature = "serde", serde(default))]
    pub matchups: Vec<(ElementId, Matchup)>,
}

impl ElementData {
    pub fn against(&self, defending: ElementId) -> Matchup {
        self.matchups
            .iter()
            .find(|(element, _)| *element == defending)
            .map_or(Matchup::NEUTRAL, |(_, matchup)| *matchup)
    }
}

/// Weather, terrain and other floor-wide conditions.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MapStatusData {
    pub id: MapStatusId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: Vec<PhasedEffect>,
}

/// Catalog id referenced from authored data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reference {
    Skill(SkillId),
    Status(StatusId),
    Element(ElementId),
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skill(id) => id.fmt(f),
            Self::Status(id) => id.fmt(f),
            Self::Element(id) => id.fmt(f),
        }
    }
}

/// Referential integrity failures found by [`Catalog::validate`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog has no default attack ({})", SkillId::DEFAULT_ATTACK)]
    MissingDefaultAttack,

    #[error("{owner} references unknown {reference}")]
    DanglingReference { owner: String, reference: Reference },

    #[error("{owner} has zero strikes")]
    ZeroStrikes { owner: String },

    #[error("{skill} invokes itself through its {phase} effects")]
    InvokeCycle { skill: SkillId, phase: Phase },
}

impl BattleError for CatalogError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Validation
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::MissingDefaultAttack => "CATALOG_MISSING_DEFAULT_ATTACK",
            Self::DanglingReference { .. } => "CATALOG_DANGLING_REFERENCE",
            Self::ZeroStrikes { .. } => "CATALOG_ZERO_STRIKES",
            Self::InvokeCycle { .. } => "CATALOG_INVOKE_CYCLE",
        }
    }
}

/// In-memory catalog.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    skills: BTreeMap<SkillId, SkillData>,
    items: BTreeMap<ItemId, ItemData>,
    statuses: BTreeMap<StatusId, StatusData>,
    intrinsics: BTreeMap<IntrinsicId, IntrinsicData>,
    elements: BTreeMap<ElementId, ElementData>,
    map_statuses: BTreeMap<MapStatusId, MapStatusData>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_skill(&mut self, data: SkillData) {
        self.skills.insert(data.id, data);
    }

    pub fn insert_item(&mut self, data: ItemData) {
        self.items.insert(data.id, data);
    }

    pub fn insert_status(&mut self, data: StatusData) {
        self.statuses.insert(data.id, data);
    }

    pub fn insert_intrinsic(&mut self, data: IntrinsicData) {
        self.intrinsics.insert(data.id, data);
    }

    pub fn insert_element(&mut self, data: ElementData) {
        self.elements.insert(data.id, data);
    }

    pub fn insert_map_status(&mut self, data: MapStatusData) {
        self.map_statuses.insert(data.id, data);
    }

    pub fn skills(&self) -> impl Iterator<Item = &SkillData> {
        self.skills.values()
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemData> {
        self.items.values()
    }

    pub fn statuses(&self) -> impl Iterator<Item = &StatusData> {
        self.statuses.values()
    }

    /// Checks that every id referenced by authored data exists.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if !self.skills.contains_key(&SkillId::DEFAULT_ATTACK) {
            return Err(CatalogError::MissingDefaultAttack);
        }

        for skill in self.skills.values() {
            let owner = format!("{} ({})", skill.id, skill.name);
            if skill.strikes == 0 {
                return Err(CatalogError::ZeroStrikes { owner });
            }
            self.check_reference(&owner, Reference::Element(skill.element))?;
            self.check_effects(&owner, &skill.effects)?;
        }
        for item in self.items.values() {
            let owner = format!("{} ({})", item.id, item.name);
            self.check_reference(&owner, Reference::Element(item.throw.element))?;
            self.check_effects(&owner, &item.effects)?;
            self.check_hooks(&owner, &item.held)?;
        }
        for status in self.statuses.values() {
            let owner = format!("{} ({})", status.id, status.name);
            self.check_hooks(&owner, &status.hooks)?;
        }
        for intrinsic in self.intrinsics.values() {
            let owner = format!("{} ({})", intrinsic.id, intrinsic.name);
            self.check_hooks(&owner, &intrinsic.hooks)?;
        }
        for element in self.elements.values() {
            let owner = format!("{} ({})", element.id, element.name);
            for (defending, _) in &element.matchups {
                self.check_reference(&owner, Reference::Element(*defending))?;
            }
        }
        for map_status in self.map_statuses.values() {
            let owner = format!("{} ({})", map_status.id, map_status.name);
            self.check_effects(&owner, &map_status.effects)?;
        }
        self.check_invoke_cycles()
    }

    /// Rejects skills whose `Invoke` chain leads back into the same skill
    /// phase. Resolution would otherwise recurse without end.
    fn check_invoke_cycles(&self) -> Result<(), CatalogError> {
        let mut finished = BTreeSet::new();
        for skill in self.skills.values() {
            for effect in &skill.effects {
                let mut path = Vec::new();
                self.visit_invokes((skill.id, effect.phase), &mut path, &mut finished)?;
            }
        }
        Ok(())
    }

    fn visit_invokes(
        &self,
        key: (SkillId, Phase),
        path: &mut Vec<(SkillId, Phase)>,
        finished: &mut BTreeSet<(SkillId, Phase)>,
    ) -> Result<(), CatalogError> {
        if finished.contains(&key) {
            return Ok(());
        }
        if path.contains(&key) {
            return Err(CatalogError::InvokeCycle {
                skill: key.0,
                phase: key.1,
            });
        }
        let Some(data) = self.skills.get(&key.0) else {
            return Ok(());
        };

        let mut invoked = Vec::new();
        data.effects
            .iter()
            .filter(|effect| effect.phase == key.1)
            .for_each(|effect| effect.node.invocations(&mut invoked));

        path.push(key);
        for next in invoked {
            self.visit_invokes(next, path, finished)?;
        }
        path.pop();
        finished.insert(key);
        Ok(())
    }

    fn check_hooks(&self, owner: &str, hooks: &Hooks) -> Result<(), CatalogError> {
        self.check_effects(owner, &hooks.as_user)?;
        self.check_effects(owner, &hooks.as_target)
    }

    fn check_effects(&self, owner: &str, effects: &[PhasedEffect]) -> Result<(), CatalogError> {
        let mut references = Vec::new();
        for effect in effects {
            effect.node.references(&mut references);
        }
        references
            .into_iter()
            .try_for_each(|reference| self.check_reference(owner, reference))
    }

    fn check_reference(&self, owner: &str, reference: Reference) -> Result<(), CatalogError> {
        let known = match reference {
            Reference::Skill(id) => self.skills.contains_key(&id),
            Reference::Status(id) => self.statuses.contains_key(&id),
            // The typeless element needs no definition.
            Reference::Element(id) => id == ElementId::NONE || self.elements.contains_key(&id),
        };
        if known {
            Ok(())
        } else {
            Err(CatalogError::DanglingReference {
                owner: owner.to_string(),
                reference,
            })
        }
    }
}

impl CatalogOracle for Catalog {
    fn skill(&self, id: SkillId) -> Option<&SkillData> {
        self.skills.get(&id)
    }

    fn item(&self, id: ItemId) -> Option<&ItemData> {
        self.items.get(&id)
    }

    fn status(&self, id: StatusId) -> Option<&StatusData> {
        self.statuses.get(&id)
    }

    fn intrinsic(&self, id: IntrinsicId) -> Option<&IntrinsicData> {
        self.intrinsics.get(&id)
    }

    fn element(&self, id: ElementId) -> Option<&ElementData> {
        self.elements.get(&id)
    }

    fn map_status(&self, id: MapStatusId) -> Option<&MapStatusData> {
        self.map_statuses.get(&id)
    }
}
