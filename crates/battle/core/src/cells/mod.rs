//! Type-keyed state cells shared between effects during one resolution.
//!
//! A [`CellStore`] holds at most one value per cell type. Effects communicate
//! by writing cells that later effects read: a boost effect bumps
//! [`AttackBoost`], the damage step reads it. Reads of absent cells fall back
//! to `Default` without storing anything, so the API is total.
//!
//! Entries are kept in insertion order so listing and copying are
//! deterministic.
mod accumulator;
mod kinds;

use std::any::{Any, TypeId};
use std::fmt;

pub use accumulator::{Counter, Fraction, Multiplier, Ratio};
pub use kinds::*;

/// Grouping used when cells are copied wholesale between stores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellCategory {
    /// Effective stats and levels captured when a strike begins.
    Staged,
    /// Accumulated modifiers and move traits (boosts, multipliers, flags).
    Modifier,
    /// Results published for reactive effects (damage dealt, critical, hit).
    Outcome,
    /// Bookkeeping private to individual effects.
    Scratch,
}

/// A value that can live in a [`CellStore`].
pub trait Cell: Any + Clone + Default + fmt::Debug + Send + Sync {
    const CATEGORY: CellCategory;
}

trait ErasedCell: Any + fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn ErasedCell>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn category(&self) -> CellCategory;
    fn type_name(&self) -> &'static str;
}

impl<T: Cell> ErasedCell for T {
    fn clone_box(&self) -> Box<dyn ErasedCell> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn category(&self) -> CellCategory {
        T::CATEGORY
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

impl Clone for Box<dyn ErasedCell> {
    fn clone(&self) -> Self {
        self.as_ref().clone_box()
    }
}

#[derive(Clone, Debug)]
struct Slot {
    key: TypeId,
    cell: Box<dyn ErasedCell>,
}

/// Summary of one stored cell, for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellInfo {
    pub type_name: &'static str,
    pub category: CellCategory,
}

/// Heterogeneous map from cell type to its single live value.
#[derive(Clone, Debug, Default)]
pub struct CellStore {
    slots: Vec<Slot>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn position<T: Cell>(&self) -> Option<usize> {
        let key = TypeId::of::<T>();
        self.slots.iter().position(|slot| slot.key == key)
    }

    /// Stores `value`, replacing any previous value of the same type.
    pub fn set<T: Cell>(&mut self, value: T) {
        match self.position::<T>() {
            Some(index) => self.slots[index].cell = Box::new(value),
            None => self.slots.push(Slot {
                key: TypeId::of::<T>(),
                cell: Box::new(value),
            }),
        }
    }

    pub fn get<T: Cell>(&self) -> Option<&T> {
        let index = self.position::<T>()?;
        self.slots[index].cell.as_any().downcast_ref::<T>()
    }

    pub fn get_mut<T: Cell>(&mut self) -> Option<&mut T> {
        let index = self.position::<T>()?;
        self.slots[index].cell.as_any_mut().downcast_mut::<T>()
    }

    /// Returns a copy of the stored value, or `T::default()` without storing it.
    pub fn get_or_default<T: Cell>(&self) -> T {
        self.get::<T>().cloned().unwrap_or_default()
    }

    /// Mutable access, creating the cell from `T::default()` first if absent.
    pub fn entry<T: Cell>(&mut self) -> &mut T {
        let index = match self.position::<T>() {
            Some(index) => index,
            None => {
                self.slots.push(Slot {
                    key: TypeId::of::<T>(),
                    cell: Box::new(T::default()),
                });
                self.slots.len() - 1
            }
        };
        match self.slots[index].cell.as_any_mut().downcast_mut::<T>() {
            Some(cell) => cell,
            None => unreachable!("cell slot keyed by a mismatched type"),
        }
    }

    pub fn contains<T: Cell>(&self) -> bool {
        self.position::<T>().is_some()
    }

    pub fn remove<T: Cell>(&mut self) -> Option<T> {
        let index = self.position::<T>()?;
        let slot = self.slots.remove(index);
        slot.cell.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    pub fn clear(&mut self) {
        self.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Lists stored cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = CellInfo> + '_ {
        self.slots.iter().map(|slot| CellInfo {
            type_name: slot.cell.type_name(),
            category: slot.cell.category(),
        })
    }

    /// Lists stored cells of one category in insertion order.
    pub fn cells_in(&self, category: CellCategory) -> impl Iterator<Item = CellInfo> + '_ {
        self.cells().filter(move |info| info.category == category)
    }

    /// Copies every cell of `category` into `dest`, overwriting same-typed cells there.
    pub fn copy_category_into(&self, category: CellCategory, dest: &mut CellStore) {
        for slot in self.slots.iter().filter(|s| s.cell.category() == category) {
            dest.put_slot(slot.clone());
        }
    }

    /// Copies every cell into `dest`, overwriting same-typed cells there.
    pub fn copy_all_into(&self, dest: &mut CellStore) {
        for slot in &self.slots {
            dest.put_slot(slot.clone());
        }
    }

    fn put_slot(&mut self, slot: Slot) {
        match self.slots.iter_mut().find(|s| s.key == slot.key) {
            Some(existing) => existing.cell = slot.cell,
            None => self.slots.push(slot),
        }
    }

    // ===== accumulator helpers =====

    /// Adds `delta` to an integer accumulator, creating it at `delta` if absent.
    pub fn add<T: Counter>(&mut self, delta: i64) -> i64 {
        let cell = self.entry::<T>();
        *cell.value_mut() += delta;
        cell.value()
    }

    /// Current value of an integer accumulator (0 when absent).
    pub fn count<T: Counter>(&self) -> i64 {
        self.get::<T>().map_or(0, |cell| cell.value())
    }

    pub fn multiply<T: Multiplier>(&mut self, n: i64, d: i64) {
        self.entry::<T>().fraction_mut().multiply(n, d);
    }

    pub fn multiply_by<T: Multiplier>(&mut self, ratio: Ratio) {
        self.multiply::<T>(ratio.num, ratio.den);
    }

    /// Applies a fraction accumulator to `base` (identity when absent).
    pub fn apply<T: Multiplier>(&self, base: i64) -> i64 {
        self.get::<T>()
            .map_or(base, |cell| cell.fraction().apply(base))
    }

    pub fn is_neutralized<T: Multiplier>(&self) -> bool {
        self.get::<T>()
            .is_some_and(|cell| cell.fraction().is_neutralized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Note(String);

    impl Cell for Note {
        const CATEGORY: CellCategory = CellCategory::Scratch;
    }

    #[test]
    fn get_or_default_does_not_store() {
        let store = CellStore::new();
        assert_eq!(store.get_or_default::<Note>(), Note::default());
        assert!(!store.contains::<Note>());
        assert_eq!(store.count::<AttackBoost>(), 0);
        assert_eq!(store.apply::<DamageMult>(42), 42);
        assert!(store.is_empty());
    }

    #[test]
    fn set_overwrites_and_remove_returns_value() {
        let mut store = CellStore::new();
        store.set(Note("first".into()));
        store.set(Note("second".into()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get::<Note>(), Some(&Note("second".into())));
        assert_eq!(store.remove::<Note>(), Some(Note("second".into())));
        assert_eq!(store.remove::<Note>(), None);
    }

    #[test]
    fn counters_create_on_first_add() {
        let mut store = CellStore::new();
        assert_eq!(store.add::<CritLevel>(2), 2);
        assert_eq!(store.add::<CritLevel>(-1), 1);
        assert_eq!(store.count::<CritLevel>(), 1);
    }

    #[test]
    fn multipliers_accumulate_and_neutralize() {
        let mut store = CellStore::new();
        store.multiply::<DamageMult>(3, 2);
        assert_eq!(store.apply::<DamageMult>(10), 15);
        store.multiply::<DamageMult>(0, 1);
        store.multiply::<DamageMult>(5, 1);
        assert!(store.is_neutralized::<DamageMult>());
        assert_eq!(store.apply::<DamageMult>(10), 0);
    }

    #[test]
    fn listing_is_insertion_ordered() {
        let mut store = CellStore::new();
        store.set(CriticalHit);
        store.add::<AttackBoost>(1);
        store.set(Note::default());
        let names: Vec<_> = store.cells().map(|c| c.category).collect();
        assert_eq!(
            names,
            vec![
                CellCategory::Outcome,
                CellCategory::Modifier,
                CellCategory::Scratch
            ]
        );
    }

    #[test]
    fn copy_category_only_moves_matching_cells() {
        let mut source = CellStore::new();
        source.add::<CritLevel>(1);
        source.set(CategoryFlip);
        source.set(CriticalHit);

        let mut dest = CellStore::new();
        dest.add::<CritLevel>(5);
        source.copy_category_into(CellCategory::Modifier, &mut dest);

        assert_eq!(dest.count::<CritLevel>(), 1);
        assert!(dest.contains::<CategoryFlip>());
        assert!(!dest.contains::<CriticalHit>());
    }

    #[test]
    fn cloned_store_is_independent() {
        let mut original = CellStore::new();
        original.add::<AttackBoost>(1);
        let mut copy = original.clone();
        copy.add::<AttackBoost>(3);
        assert_eq!(original.count::<AttackBoost>(), 1);
        assert_eq!(copy.count::<AttackBoost>(), 4);
    }
}
