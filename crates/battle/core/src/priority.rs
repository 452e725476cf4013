//! Priority-ordered multi-map used to schedule effects within a phase.

use std::collections::BTreeMap;

/// Ordered multi-map from priority to an insertion-ordered run of items.
///
/// Iteration visits priorities ascending and, within one priority, items in
/// the order they were pushed. The order is a pure function of the pushes, so
/// repeated enumeration is bit-for-bit identical.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PriorityList<T> {
    buckets: BTreeMap<i32, Vec<T>>,
    len: usize,
}

impl<T> Default for PriorityList<T> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
            len: 0,
        }
    }
}

impl<T> PriorityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, priority: i32, item: T) {
        self.buckets.entry(priority).or_default().push(item);
        self.len += 1;
    }

    /// Distinct priorities, ascending.
    pub fn priorities(&self) -> impl Iterator<Item = i32> + '_ {
        self.buckets.keys().copied()
    }

    /// Number of items registered at `priority`.
    pub fn count(&self, priority: i32) -> usize {
        self.buckets.get(&priority).map_or(0, Vec::len)
    }

    pub fn get(&self, priority: i32, index: usize) -> Option<&T> {
        self.buckets.get(&priority)?.get(index)
    }

    /// Swaps the item at `(priority, index)` for `item`, returning the old one.
    ///
    /// Returns `Err(item)` when the position does not exist.
    pub fn replace(&mut self, priority: i32, index: usize, item: T) -> Result<T, T> {
        match self
            .buckets
            .get_mut(&priority)
            .and_then(|bucket| bucket.get_mut(index))
        {
            Some(slot) => Ok(std::mem::replace(slot, item)),
            None => Err(item),
        }
    }

    /// All items in execution order with their priority.
    pub fn iter(&self) -> impl Iterator<Item = (i32, &T)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(priority, bucket)| bucket.iter().map(move |item| (*priority, item)))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Consumes the list, yielding items in execution order.
    pub fn into_ordered(self) -> Vec<T> {
        self.buckets.into_values().flatten().collect()
    }
}

impl<T> Extend<(i32, T)> for PriorityList<T> {
    fn extend<I: IntoIterator<Item = (i32, T)>>(&mut self, iter: I) {
        for (priority, item) in iter {
            self.push(priority, item);
        }
    }
}

impl<T> FromIterator<(i32, T)> for PriorityList<T> {
    fn from_iter<I: IntoIterator<Item = (i32, T)>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn ties_keep_insertion_order() {
        let mut list = PriorityList::new();
        list.push(5, "A");
        list.push(3, "B");
        list.push(5, "C");

        let order: Vec<_> = list.iter().map(|(_, item)| *item).collect();
        assert_eq!(order, vec!["B", "A", "C"]);
        assert_eq!(list.priorities().collect::<Vec<_>>(), vec![3, 5]);
        assert_eq!(list.count(5), 2);
        assert_eq!(list.get(5, 1), Some(&"C"));
        assert_eq!(list.into_ordered(), vec!["B", "A", "C"]);
    }

    #[test]
    fn replace_targets_a_single_position() {
        let mut list: PriorityList<&str> = [(0, "x"), (0, "y")].into_iter().collect();
        assert_eq!(list.replace(0, 1, "z"), Ok("y"));
        assert_eq!(list.replace(1, 0, "w"), Err("w"));
        assert_eq!(list.get(0, 1), Some(&"z"));
        assert_eq!(list.len(), 2);
    }

    proptest! {
        #[test]
        fn enumeration_is_sorted_stable_and_repeatable(
            entries in prop::collection::vec(-8i32..8, 0..64),
        ) {
            let list: PriorityList<usize> = entries
                .iter()
                .enumerate()
                .map(|(seq, p)| (*p, seq))
                .collect();

            let first: Vec<_> = list.iter().map(|(p, s)| (p, *s)).collect();
            let second: Vec<_> = list.iter().map(|(p, s)| (p, *s)).collect();
            prop_assert_eq!(&first, &second);
            prop_assert_eq!(first.len(), entries.len());

            for pair in first.windows(2) {
                let ((p0, s0), (p1, s1)) = (pair[0], pair[1]);
                prop_assert!(p0 <= p1);
                if p0 == p1 {
                    prop_assert!(s0 < s1);
                }
            }
        }
    }
}
