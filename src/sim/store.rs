//! Growable, capacity-limited entity collections
//!
//! Removal is mark-and-compact: systems flag entities dead while iterating and
//! `compact` drops them once per frame, so no element is skipped.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Per-kind motion rule used by `Store::update`
pub trait Kinematics {
    /// Read-only context the step needs (bounds, decay rates)
    type Env;

    /// Advance one frame; `scale` is 1.0 unless motion is time-scaled
    fn step(&mut self, env: &Self::Env, scale: f32);

    /// False once the entity should be dropped on the next compaction
    fn is_alive(&self) -> bool;
}

/// One kind of live entity, owned exclusively
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Store<T> {
    items: VecDeque<T>,
    capacity: usize,
    /// Entities dropped to make room (diagnostics only)
    #[serde(default)]
    evicted: u64,
}

impl<T> Store<T> {
    /// Create an empty store that never holds more than `capacity` entities
    pub fn with_limit(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity: capacity.max(1),
            evicted: 0,
        }
    }

    /// Append an entity, evicting the oldest when full
    pub fn add(&mut self, item: T) {
        if self.items.len() >= self.capacity {
            self.items.pop_front();
            self.evicted += 1;
            log::debug!(
                "store full ({} entities), evicted oldest (total {})",
                self.capacity,
                self.evicted
            );
        }
        self.items.push_back(item);
    }

    /// Remove the entity at `index`; out-of-range indices are ignored
    pub fn remove(&mut self, index: usize) -> Option<T> {
        self.items.remove(index)
    }

    pub fn reset(&mut self) {
        self.items.clear();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::collections::vec_deque::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::collections::vec_deque::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Keep only entities matching `keep`, preserving order
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }
}

impl<T: Kinematics> Store<T> {
    /// Advance a single entity; returns whether it is still alive
    pub fn update(&mut self, index: usize, env: &T::Env, scale: f32) -> bool {
        match self.items.get_mut(index) {
            Some(item) => {
                item.step(env, scale);
                item.is_alive()
            }
            None => false,
        }
    }

    /// Advance every entity once
    pub fn update_all(&mut self, env: &T::Env, scale: f32) {
        for item in &mut self.items {
            item.step(env, scale);
        }
    }

    /// Drop every dead entity; returns how many were removed
    pub fn compact(&mut self) -> usize {
        let before = self.items.len();
        self.items.retain(|item| item.is_alive());
        before - self.items.len()
    }
}

impl<'a, T> IntoIterator for &'a Store<T> {
    type Item = &'a T;
    type IntoIter = std::collections::vec_deque::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        id: u32,
        left: i32,
    }

    impl Kinematics for Counter {
        type Env = i32;

        fn step(&mut self, env: &i32, _scale: f32) {
            self.left -= env;
        }

        fn is_alive(&self) -> bool {
            self.left > 0
        }
    }

    fn counters(lefts: &[i32]) -> Store<Counter> {
        let mut store = Store::with_limit(16);
        for (id, &left) in lefts.iter().enumerate() {
            store.add(Counter {
                id: id as u32,
                left,
            });
        }
        store
    }

    #[test]
    fn test_compact_removes_adjacent_dead_entities() {
        // Two dead entities in a row: a forward splice would skip the second
        let mut store = counters(&[5, 1, 1, 5, 1]);
        store.update_all(&1, 1.0);
        assert_eq!(store.compact(), 3);
        let ids: Vec<u32> = store.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![0, 3]);
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut store = Store::with_limit(3);
        for id in 0..5 {
            store.add(Counter { id, left: 1 });
        }
        assert_eq!(store.len(), 3);
        assert_eq!(store.evicted(), 2);
        assert_eq!(store.get(0).map(|c| c.id), Some(2));
    }

    #[test]
    fn test_eviction_keeps_insertion_order_at_capacity() {
        let mut store = Store::with_limit(64);
        for id in 0..1000 {
            store.add(Counter { id, left: 1 });
        }
        assert_eq!(store.len(), 64);
        assert_eq!(store.evicted(), 936);
        let ids: Vec<u32> = store.iter().map(|c| c.id).collect();
        assert_eq!(ids, (936..1000).collect::<Vec<u32>>());
    }

    #[test]
    fn test_update_and_remove_by_index() {
        let mut store = counters(&[2, 3]);
        assert!(store.update(0, &1, 1.0));
        assert!(!store.update(0, &1, 1.0));
        assert!(!store.update(9, &1, 1.0));
        assert_eq!(store.remove(0).map(|c| c.id), Some(0));
        assert!(store.remove(5).is_none());
        assert_eq!(store.len(), 1);
        store.reset();
        assert!(store.is_empty());
    }
}
