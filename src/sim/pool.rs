//! Typed entity collections
//!
//! One pool per entity kind. Pools keep insertion order, which is the
//! iteration order every system relies on for determinism. Removal during a
//! scan is never done in place: systems collect ids into a [`RemovalSet`] and
//! apply it once the scan is over.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Stable identifier of a gameplay entity
///
/// Ids are allocated monotonically per session and never reused, so a stale
/// id can only ever resolve to "absent".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Entities that can be looked up and removed by id
pub trait Identified {
    fn id(&self) -> EntityId;
}

/// Ids marked for removal during a pass
pub type RemovalSet = BTreeSet<EntityId>;

/// A growable, insertion-ordered collection of one entity kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityPool<T> {
    items: Vec<T>,
}

impl<T> Default for EntityPool<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> EntityPool<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Keep only the entities matching `keep`, preserving order
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        self.items.retain(keep);
        before - self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Identified> EntityPool<T> {
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|e| e.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Drop every entity whose id is in `ids`; returns how many were removed
    pub fn remove_ids(&mut self, ids: &RemovalSet) -> usize {
        if ids.is_empty() {
            return 0;
        }
        self.retain(|e| !ids.contains(&e.id()))
    }
}

impl<T> Extend<T> for EntityPool<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<'a, T> IntoIterator for &'a EntityPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut EntityPool<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}
