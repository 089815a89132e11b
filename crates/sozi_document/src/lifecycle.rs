// SPDX-License-Identifier: MIT OR Apache-2.0
//! Attach/detach lifecycle and the tracked entity collection.
//!
//! Frames and layers are kept in one ordered storage holding both the live
//! entities and the ones removed since the last commit. A removed entity
//! stays in place until [`TrackedList::purge`] so that its tree node can be
//! removed exactly once at write time.

use crate::error::{DocumentError, Result};
use indexmap::IndexMap;
use std::hash::Hash;

/// Observable lifecycle state of a frame or layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed without a node in the tree; nothing is persisted
    NewDetached,
    /// Part of its owning collection; its node is (or will be) in the tree
    Attached,
    /// Removed from its collection; its node leaves the tree at write time
    DetachedExisting,
}

/// Action a commit performs for an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteAction {
    /// Append the node to its parent, then serialize
    Append,
    /// Serialize fields only
    Update,
    /// Remove the node from the tree
    Remove,
    /// Nothing to do
    Skip,
}

/// `is_new` / `is_attached` flags of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lifecycle {
    is_new: bool,
    is_attached: bool,
}

impl Lifecycle {
    /// Entity read from a node already in the tree
    pub fn existing() -> Self {
        Self {
            is_new: false,
            is_attached: true,
        }
    }

    /// Entity created in memory
    pub fn created() -> Self {
        Self {
            is_new: true,
            is_attached: false,
        }
    }

    /// Whether the node has not been written to the tree yet
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Whether the entity belongs to its owning collection
    pub fn is_attached(&self) -> bool {
        self.is_attached
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        match (self.is_new, self.is_attached) {
            (_, true) => LifecycleState::Attached,
            (true, false) => LifecycleState::NewDetached,
            (false, false) => LifecycleState::DetachedExisting,
        }
    }

    pub(crate) fn attach(&mut self) {
        self.is_attached = true;
    }

    pub(crate) fn detach(&mut self) {
        self.is_attached = false;
    }

    /// Action the next commit performs
    pub fn write_action(&self) -> WriteAction {
        match (self.is_new, self.is_attached) {
            (true, true) => WriteAction::Append,
            (false, true) => WriteAction::Update,
            (false, false) => WriteAction::Remove,
            (true, false) => WriteAction::Skip,
        }
    }

    /// Record that the commit action was carried out
    pub(crate) fn committed(&mut self) {
        // A removed node is no longer in the tree, so the entity is new again
        self.is_new = !self.is_attached;
    }
}

/// Entity stored in a [`TrackedList`]
pub trait Tracked {
    /// Stable in-memory key
    type Key: Copy + Eq + Hash + std::fmt::Debug;

    /// Key of this entity
    fn key(&self) -> Self::Key;

    /// Lifecycle flags
    fn lifecycle(&self) -> &Lifecycle;

    /// Mutable lifecycle flags
    fn lifecycle_mut(&mut self) -> &mut Lifecycle;
}

/// Status of an entry in a [`TrackedList`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// Part of the ordered sequence
    Active,
    /// Removed; awaiting removal from the tree
    PendingRemoval,
}

/// Ordered key-indexed storage of active and pending-removal entities.
///
/// Indices taken and returned by the public methods count active entries
/// only; pending entries keep their raw position but are skipped.
#[derive(Debug, Clone)]
pub struct TrackedList<E: Tracked> {
    entries: IndexMap<E::Key, E>,
}

impl<E: Tracked> Default for TrackedList<E> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<E: Tracked> TrackedList<E> {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of an entity
    pub fn status(entity: &E) -> EntryStatus {
        if entity.lifecycle().is_attached() {
            EntryStatus::Active
        } else {
            EntryStatus::PendingRemoval
        }
    }

    /// Number of active entries
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Whether there are no active entries
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Active entries in order
    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entries
            .values()
            .filter(|e| Self::status(e) == EntryStatus::Active)
    }

    /// Active entries in order, mutably
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries
            .values_mut()
            .filter(|e| Self::status(e) == EntryStatus::Active)
    }

    /// All entries, active and pending, in storage order
    pub fn all_mut(&mut self) -> impl Iterator<Item = &mut E> {
        self.entries.values_mut()
    }

    /// Number of entries awaiting removal
    pub fn pending_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| Self::status(e) == EntryStatus::PendingRemoval)
            .count()
    }

    /// Active entry at `index`
    pub fn get(&self, index: usize) -> Option<&E> {
        self.iter().nth(index)
    }

    /// Active entry at `index`, mutably
    pub fn get_mut(&mut self, index: usize) -> Option<&mut E> {
        self.iter_mut().nth(index)
    }

    /// Entry with the given key, active or pending
    pub fn get_by_key(&self, key: E::Key) -> Option<&E> {
        self.entries.get(&key)
    }

    /// Index of the active entry with the given key
    pub fn position(&self, key: E::Key) -> Option<usize> {
        self.iter().position(|e| e.key() == key)
    }

    fn raw_index(&self, index: usize) -> Option<usize> {
        self.entries
            .values()
            .enumerate()
            .filter(|(_, e)| Self::status(e) == EntryStatus::Active)
            .map(|(raw, _)| raw)
            .nth(index)
    }

    fn out_of_range(&self, index: usize) -> DocumentError {
        DocumentError::IndexOutOfRange {
            index,
            len: self.len(),
        }
    }

    /// Append an entity and attach it
    pub fn push(&mut self, mut entity: E) {
        entity.lifecycle_mut().attach();
        self.entries.insert(entity.key(), entity);
    }

    /// Insert an entity before the active entry at `index` and attach it.
    ///
    /// `index == len` appends.
    pub fn insert(&mut self, index: usize, mut entity: E) -> Result<()> {
        let len = self.len();
        if index > len {
            return Err(self.out_of_range(index));
        }
        let raw = if index == len {
            self.entries.len()
        } else {
            self.raw_index(index).ok_or_else(|| self.out_of_range(index))?
        };

        entity.lifecycle_mut().attach();
        self.entries.shift_insert(raw, entity.key(), entity);
        Ok(())
    }

    /// Detach the active entry at `index`; it stays stored until purged
    pub fn remove(&mut self, index: usize) -> Result<&mut E> {
        let len = self.len();
        let raw = self
            .raw_index(index)
            .ok_or(DocumentError::IndexOutOfRange { index, len })?;
        let Some((_, entity)) = self.entries.get_index_mut(raw) else {
            return Err(DocumentError::IndexOutOfRange { index, len });
        };
        entity.lifecycle_mut().detach();
        Ok(entity)
    }

    /// Exchange the positions of two active entries
    pub fn swap(&mut self, first: usize, second: usize) -> Result<()> {
        let a = self.raw_index(first).ok_or_else(|| self.out_of_range(first))?;
        let b = self.raw_index(second).ok_or_else(|| self.out_of_range(second))?;
        self.entries.swap_indices(a, b);
        Ok(())
    }

    /// Drop all pending-removal entries
    pub fn purge(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, e| Self::status(e) == EntryStatus::Active);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        key: u32,
        lifecycle: Lifecycle,
    }

    impl Tracked for Item {
        type Key = u32;

        fn key(&self) -> u32 {
            self.key
        }

        fn lifecycle(&self) -> &Lifecycle {
            &self.lifecycle
        }

        fn lifecycle_mut(&mut self) -> &mut Lifecycle {
            &mut self.lifecycle
        }
    }

    fn item(key: u32) -> Item {
        Item {
            key,
            lifecycle: Lifecycle::existing(),
        }
    }

    fn keys(list: &TrackedList<Item>) -> Vec<u32> {
        list.iter().map(|i| i.key).collect()
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut lc = Lifecycle::created();
        assert_eq!(lc.state(), LifecycleState::NewDetached);
        assert_eq!(lc.write_action(), WriteAction::Skip);

        lc.attach();
        assert_eq!(lc.state(), LifecycleState::Attached);
        assert_eq!(lc.write_action(), WriteAction::Append);

        lc.committed();
        assert!(!lc.is_new());
        assert_eq!(lc.write_action(), WriteAction::Update);

        lc.detach();
        assert_eq!(lc.state(), LifecycleState::DetachedExisting);
        assert_eq!(lc.write_action(), WriteAction::Remove);

        lc.committed();
        assert_eq!(lc.state(), LifecycleState::NewDetached);
        assert_eq!(lc.write_action(), WriteAction::Skip);
    }

    #[test]
    fn test_indices_skip_pending_entries() {
        let mut list = TrackedList::new();
        for key in 1..=4 {
            list.push(item(key));
        }

        list.remove(1).unwrap();
        assert_eq!(keys(&list), vec![1, 3, 4]);
        assert_eq!(list.len(), 3);
        assert_eq!(list.pending_count(), 1);
        assert_eq!(list.get(1).map(|i| i.key), Some(3));

        list.insert(1, Item { key: 9, lifecycle: Lifecycle::created() }).unwrap();
        assert_eq!(keys(&list), vec![1, 9, 3, 4]);

        list.swap(0, 3).unwrap();
        assert_eq!(keys(&list), vec![4, 9, 3, 1]);

        assert_eq!(list.purge(), 1);
        assert_eq!(list.pending_count(), 0);
        assert_eq!(keys(&list), vec![4, 9, 3, 1]);
    }

    #[test]
    fn test_insert_at_end_appends() {
        let mut list = TrackedList::new();
        list.push(item(1));
        list.insert(1, item(2)).unwrap();
        assert_eq!(keys(&list), vec![1, 2]);
        assert_eq!(list.position(2), Some(1));
    }

    #[test]
    fn test_out_of_range_is_an_error() {
        let mut list = TrackedList::new();
        list.push(item(1));

        assert!(matches!(
            list.insert(3, item(2)),
            Err(DocumentError::IndexOutOfRange { index: 3, len: 1 })
        ));
        assert!(list.remove(1).is_err());
        assert!(list.swap(0, 1).is_err());
        assert_eq!(keys(&list), vec![1]);
    }
}
