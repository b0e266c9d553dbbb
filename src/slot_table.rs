//! SlotTable: structural layer with stable generational handles.
//!
//! Entries live in a `SlotMap`; a `HashTable` indexes them by the
//! precomputed composite-key hash. The key hash is computed once on insert
//! and reused for every rehash, so user `Hash` code never runs during
//! table growth.

use crate::key::CompositeKey;
use core::hash::BuildHasher;
use hashbrown::hash_table::Entry as TableEntry;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

/// Stable reference to a live slot. Stale handles never alias a later
/// entry that reuses the same physical slot.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    fn raw(self) -> DefaultKey {
        self.0
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

pub struct SlotTable<K, V, S = RandomState> {
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
}

/// Outcome of [`SlotTable::find_or_try_insert_with`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Lookup {
    Found(Handle),
    Inserted(Handle),
}

impl Lookup {
    pub fn handle(self) -> Handle {
        match self {
            Lookup::Found(h) | Lookup::Inserted(h) => h,
        }
    }
}

#[cfg(test)]
impl<K, V> SlotTable<K, V>
where
    K: CompositeKey,
{
    pub fn new() -> Self {
        Self::with_capacity_and_hasher(0, RandomState::new())
    }
}

impl<K, V, S> SlotTable<K, V, S>
where
    K: CompositeKey,
    S: BuildHasher,
{
    pub fn with_capacity_and_hasher(capacity: usize, hasher: S) -> Self {
        Self {
            hasher,
            index: HashTable::with_capacity(capacity),
            slots: SlotMap::with_capacity_and_key(capacity),
        }
    }

    pub fn find(&self, key: &K) -> Option<Handle> {
        let hash = key.key_hash(&self.hasher);
        self.index
            .find(hash, |&k| self.slots.get(k).map_or(false, |e| e.key == *key))
            .map(|&k| Handle(k))
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Locate `key`, or build its value with `create` and insert it.
    ///
    /// `create` runs only when the key is vacant. If it fails, nothing is
    /// inserted and the error is returned as-is.
    pub fn find_or_try_insert_with<F, E>(&mut self, key: K, create: F) -> Result<Lookup, E>
    where
        F: FnOnce(&K) -> Result<V, E>,
    {
        let hash = key.key_hash(&self.hasher);
        let slots = &mut self.slots;
        match self.index.entry(
            hash,
            |&kk| slots.get(kk).map_or(false, |e| e.key == key),
            |&kk| slots.get(kk).map_or(0, |e| e.hash),
        ) {
            TableEntry::Occupied(o) => Ok(Lookup::Found(Handle(*o.get()))),
            TableEntry::Vacant(v) => {
                let value = create(&key)?;
                let k = slots.insert(Entry { key, value, hash });
                v.insert(k);
                Ok(Lookup::Inserted(Handle(k)))
            }
        }
    }

    /// Unlink the entry and hand back its key and value. The table is
    /// consistent again before the caller sees either.
    pub fn remove(&mut self, handle: Handle) -> Option<(K, V)> {
        let k = handle.raw();
        let entry = self.slots.remove(k)?;
        if let Ok(o) = self.index.find_entry(entry.hash, |&kk| kk == k) {
            o.remove();
        }
        Some((entry.key, entry.value))
    }
}

impl<K, V, S> SlotTable<K, V, S> {
    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Empty the table, yielding every entry. The index is cleared up
    /// front so the table reads as empty while the caller disposes of them.
    pub fn drain(&mut self) -> impl Iterator<Item = (K, V)> + '_ {
        self.index.clear();
        self.slots.drain().map(|(_, e)| (e.key, e.value))
    }

    pub fn value(&self, h: Handle) -> Option<&V> {
        self.slots.get(h.raw()).map(|e| &e.value)
    }

    pub fn value_mut(&mut self, h: Handle) -> Option<&mut V> {
        self.slots.get_mut(h.raw()).map(|e| &mut e.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &K, &V)> {
        self.slots
            .iter()
            .map(|(k, e)| (Handle(k), &e.key, &e.value))
    }
}
