//! Flyweight: the exclusive value store.
//!
//! One slot per loaded key. A miss runs the creator and inserts its
//! result; `release` and `clear` unlink the slot and pass the payload to
//! the deleter. References returned by `get`/`peek` borrow the store, so
//! they cannot outlive a later `release` of the same key.

use crate::callbacks::{Create, Delete, FromKey, Noop};
use crate::error::ReleaseError;
use crate::key::CompositeKey;
use crate::slot_table::{Handle, Lookup, SlotTable};
use core::fmt;
use core::hash::BuildHasher;
use log::{debug, trace};
use std::collections::hash_map::RandomState;

/// The operation set shared by every store variant. Wrappers such as
/// [`SyncFlyweight`](crate::SyncFlyweight) are generic over it.
pub trait Store {
    type Key: CompositeKey;
    type Value;
    type Error;

    /// Return the loaded value for `key`, creating it on a miss.
    fn get(&mut self, key: Self::Key) -> Result<&Self::Value, Self::Error>;

    /// Non-creating lookup.
    fn peek(&self, key: &Self::Key) -> Option<&Self::Value>;

    fn is_loaded(&self, key: &Self::Key) -> bool;

    /// Give up one claim on `key`. Returns `true` when the slot was
    /// removed and its payload handed to the deleter.
    fn release(&mut self, key: &Self::Key) -> bool;

    /// Like [`release`](Store::release), but an unloaded key is reported
    /// as [`ReleaseError::NotLoaded`] instead of being ignored.
    fn try_release(&mut self, key: &Self::Key) -> Result<bool, ReleaseError> {
        if !self.is_loaded(key) {
            return Err(ReleaseError::NotLoaded);
        }
        Ok(self.release(key))
    }

    /// Delete every remaining slot.
    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub struct Flyweight<K, V, C = FromKey, D = Noop, S = RandomState>
where
    D: Delete<K, V>,
{
    table: SlotTable<K, V, S>,
    creator: C,
    deleter: D,
}

impl<K, V> Flyweight<K, V>
where
    K: CompositeKey,
{
    /// Store with direct construction (`V: From<K>`) and a no-op deleter.
    pub fn new() -> Self {
        Self::from_parts(FromKey, Noop, RandomState::new(), 0)
    }
}

impl<K, V> Default for Flyweight<K, V>
where
    K: CompositeKey,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Flyweight<K, V, C>
where
    K: CompositeKey,
    C: Create<K, V>,
{
    pub fn with_creator(creator: C) -> Self {
        Self::from_parts(creator, Noop, RandomState::new(), 0)
    }
}

impl<K, V, C, D> Flyweight<K, V, C, D>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
{
    pub fn with_callbacks(creator: C, deleter: D) -> Self {
        Self::from_parts(creator, deleter, RandomState::new(), 0)
    }
}

impl<K, V, C, D, S> Flyweight<K, V, C, D, S>
where
    K: CompositeKey,
    D: Delete<K, V>,
    S: BuildHasher,
{
    pub fn with_hasher(creator: C, deleter: D, hasher: S) -> Self {
        Self::from_parts(creator, deleter, hasher, 0)
    }

    pub(crate) fn from_parts(creator: C, deleter: D, hasher: S, capacity: usize) -> Self {
        Self {
            table: SlotTable::with_capacity_and_hasher(capacity, hasher),
            creator,
            deleter,
        }
    }

    pub fn peek(&self, key: &K) -> Option<&V> {
        let h = self.table.find(key)?;
        self.table.value(h)
    }

    pub fn peek_mut(&mut self, key: &K) -> Option<&mut V> {
        let h = self.table.find(key)?;
        self.table.value_mut(h)
    }

    pub fn is_loaded(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    /// Remove the slot for `key` and run the deleter on its payload.
    /// Returns `false` if the key was not loaded.
    pub fn release(&mut self, key: &K) -> bool {
        self.release_if(key, |_| true)
    }

    /// Remove the slot for `key` only if `should_remove` agrees. The
    /// predicate may update the payload in place either way.
    pub(crate) fn release_if<F>(&mut self, key: &K, should_remove: F) -> bool
    where
        F: FnOnce(&mut V) -> bool,
    {
        let Some(h) = self.table.find(key) else {
            debug!("release of an unloaded key ignored");
            return false;
        };
        let remove = match self.table.value_mut(h) {
            Some(v) => should_remove(v),
            None => false,
        };
        if remove {
            self.remove_slot(h);
        }
        remove
    }

    /// Delete every slot. The table already reads as empty while the
    /// deleter runs.
    pub fn clear(&mut self) {
        let n = self.delete_all();
        debug!("cleared {} flyweight slot(s)", n);
    }

    fn remove_slot(&mut self, h: Handle) {
        if let Some((key, value)) = self.table.remove(h) {
            self.deleter.delete(&key, value);
            trace!("deleted flyweight slot, {} remain", self.table.len());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.table.iter().map(|(_, k, v)| (k, v))
    }

    pub fn hasher(&self) -> &S {
        self.table.hasher()
    }
}

impl<K, V, C, D, S> Flyweight<K, V, C, D, S>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
    S: BuildHasher,
{
    /// Return the value for `key`, creating it with the creator on a miss.
    ///
    /// The creator runs at most once per miss. If it fails, no slot is
    /// inserted and its error is returned unchanged.
    pub fn get(&mut self, key: K) -> Result<&V, C::Error> {
        self.acquire(key).map(|v| &*v)
    }

    pub(crate) fn acquire(&mut self, key: K) -> Result<&mut V, C::Error> {
        let creator = &mut self.creator;
        let lookup = self
            .table
            .find_or_try_insert_with(key, |k| creator.create(k))?;
        if let Lookup::Inserted(_) = lookup {
            trace!("created flyweight slot, {} loaded", self.table.len());
        }
        Ok(self
            .table
            .value_mut(lookup.handle())
            .expect("slot must exist right after lookup"))
    }
}

impl<K, V, C, D, S> Flyweight<K, V, C, D, S>
where
    D: Delete<K, V>,
{
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn delete_all(&mut self) -> usize {
        let mut n = 0;
        for (key, value) in self.table.drain() {
            self.deleter.delete(&key, value);
            n += 1;
        }
        n
    }
}

impl<K, V, C, D, S> Drop for Flyweight<K, V, C, D, S>
where
    D: Delete<K, V>,
{
    fn drop(&mut self) {
        let n = self.delete_all();
        if n > 0 {
            trace!("dropped flyweight store with {} live slot(s)", n);
        }
    }
}

impl<K, V, C, D, S> fmt::Debug for Flyweight<K, V, C, D, S>
where
    D: Delete<K, V>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Flyweight")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl<K, V, C, D, S> Store for Flyweight<K, V, C, D, S>
where
    K: CompositeKey,
    C: Create<K, V>,
    D: Delete<K, V>,
    S: BuildHasher,
{
    type Key = K;
    type Value = V;
    type Error = C::Error;

    fn get(&mut self, key: K) -> Result<&V, C::Error> {
        Flyweight::get(self, key)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        Flyweight::peek(self, key)
    }

    fn is_loaded(&self, key: &K) -> bool {
        Flyweight::is_loaded(self, key)
    }

    fn release(&mut self, key: &K) -> bool {
        Flyweight::release(self, key)
    }

    fn clear(&mut self) {
        Flyweight::clear(self)
    }

    fn len(&self) -> usize {
        Flyweight::len(self)
    }
}
